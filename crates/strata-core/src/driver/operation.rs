mod execute;
pub use execute::Execute;

mod query;
pub use query::Query;

mod transaction;
pub use transaction::Transaction;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Execute a statement that returns no rows
    Execute(Execute),

    /// Execute a statement and return its rows
    Query(Query),

    /// Execute a transaction lifecycle op
    Transaction(Transaction),
}

impl Operation {
    /// The SQL text sent to the database, for logging.
    pub fn sql(&self) -> &str {
        match self {
            Operation::Execute(op) => &op.sql,
            Operation::Query(op) => &op.sql,
            Operation::Transaction(Transaction::Start) => "BEGIN",
            Operation::Transaction(Transaction::Commit) => "COMMIT",
            Operation::Transaction(Transaction::Rollback) => "ROLLBACK",
        }
    }
}
