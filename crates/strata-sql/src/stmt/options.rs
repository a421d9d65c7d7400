use super::Statement;

/// Statements over the options table, which also stores locks.
///
/// Lock expiry is compared with the database clock, in epoch milliseconds,
/// so that processes with skewed clocks agree on which locks are live.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionsStatement {
    /// Creates the options table.
    CreateTable,

    /// Counts options tables, 0 or 1.
    TableExists,

    /// Serializes options table bootstrap across processes for the rest of
    /// the transaction. PostgreSQL only.
    BootstrapLock,

    /// Reads the value of an option.
    Get { key: String },

    /// Inserts or replaces the value of an option.
    Set { key: String, value: String },

    /// Removes an option.
    Delete { key: String },

    /// Takes the lock row `key` for `holder`, for `ttl_ms` milliseconds.
    ///
    /// Affects one row when the lock is free, expired, or already held by
    /// `holder`, and none otherwise.
    AcquireLock {
        key: String,
        holder: String,
        ttl_ms: i64,
    },

    /// Removes the lock row `key` if it has not expired.
    ReleaseLiveLock { key: String },

    /// Counts live lock rows keyed `key`.
    IsLocked { key: String },

    /// Lists the keys of live locks, except `excluded`.
    ListLocks { prefix: String, excluded: String },

    /// Removes every lock row, except `excluded`.
    DeleteLocks { prefix: String, excluded: String },
}

impl OptionsStatement {
    pub fn returns_rows(&self) -> bool {
        matches!(
            self,
            OptionsStatement::TableExists
                | OptionsStatement::Get { .. }
                | OptionsStatement::IsLocked { .. }
                | OptionsStatement::ListLocks { .. }
        )
    }
}

impl From<OptionsStatement> for Statement {
    fn from(value: OptionsStatement) -> Self {
        Self::Options(value)
    }
}
