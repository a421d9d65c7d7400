#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
pub use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
use params::Param;
pub use params::{Params, Placeholder};

// Fragment serializers
mod catalog;
mod column_def;
mod condition;
use condition::Raw;
mod options;
mod statement;
mod ty;
mod value;
use value::Literal;

use crate::stmt::Statement;

use strata_core::{driver::operation::Transaction, stmt::Value};

/// Serialize a statement to a SQL string
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer {
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);

        ret.push(';');
        ret
    }

    /// Rewrites the `?` markers of caller-provided SQL into the flavor's
    /// placeholders, binding `params` in order.
    pub fn serialize_raw(&self, sql: &str, params: &[Value], out: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params: out,
        };

        Raw { sql, params }.to_sql(&mut fmt);
        ret
    }

    /// Serialize a transaction control operation to a SQL string.
    ///
    /// SQLite takes the write lock when the transaction starts so that
    /// concurrent writers wait on the busy timeout instead of failing to
    /// upgrade a read lock.
    pub fn serialize_transaction(&self, op: &Transaction) -> String {
        match op {
            Transaction::Start if self.is_sqlite_family() => "BEGIN IMMEDIATE".to_string(),
            Transaction::Start => "BEGIN".to_string(),
            Transaction::Commit => "COMMIT".to_string(),
            Transaction::Rollback => "ROLLBACK".to_string(),
        }
    }

    /// Renders `value` as a SQL literal.
    pub fn literal(&self, value: &Value) -> String {
        let mut ret = String::new();
        let mut params = Vec::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params: &mut params,
        };

        Literal(value).to_sql(&mut fmt);
        ret
    }

    /// Expression evaluating to the database clock in epoch milliseconds.
    fn now_millis(&self) -> &'static str {
        if self.is_postgresql() {
            "CAST(EXTRACT(EPOCH FROM clock_timestamp()) * 1000 AS BIGINT)"
        } else {
            "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)"
        }
    }
}
