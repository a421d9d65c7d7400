use super::{Statement, Value};

use strata_core::stmt::Record;

/// Inserts one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,

    pub columns: Vec<String>,

    /// One value per column
    pub values: Vec<Value>,

    /// Column returned for the inserted row
    pub returning: Option<String>,
}

impl Insert {
    fn from_record(table: String, record: &Record, returning: Option<String>) -> Insert {
        Insert {
            table,
            columns: record.names().map(str::to_string).collect(),
            values: record.iter().map(|(_, value)| value.clone()).collect(),
            returning,
        }
    }
}

impl Statement {
    pub fn insert(table: impl Into<String>, record: &Record) -> Self {
        Insert::from_record(table.into(), record, None).into()
    }

    /// Inserts `record` and returns the `returning` column of the new row.
    pub fn insert_returning(
        table: impl Into<String>,
        record: &Record,
        returning: impl Into<String>,
    ) -> Self {
        Insert::from_record(table.into(), record, Some(returning.into())).into()
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
