use super::{Filter, Statement, Value};

use strata_core::stmt::Record;

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,

    /// Column assignments
    pub assignments: Vec<(String, Value)>,

    pub filter: Filter,
}

impl Statement {
    pub fn update(table: impl Into<String>, set: &Record, filter: Filter) -> Self {
        Update {
            table: table.into(),
            assignments: set
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            filter,
        }
        .into()
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Self::Update(value)
    }
}
