use super::Operation;

use crate::stmt::Value;

#[derive(Debug, Clone)]
pub struct Query {
    /// SQL text with flavor placeholders
    pub sql: String,

    /// Parameters bound to the placeholders, in order
    pub params: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

impl From<Query> for Operation {
    fn from(value: Query) -> Self {
        Self::Query(value)
    }
}
