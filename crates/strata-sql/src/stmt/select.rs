use super::{Filter, OrderBy, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,

    /// Selected columns. Empty selects every column.
    pub columns: Vec<String>,

    pub filter: Filter,

    pub order_by: Vec<OrderBy>,

    pub limit: Option<u64>,

    pub offset: Option<u64>,
}

/// `SELECT COUNT(*)` over the rows matching a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Count {
    pub table: String,
    pub filter: Filter,
}

impl Statement {
    /// A select of every column, to be refined before conversion into a
    /// statement.
    pub fn select(table: impl Into<String>, filter: Filter) -> Select {
        Select {
            table: table.into(),
            columns: vec![],
            filter,
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn count(table: impl Into<String>, filter: Filter) -> Self {
        Count {
            table: table.into(),
            filter,
        }
        .into()
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Self::Select(value)
    }
}

impl From<Count> for Statement {
    fn from(value: Count) -> Self {
        Self::Count(value)
    }
}
