use crate::stmt::{Record, Value};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Operation result, as a set of rows
    Values(ResultSet),
}

/// Rows returned by a query, in storage representation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultSet {
    /// Column names, in select order.
    pub columns: Vec<String>,

    /// One entry per row; each row has one value per column.
    pub rows: Vec<Vec<Value>>,
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn values(values: ResultSet) -> Self {
        Self {
            rows: Rows::Values(values),
        }
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    /// Number of impacted rows. A result set counts its rows.
    pub fn into_count(self) -> u64 {
        match self {
            Rows::Count(count) => count,
            Rows::Values(values) => values.rows.len() as u64,
        }
    }

    /// The returned rows. A count yields an empty set.
    pub fn into_values(self) -> ResultSet {
        match self {
            Rows::Values(values) => values,
            Rows::Count(_) => ResultSet::default(),
        }
    }
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> ResultSet {
        ResultSet {
            columns,
            rows: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the first value of the first row, if any.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// Converts each row into a record keyed by column name.
    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect()
    }
}
