use super::Record;

/// Records to insert into one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// Key of the collection inserted into.
    pub collection: String,

    pub values: Vec<Record>,
}

impl Insert {
    pub fn new(collection: impl Into<String>) -> Insert {
        Insert {
            collection: collection.into(),
            values: vec![],
        }
    }

    pub fn value(mut self, record: Record) -> Self {
        self.values.push(record);
        self
    }

    pub fn values(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.values.extend(records);
        self
    }
}
