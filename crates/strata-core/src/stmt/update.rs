use super::{Condition, Filter, Record, Value};

/// Assignments applied to the records of a collection matching a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Key of the collection updated.
    pub collection: String,

    pub filter: Filter,

    pub set: Record,
}

impl Update {
    pub fn new(collection: impl Into<String>) -> Update {
        Update {
            collection: collection.into(),
            filter: Filter::new(),
            set: Record::new(),
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter.push(condition);
        self
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field, value);
        self
    }
}
