use super::{Condition, Filter};

/// Removes the records of a collection matching a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Key of the collection deleted from.
    pub collection: String,

    pub filter: Filter,
}

impl Delete {
    pub fn new(collection: impl Into<String>) -> Delete {
        Delete {
            collection: collection.into(),
            filter: Filter::new(),
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter.push(condition);
        self
    }
}
