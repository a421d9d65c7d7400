use super::{Condition, Filter, OrderBy};

/// Parameters of a read from one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Key of the collection read from.
    pub collection: String,

    /// Fields to return. Empty returns every field.
    pub fields: Vec<String>,

    pub filter: Filter,

    pub order_by: Vec<OrderBy>,

    pub limit: Option<u64>,

    pub offset: Option<u64>,

    /// Replace foreign key values with the referenced records.
    pub populate: bool,
}

impl Select {
    pub fn new(collection: impl Into<String>) -> Select {
        Select {
            collection: collection.into(),
            fields: vec![],
            filter: Filter::new(),
            order_by: vec![],
            limit: None,
            offset: None,
            populate: false,
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a condition to the filter.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter.push(condition);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by.push(order_by);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn populate(mut self) -> Self {
        self.populate = true;
        self
    }
}
