/// A declared index over one or more fields of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Indexed fields, in order.
    pub fields: Vec<String>,

    /// When `true`, indexed entries are unique
    pub unique: bool,
}

impl Index {
    pub fn new<I, S>(fields: I) -> Index
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Index {
            fields: fields.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}
