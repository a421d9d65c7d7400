use super::PRIMARY_KEY;
use crate::schema::db::ForeignKeyAction;

/// A declared reference from a field to a field of another (or the same)
/// collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// The referencing field.
    pub field: String,

    /// Key of the referenced collection.
    pub references: String,

    /// The referenced field, `id` unless specified.
    pub references_field: String,

    pub on_delete: ForeignKeyAction,

    pub on_update: ForeignKeyAction,
}

impl ForeignKey {
    pub fn new(field: impl Into<String>, references: impl Into<String>) -> ForeignKey {
        ForeignKey {
            field: field.into(),
            references: references.into(),
            references_field: PRIMARY_KEY.to_string(),
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
        }
    }

    /// References `field` instead of the primary key.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.references_field = field.into();
        self
    }

    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = action;
        self
    }
}
