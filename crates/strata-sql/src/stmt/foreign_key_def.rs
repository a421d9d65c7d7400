use strata_core::schema::db::{ForeignKey, ForeignKeyAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    /// Constraint name
    pub name: String,

    pub column: String,

    pub references_table: String,

    pub references_column: String,

    pub on_delete: ForeignKeyAction,

    pub on_update: ForeignKeyAction,
}

impl ForeignKeyDef {
    pub fn from_schema(foreign_key: &ForeignKey) -> ForeignKeyDef {
        ForeignKeyDef {
            name: foreign_key.name.clone(),
            column: foreign_key.column.clone(),
            references_table: foreign_key.references_table.clone(),
            references_column: foreign_key.references_column.clone(),
            on_delete: foreign_key.on_delete,
            on_update: foreign_key.on_update,
        }
    }
}
