use super::{ForeignKeyDef, Statement};

use strata_core::schema::db::ForeignKey;

/// Adds a foreign key constraint to an existing table. Only databases that
/// can alter constraints support it.
#[derive(Debug, Clone, PartialEq)]
pub struct AddForeignKey {
    pub table: String,
    pub foreign_key: ForeignKeyDef,
}

impl Statement {
    pub fn add_foreign_key(table: impl Into<String>, foreign_key: &ForeignKey) -> Self {
        AddForeignKey {
            table: table.into(),
            foreign_key: ForeignKeyDef::from_schema(foreign_key),
        }
        .into()
    }
}

impl From<AddForeignKey> for Statement {
    fn from(value: AddForeignKey) -> Self {
        Self::AddForeignKey(value)
    }
}
