use super::{ColumnDef, Statement};

use strata_core::schema::db::Column;

/// `ALTER TABLE .. ADD COLUMN ..`
#[derive(Debug, Clone, PartialEq)]
pub struct AddColumn {
    pub table: String,
    pub column: ColumnDef,
}

impl Statement {
    pub fn add_column(table: impl Into<String>, column: &Column) -> Self {
        AddColumn {
            table: table.into(),
            column: ColumnDef::from_schema(column),
        }
        .into()
    }
}

impl From<AddColumn> for Statement {
    fn from(value: AddColumn) -> Self {
        Self::AddColumn(value)
    }
}
