use super::{ColumnDef, ForeignKeyDef, Statement};

use strata_core::schema::db::Table;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    /// Name of the table
    pub name: String,

    /// Column definitions
    pub columns: Vec<ColumnDef>,

    /// Foreign keys declared inline
    pub foreign_keys: Vec<ForeignKeyDef>,
}

impl Statement {
    /// Creates `table` without its foreign keys. They are added separately.
    pub fn create_table(table: &Table) -> Self {
        Statement::create_table_as(&table.name, table, false)
    }

    /// Creates a table named `name` shaped like `table`. With
    /// `inline_foreign_keys`, the foreign keys are part of the definition.
    pub fn create_table_as(name: impl Into<String>, table: &Table, inline_foreign_keys: bool) -> Self {
        let foreign_keys = if inline_foreign_keys {
            table
                .foreign_keys
                .iter()
                .map(ForeignKeyDef::from_schema)
                .collect()
        } else {
            vec![]
        };

        CreateTable {
            name: name.into(),
            columns: table.columns.iter().map(ColumnDef::from_schema).collect(),
            foreign_keys,
        }
        .into()
    }
}

impl From<CreateTable> for Statement {
    fn from(value: CreateTable) -> Self {
        Self::CreateTable(value)
    }
}
