use super::Statement;

/// Queries reading the physical schema.
///
/// Every flavor returns the same row shapes:
///
/// | Query | Columns |
/// |---|---|
/// | `Tables` | name |
/// | `Columns` | name, type, not null, primary key |
/// | `Indices` | name, unique, columns as a JSON array |
/// | `ForeignKeys` | name or null, column, referenced table, referenced column or null, on update, on delete |
///
/// The options table and the database's own tables are never listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Catalog {
    Tables,
    Columns(String),
    Indices(String),
    ForeignKeys(String),
}

impl Statement {
    pub fn list_tables() -> Self {
        Catalog::Tables.into()
    }

    pub fn list_columns(table: impl Into<String>) -> Self {
        Catalog::Columns(table.into()).into()
    }

    pub fn list_indices(table: impl Into<String>) -> Self {
        Catalog::Indices(table.into()).into()
    }

    pub fn list_foreign_keys(table: impl Into<String>) -> Self {
        Catalog::ForeignKeys(table.into()).into()
    }
}

impl From<Catalog> for Statement {
    fn from(value: Catalog) -> Self {
        Self::Catalog(value)
    }
}
