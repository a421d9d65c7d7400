use super::Statement;

use strata_core::schema::db::Index;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    /// Name of the index
    pub name: String,

    /// Table the index is created on
    pub on: String,

    pub columns: Vec<String>,

    /// When true, the index is unique
    pub unique: bool,
}

impl Statement {
    pub fn create_index(table: impl Into<String>, index: &Index) -> Self {
        CreateIndex {
            name: index.name.clone(),
            on: table.into(),
            columns: index.columns.clone(),
            unique: index.unique,
        }
        .into()
    }
}

impl From<CreateIndex> for Statement {
    fn from(value: CreateIndex) -> Self {
        Self::CreateIndex(value)
    }
}
