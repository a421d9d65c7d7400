use super::Statement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropForeignKey {
    pub table: String,

    /// Constraint name
    pub name: String,
}

impl Statement {
    pub fn drop_foreign_key(table: impl Into<String>, name: impl Into<String>) -> Self {
        DropForeignKey {
            table: table.into(),
            name: name.into(),
        }
        .into()
    }
}

impl From<DropForeignKey> for Statement {
    fn from(value: DropForeignKey) -> Self {
        Self::DropForeignKey(value)
    }
}
