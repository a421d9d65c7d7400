use super::Statement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropColumn {
    pub table: String,
    pub name: String,
}

impl Statement {
    pub fn drop_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        DropColumn {
            table: table.into(),
            name: name.into(),
        }
        .into()
    }
}

impl From<DropColumn> for Statement {
    fn from(value: DropColumn) -> Self {
        Self::DropColumn(value)
    }
}
