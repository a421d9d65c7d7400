use super::Statement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTable {
    pub from: String,
    pub to: String,
}

impl Statement {
    pub fn rename_table(from: impl Into<String>, to: impl Into<String>) -> Self {
        RenameTable {
            from: from.into(),
            to: to.into(),
        }
        .into()
    }
}

impl From<RenameTable> for Statement {
    fn from(value: RenameTable) -> Self {
        Self::RenameTable(value)
    }
}
