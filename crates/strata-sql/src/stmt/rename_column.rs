use super::Statement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumn {
    pub table: String,
    pub from: String,
    pub to: String,
}

impl Statement {
    pub fn rename_column(
        table: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        RenameColumn {
            table: table.into(),
            from: from.into(),
            to: to.into(),
        }
        .into()
    }
}

impl From<RenameColumn> for Statement {
    fn from(value: RenameColumn) -> Self {
        Self::RenameColumn(value)
    }
}
