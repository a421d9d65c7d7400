use super::Statement;

/// Copies every row of one table into another.
///
/// Generates: `INSERT INTO "target" ("t_col1", "t_col2") SELECT "s_col1", "s_col2" FROM "source"`
#[derive(Debug, Clone, PartialEq)]
pub struct CopyTable {
    pub source: String,

    pub target: String,

    /// Column mappings: (target column, source column).
    pub columns: Vec<(String, String)>,
}

impl Statement {
    pub fn copy_table(
        source: impl Into<String>,
        target: impl Into<String>,
        columns: Vec<(String, String)>,
    ) -> Self {
        CopyTable {
            source: source.into(),
            target: target.into(),
            columns,
        }
        .into()
    }
}

impl From<CopyTable> for Statement {
    fn from(value: CopyTable) -> Self {
        Self::CopyTable(value)
    }
}
