use super::Statement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndex {
    pub name: String,
}

impl Statement {
    pub fn drop_index(name: impl Into<String>) -> Self {
        DropIndex { name: name.into() }.into()
    }
}

impl From<DropIndex> for Statement {
    fn from(value: DropIndex) -> Self {
        Self::DropIndex(value)
    }
}
