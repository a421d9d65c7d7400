use super::{DiffContext, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Index name is unique within the schema
    pub name: String,

    /// Indexed columns, in order.
    pub columns: Vec<String>,

    /// When `true`, indexed entries are unique
    pub unique: bool,
}

pub struct IndicesDiff<'a> {
    items: Vec<IndicesDiffItem<'a>>,
}

impl<'a> IndicesDiff<'a> {
    /// Indices are compared by structure, never by name: the columns they
    /// cover (after column renames) and their uniqueness.
    pub fn from(cx: &DiffContext<'a>, from: &'a Table, to: &'a Table) -> Self {
        let mut items = vec![];
        let mut kept = vec![false; to.indices.len()];

        for from_index in &from.indices {
            let columns: Vec<&str> = from_index
                .columns
                .iter()
                .map(|column| cx.next_column_name(&to.name, column))
                .collect();

            let matching = to.indices.iter().position(|to_index| {
                to_index.unique == from_index.unique
                    && to_index.columns.iter().map(String::as_str).eq(columns.iter().copied())
            });

            match matching {
                Some(i) if !kept[i] => kept[i] = true,
                _ => {
                    let covers_unrelated = columns.iter().any(|column| to.column(column).is_none());
                    if !(cx.preserve_unrelated() && covers_unrelated) {
                        items.push(IndicesDiffItem::DropIndex(from_index));
                    }
                }
            }
        }

        for (i, to_index) in to.indices.iter().enumerate() {
            if !kept[i] {
                items.push(IndicesDiffItem::CreateIndex(to_index));
            }
        }

        Self { items }
    }

    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicesDiffItem<'a>> + '_ {
        self.items.iter()
    }
}

pub enum IndicesDiffItem<'a> {
    CreateIndex(&'a Index),
    DropIndex(&'a Index),
}
