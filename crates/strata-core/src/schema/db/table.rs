use super::{
    Column, ColumnsDiff, DiffContext, ForeignKey, ForeignKeysDiff, Index, IndicesDiff,
};

use std::collections::{HashMap, HashSet};

/// A database table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Name of the table
    pub name: String,

    /// The table's columns
    pub columns: Vec<Column>,

    /// Secondary indices. The primary key index is implicit.
    pub indices: Vec<Index>,

    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Table {
        Table {
            name: name.into(),
            columns: vec![],
            indices: vec![],
            foreign_keys: vec![],
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn primary_key_column(&self) -> Option<&Column> {
        self.columns.iter().find(|column| column.primary_key)
    }

    /// Tables, other than this one, referenced by its foreign keys.
    pub fn referenced_tables(&self) -> impl Iterator<Item = &str> + '_ {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table.as_str())
            .filter(move |name| *name != self.name)
    }
}

pub struct TablesDiff<'a> {
    items: Vec<TablesDiffItem<'a>>,
}

impl<'a> TablesDiff<'a> {
    pub fn from(cx: &DiffContext<'a>, from: &'a [Table], to: &'a [Table]) -> Self {
        let mut items = vec![];
        let mut create: HashSet<&str> = to.iter().map(|to| to.name.as_str()).collect();

        let to_map =
            HashMap::<&str, &'a Table>::from_iter(to.iter().map(|to| (to.name.as_str(), to)));

        for from in from {
            let to = match to_map.get(cx.next_table_name(&from.name)) {
                Some(to) => *to,
                None => {
                    if !cx.preserve_unrelated() {
                        items.push(TablesDiffItem::DropTable(from));
                    }
                    continue;
                }
            };

            create.remove(to.name.as_str());

            let columns = ColumnsDiff::from(cx, from, to);
            let indices = IndicesDiff::from(cx, from, to);
            let foreign_keys = ForeignKeysDiff::from(cx, from, to);
            if from.name != to.name
                || !columns.is_empty()
                || !indices.is_empty()
                || !foreign_keys.is_empty()
            {
                items.push(TablesDiffItem::AlterTable {
                    from,
                    to,
                    columns,
                    indices,
                    foreign_keys,
                });
            }
        }

        // Keep declaration order for creates
        for table in to {
            if create.contains(table.name.as_str()) {
                items.push(TablesDiffItem::CreateTable(table));
            }
        }

        Self { items }
    }

    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TablesDiffItem<'a>> + '_ {
        self.items.iter()
    }
}

pub enum TablesDiffItem<'a> {
    CreateTable(&'a Table),
    DropTable(&'a Table),
    AlterTable {
        from: &'a Table,
        to: &'a Table,
        columns: ColumnsDiff<'a>,
        indices: IndicesDiff<'a>,
        foreign_keys: ForeignKeysDiff<'a>,
    },
}
