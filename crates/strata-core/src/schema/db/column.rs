use super::{DiffContext, Table, Type};
use crate::stmt::Value;

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// The name of the column in the database.
    pub name: String,

    /// The database storage type of the column.
    pub storage_ty: Type,

    /// Whether or not the column is nullable
    pub nullable: bool,

    /// True if the column is the table's primary key
    pub primary_key: bool,

    /// True if the column is an integer assigned by the database on insert.
    pub auto_increment: bool,

    /// Value written by the database when an insert omits the column.
    ///
    /// Only known for declared columns; introspection leaves it empty.
    pub default: Option<Value>,
}

impl Column {
    /// Storage drift between an existing column and its declaration.
    fn has_diff(&self, other: &Column) -> bool {
        self.storage_ty != other.storage_ty || self.nullable != other.nullable
    }
}

pub struct ColumnsDiff<'a> {
    items: Vec<ColumnsDiffItem<'a>>,
}

impl<'a> ColumnsDiff<'a> {
    pub fn from(cx: &DiffContext<'a>, from: &'a Table, to: &'a Table) -> Self {
        let mut items = vec![];

        let to_map =
            HashMap::<&str, &'a Column>::from_iter(to.columns.iter().map(|to| (to.name.as_str(), to)));
        let mut matched = vec![];

        for from_column in &from.columns {
            let name = cx.next_column_name(&to.name, &from_column.name);

            match to_map.get(name) {
                Some(to_column) => {
                    matched.push(to_column.name.as_str());

                    if from_column.name != to_column.name {
                        items.push(ColumnsDiffItem::RenameColumn {
                            from: from_column,
                            to: to_column,
                        });
                    }

                    if from_column.has_diff(to_column) {
                        items.push(ColumnsDiffItem::AlterColumn {
                            from: from_column,
                            to: to_column,
                        });
                    }
                }
                None if cx.preserve_unrelated() => {}
                None => items.push(ColumnsDiffItem::DropColumn(from_column)),
            }
        }

        for to_column in &to.columns {
            if !matched.contains(&to_column.name.as_str()) {
                items.push(ColumnsDiffItem::AddColumn(to_column));
            }
        }

        Self { items }
    }

    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnsDiffItem<'a>> + '_ {
        self.items.iter()
    }

    /// Previous-to-next column name pairs of renamed columns.
    pub fn renames(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.items.iter().filter_map(|item| match item {
            ColumnsDiffItem::RenameColumn { from, to } => {
                Some((from.name.as_str(), to.name.as_str()))
            }
            _ => None,
        })
    }
}

pub enum ColumnsDiffItem<'a> {
    AddColumn(&'a Column),
    DropColumn(&'a Column),
    RenameColumn { from: &'a Column, to: &'a Column },

    /// Storage type or nullability drifted. Reported, never applied.
    AlterColumn { from: &'a Column, to: &'a Column },
}
