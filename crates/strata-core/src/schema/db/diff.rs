use std::collections::HashMap;

use crate::schema::db::Schema;

/// Renames the diff should apply instead of dropping and re-creating.
///
/// Table hints map a table name in the previous schema to its name in the
/// next schema. Column hints are keyed by the table's name in the next
/// schema.
#[derive(Debug, Default, Clone)]
pub struct RenameHints {
    tables: HashMap<String, String>,
    columns: HashMap<(String, String), String>,
}

impl RenameHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table_hint(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.tables.insert(from.into(), to.into());
    }

    pub fn add_column_hint(
        &mut self,
        table: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) {
        self.columns.insert((table.into(), from.into()), to.into());
    }

    pub fn get_table(&self, from: &str) -> Option<&str> {
        self.tables.get(from).map(String::as_str)
    }

    /// `table` is the table's name in the next schema.
    pub fn get_column(&self, table: &str, from: &str) -> Option<&str> {
        self.columns
            .get(&(table.to_string(), from.to_string()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.columns.is_empty()
    }
}

pub struct DiffContext<'a> {
    previous: &'a Schema,
    next: &'a Schema,

    rename_hints: &'a RenameHints,

    /// Keep tables and columns the next schema does not mention.
    preserve_unrelated: bool,
}

impl<'a> DiffContext<'a> {
    pub fn new(
        previous: &'a Schema,
        next: &'a Schema,
        rename_hints: &'a RenameHints,
        preserve_unrelated: bool,
    ) -> Self {
        Self {
            previous,
            next,
            rename_hints,
            preserve_unrelated,
        }
    }

    pub fn rename_hints(&self) -> &'a RenameHints {
        self.rename_hints
    }

    pub fn previous(&self) -> &'a Schema {
        self.previous
    }

    pub fn next(&self) -> &'a Schema {
        self.next
    }

    pub fn preserve_unrelated(&self) -> bool {
        self.preserve_unrelated
    }

    /// Name a previous table has in the next schema.
    pub fn next_table_name<'b>(&self, previous: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.rename_hints.get_table(previous).unwrap_or(previous)
    }

    /// Name a previous column of `table` (next-schema name) has in the next
    /// schema.
    pub fn next_column_name<'b>(&self, table: &str, previous: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.rename_hints
            .get_column(table, previous)
            .unwrap_or(previous)
    }
}
