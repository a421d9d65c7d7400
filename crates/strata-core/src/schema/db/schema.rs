use super::{DiffContext, RenameHints, Table, TablesDiff};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tables.iter().map(|table| table.name.as_str())
    }
}

pub struct SchemaDiff<'a> {
    previous: &'a Schema,
    next: &'a Schema,
    rename_hints: &'a RenameHints,
    preserve_unrelated: bool,
    tables: TablesDiff<'a>,
}

impl<'a> SchemaDiff<'a> {
    /// Diffs the `from` schema (what the database has) against `to` (what is
    /// declared).
    ///
    /// With `preserve_unrelated`, tables and columns `to` does not mention are
    /// left alone instead of dropped.
    pub fn from(
        from: &'a Schema,
        to: &'a Schema,
        rename_hints: &'a RenameHints,
        preserve_unrelated: bool,
    ) -> Self {
        let cx = &DiffContext::new(from, to, rename_hints, preserve_unrelated);
        Self {
            previous: from,
            next: to,
            rename_hints,
            preserve_unrelated,
            tables: TablesDiff::from(cx, &from.tables, &to.tables),
        }
    }

    pub fn tables(&self) -> &TablesDiff<'a> {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn previous(&self) -> &'a Schema {
        self.previous
    }

    pub fn next(&self) -> &'a Schema {
        self.next
    }

    pub fn rename_hints(&self) -> &'a RenameHints {
        self.rename_hints
    }

    /// Tables and columns the next schema does not mention are kept.
    pub fn preserve_unrelated(&self) -> bool {
        self.preserve_unrelated
    }
}
