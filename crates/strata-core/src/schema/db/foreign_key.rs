use super::{DiffContext, Table};

/// What happens to referencing rows when the referenced row changes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignKeyAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    pub fn as_sql(self) -> &'static str {
        match self {
            ForeignKeyAction::NoAction => "NO ACTION",
            ForeignKeyAction::Restrict => "RESTRICT",
            ForeignKeyAction::Cascade => "CASCADE",
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
        }
    }

    /// Parses an action as reported by a catalog: either the SQL keyword or
    /// PostgreSQL's single letter code.
    pub fn from_sql(action: &str) -> Option<ForeignKeyAction> {
        Some(match action.trim().to_ascii_uppercase().as_str() {
            "NO ACTION" | "A" => ForeignKeyAction::NoAction,
            "RESTRICT" | "R" => ForeignKeyAction::Restrict,
            "CASCADE" | "C" => ForeignKeyAction::Cascade,
            "SET NULL" | "N" => ForeignKeyAction::SetNull,
            "SET DEFAULT" | "D" => ForeignKeyAction::SetDefault,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Constraint name. SQLite does not keep it; introspected SQLite keys
    /// carry the generated name.
    pub name: String,

    /// Referencing column
    pub column: String,

    pub references_table: String,

    pub references_column: String,

    pub on_delete: ForeignKeyAction,

    pub on_update: ForeignKeyAction,
}

pub struct ForeignKeysDiff<'a> {
    items: Vec<ForeignKeysDiffItem<'a>>,
}

impl<'a> ForeignKeysDiff<'a> {
    /// Foreign keys are compared by structure: the referencing column, the
    /// referenced table and column (after renames) and both actions.
    pub fn from(cx: &DiffContext<'a>, from: &'a Table, to: &'a Table) -> Self {
        let mut items = vec![];
        let mut kept = vec![false; to.foreign_keys.len()];

        for from_fk in &from.foreign_keys {
            let column = cx.next_column_name(&to.name, &from_fk.column);
            let references_table = cx.next_table_name(&from_fk.references_table);
            let references_column =
                cx.next_column_name(references_table, &from_fk.references_column);

            let matching = to.foreign_keys.iter().position(|to_fk| {
                to_fk.column == column
                    && to_fk.references_table == references_table
                    && to_fk.references_column == references_column
                    && to_fk.on_delete == from_fk.on_delete
                    && to_fk.on_update == from_fk.on_update
            });

            match matching {
                Some(i) if !kept[i] => kept[i] = true,
                _ => {
                    let unrelated = to.column(column).is_none();
                    if !(cx.preserve_unrelated() && unrelated) {
                        items.push(ForeignKeysDiffItem::DropForeignKey(from_fk));
                    }
                }
            }
        }

        for (i, to_fk) in to.foreign_keys.iter().enumerate() {
            if !kept[i] {
                items.push(ForeignKeysDiffItem::CreateForeignKey(to_fk));
            }
        }

        Self { items }
    }

    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForeignKeysDiffItem<'a>> + '_ {
        self.items.iter()
    }
}

pub enum ForeignKeysDiffItem<'a> {
    CreateForeignKey(&'a ForeignKey),
    DropForeignKey(&'a ForeignKey),
}
