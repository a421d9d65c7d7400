use crate::stmt::Statement;

use strata_core::{
    driver::Capability,
    schema::db::{
        naming, ColumnsDiffItem, ForeignKey, ForeignKeysDiffItem, Index, IndicesDiffItem,
        RenameHints, SchemaDiff, Table, TablesDiffItem,
    },
};

use std::collections::{HashMap, HashSet};

/// Ordered DDL turning one physical schema into another.
///
/// Statements are ordered in tiers so that every statement finds the objects
/// it depends on:
///
/// 1. foreign key drops
/// 2. index drops
/// 3. column drops, then table drops
/// 4. table renames, then column renames
/// 5. table creates (referenced tables first), column adds, table rebuilds
/// 6. index creates
/// 7. foreign key creates
#[derive(Debug, Default, Clone)]
pub struct MigrationPlan {
    statements: Vec<PlannedStatement>,

    /// Drift the plan does not fix.
    warnings: Vec<String>,

    /// The plan rebuilds or drops tables, which must happen with foreign key
    /// enforcement off on SQLite.
    foreign_keys_off: bool,
}

#[derive(Debug, Clone)]
pub struct PlannedStatement {
    statement: Statement,

    /// Undoes the statement, for statements that can be undone.
    inverse: Option<Statement>,

    /// For table creates, the foreign keys declared inline as (column,
    /// referenced table).
    references: Vec<(String, String)>,
}

#[derive(Default)]
struct Tiers {
    drop_foreign_keys: Vec<PlannedStatement>,
    drop_indices: Vec<PlannedStatement>,
    drop_columns: Vec<PlannedStatement>,
    drop_tables: Vec<PlannedStatement>,
    rename_tables: Vec<PlannedStatement>,
    rename_columns: Vec<PlannedStatement>,
    create_tables: Vec<PlannedStatement>,
    add_columns: Vec<PlannedStatement>,
    rebuilds: Vec<PlannedStatement>,
    create_indices: Vec<PlannedStatement>,
    create_foreign_keys: Vec<PlannedStatement>,
}

impl MigrationPlan {
    pub fn from_diff(diff: &SchemaDiff<'_>, capability: &Capability) -> MigrationPlan {
        let mut plan = MigrationPlan::default();
        let mut tiers = Tiers::default();
        let inline_foreign_keys = !capability.alter_constraints;
        let mut created = vec![];

        for item in diff.tables().iter() {
            match item {
                TablesDiffItem::CreateTable(table) => {
                    created.push(*table);

                    for index in &table.indices {
                        tiers
                            .create_indices
                            .push(PlannedStatement::new(Statement::create_index(
                                &table.name,
                                index,
                            )));
                    }

                    if !inline_foreign_keys {
                        for fk in &table.foreign_keys {
                            tiers
                                .create_foreign_keys
                                .push(PlannedStatement::new(Statement::add_foreign_key(
                                    &table.name,
                                    fk,
                                )));
                        }
                    }
                }
                TablesDiffItem::DropTable(table) => {
                    if inline_foreign_keys {
                        plan.foreign_keys_off = true;
                    } else {
                        for fk in &table.foreign_keys {
                            tiers.drop_foreign_keys.push(PlannedStatement::new(
                                Statement::drop_foreign_key(&table.name, &fk.name),
                            ));
                        }
                    }
                    tiers
                        .drop_tables
                        .push(PlannedStatement::new(Statement::drop_table(&table.name)));
                }
                TablesDiffItem::AlterTable {
                    from,
                    to,
                    columns,
                    indices,
                    foreign_keys,
                } => {
                    if from.name != to.name {
                        tiers.rename_tables.push(PlannedStatement::new(
                            Statement::rename_table(&from.name, &to.name),
                        ));
                    }

                    for item in columns.iter() {
                        if let ColumnsDiffItem::AlterColumn { from: previous, to: next } = item {
                            plan.warnings.push(format!(
                                "column `{}.{}` is stored as {:?}{} but declared as {:?}{}; not altered",
                                to.name,
                                next.name,
                                previous.storage_ty,
                                if previous.nullable { "" } else { " NOT NULL" },
                                next.storage_ty,
                                if next.nullable { "" } else { " NOT NULL" },
                            ));
                        }
                    }

                    // Constraints cannot change in place: rebuild the table
                    if inline_foreign_keys && !foreign_keys.is_empty() {
                        plan.foreign_keys_off = true;

                        let mut copied: HashMap<&str, &str> = from
                            .columns
                            .iter()
                            .filter(|column| to.column(&column.name).is_some())
                            .map(|column| (column.name.as_str(), column.name.as_str()))
                            .collect();
                        for (previous, next) in columns.renames() {
                            copied.remove(previous);
                            copied.insert(next, previous);
                        }

                        let rebuilt = if diff.preserve_unrelated() {
                            let renamed: HashMap<&str, &str> = columns.renames().collect();
                            for column in &from.columns {
                                if is_unrelated(to, &renamed, &column.name) {
                                    copied.insert(column.name.as_str(), column.name.as_str());
                                }
                            }
                            with_unrelated(to, from, &renamed, diff.rename_hints())
                        } else {
                            (*to).clone()
                        };

                        tiers.rebuilds.extend(rebuild(&rebuilt, &copied));

                        for index in &rebuilt.indices {
                            tiers
                                .create_indices
                                .push(PlannedStatement::new(Statement::create_index(
                                    &rebuilt.name,
                                    index,
                                )));
                        }
                        continue;
                    }

                    for item in columns.iter() {
                        match item {
                            ColumnsDiffItem::AddColumn(column) => tiers
                                .add_columns
                                .push(PlannedStatement::new(Statement::add_column(&to.name, column))),
                            ColumnsDiffItem::DropColumn(column) => {
                                tiers.drop_columns.push(PlannedStatement::new(
                                    Statement::drop_column(&from.name, &column.name),
                                ))
                            }
                            ColumnsDiffItem::RenameColumn { from: previous, to: next } => {
                                tiers.rename_columns.push(PlannedStatement::new(
                                    Statement::rename_column(&to.name, &previous.name, &next.name),
                                ))
                            }
                            ColumnsDiffItem::AlterColumn { .. } => {}
                        }
                    }

                    for item in indices.iter() {
                        match item {
                            IndicesDiffItem::CreateIndex(index) => tiers
                                .create_indices
                                .push(PlannedStatement::new(Statement::create_index(&to.name, index))),
                            IndicesDiffItem::DropIndex(index) => tiers
                                .drop_indices
                                .push(PlannedStatement::new(Statement::drop_index(&index.name))),
                        }
                    }

                    for item in foreign_keys.iter() {
                        match item {
                            ForeignKeysDiffItem::CreateForeignKey(fk) => tiers
                                .create_foreign_keys
                                .push(PlannedStatement::new(Statement::add_foreign_key(&to.name, fk))),
                            ForeignKeysDiffItem::DropForeignKey(fk) => tiers
                                .drop_foreign_keys
                                .push(PlannedStatement::new(Statement::drop_foreign_key(
                                    &from.name, &fk.name,
                                ))),
                        }
                    }
                }
            }
        }

        for table in sort_by_references(created) {
            let statement = Statement::create_table_as(&table.name, table, inline_foreign_keys);
            let references = if inline_foreign_keys {
                table
                    .foreign_keys
                    .iter()
                    .filter(|fk| fk.references_table != table.name)
                    .map(|fk| (fk.column.clone(), fk.references_table.clone()))
                    .collect()
            } else {
                vec![]
            };

            tiers.create_tables.push(PlannedStatement {
                references,
                ..PlannedStatement::new(statement)
            });
        }

        let Tiers {
            drop_foreign_keys,
            drop_indices,
            drop_columns,
            drop_tables,
            rename_tables,
            rename_columns,
            create_tables,
            add_columns,
            rebuilds,
            create_indices,
            create_foreign_keys,
        } = tiers;

        plan.statements = [
            drop_foreign_keys,
            drop_indices,
            drop_columns,
            drop_tables,
            rename_tables,
            rename_columns,
            create_tables,
            add_columns,
            rebuilds,
            create_indices,
            create_foreign_keys,
        ]
        .into_iter()
        .flatten()
        .collect();

        plan
    }

    pub fn statements(&self) -> &[PlannedStatement] {
        &self.statements
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// True if SQLite must run the plan with foreign key enforcement off.
    pub fn requires_foreign_keys_off(&self) -> bool {
        self.foreign_keys_off
    }
}

impl PlannedStatement {
    fn new(statement: Statement) -> PlannedStatement {
        PlannedStatement {
            inverse: statement.inverse(),
            statement,
            references: vec![],
        }
    }

    /// A step of a table rebuild, which cannot be undone once the original
    /// table is dropped.
    fn irreversible(statement: Statement) -> PlannedStatement {
        PlannedStatement {
            statement,
            inverse: None,
            references: vec![],
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn inverse(&self) -> Option<&Statement> {
        self.inverse.as_ref()
    }

    /// Foreign keys of a created table, as (column, referenced table).
    pub fn references(&self) -> &[(String, String)] {
        &self.references
    }

    /// Name of the table this statement creates, if it creates one.
    pub fn created_table(&self) -> Option<&str> {
        match &self.statement {
            Statement::CreateTable(stmt) => Some(&stmt.name),
            _ => None,
        }
    }
}

/// Recreates `to` under a scratch name with its foreign keys inline, copies
/// the rows over, then swaps the tables. `copied` maps target columns to
/// the source columns holding their data.
fn rebuild(to: &Table, copied: &HashMap<&str, &str>) -> Vec<PlannedStatement> {
    let scratch = naming::rebuild_table_name(&to.name);

    let columns = to
        .columns
        .iter()
        .filter_map(|column| {
            copied
                .get(column.name.as_str())
                .map(|source| (column.name.clone(), source.to_string()))
        })
        .collect();

    vec![
        PlannedStatement::irreversible(Statement::create_table_as(&scratch, to, true)),
        PlannedStatement::irreversible(Statement::copy_table(&to.name, &scratch, columns)),
        PlannedStatement::irreversible(Statement::drop_table(&to.name)),
        PlannedStatement::irreversible(Statement::rename_table(&scratch, &to.name)),
    ]
}

/// True if the `from` column `name` has no counterpart in `to`.
fn is_unrelated(to: &Table, renamed: &HashMap<&str, &str>, name: &str) -> bool {
    let next = renamed.get(name).copied().unwrap_or(name);
    to.column(next).is_none()
}

/// `to` extended with the columns of `from` it does not mention, and with
/// the indices and foreign keys covering them, so a rebuild keeps them.
fn with_unrelated(
    to: &Table,
    from: &Table,
    renamed: &HashMap<&str, &str>,
    hints: &RenameHints,
) -> Table {
    let next_column = |name: &str| renamed.get(name).copied().unwrap_or(name).to_string();
    let unrelated = |name: &str| is_unrelated(to, renamed, name);

    let mut table = to.clone();

    table.columns.extend(
        from.columns
            .iter()
            .filter(|column| unrelated(&column.name))
            .cloned(),
    );

    table.indices.extend(
        from.indices
            .iter()
            .filter(|index| index.columns.iter().any(|column| unrelated(column)))
            .map(|index| Index {
                columns: index.columns.iter().map(|column| next_column(column)).collect(),
                ..index.clone()
            }),
    );

    table.foreign_keys.extend(
        from.foreign_keys
            .iter()
            .filter(|fk| unrelated(&fk.column))
            .map(|fk| {
                let references_table = hints
                    .get_table(&fk.references_table)
                    .unwrap_or(&fk.references_table)
                    .to_string();
                let references_column = hints
                    .get_column(&references_table, &fk.references_column)
                    .unwrap_or(&fk.references_column)
                    .to_string();
                ForeignKey {
                    references_table,
                    references_column,
                    ..fk.clone()
                }
            }),
    );

    table
}

/// Orders tables so that referenced tables come first. Tables in a cycle
/// keep their declaration order.
fn sort_by_references<'a>(tables: Vec<&'a Table>) -> Vec<&'a Table> {
    let names: HashSet<&'a str> = tables.iter().map(|&table| table.name.as_str()).collect();
    let mut placed: HashSet<&'a str> = HashSet::new();
    let mut sorted = vec![];
    let mut pending = tables;

    while !pending.is_empty() {
        let ready = pending.iter().position(|table| {
            table.referenced_tables().all(|referenced| {
                !names.contains(referenced) || placed.contains(referenced)
            })
        });

        // A cycle: take the first pending table
        let table = pending.remove(ready.unwrap_or(0));
        placed.insert(table.name.as_str());
        sorted.push(table);
    }

    sorted
}
