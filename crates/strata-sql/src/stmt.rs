mod add_column;
pub use add_column::AddColumn;

mod add_foreign_key;
pub use add_foreign_key::AddForeignKey;

mod catalog;
pub use catalog::Catalog;

mod column_def;
pub use column_def::ColumnDef;

mod copy_table;
pub use copy_table::CopyTable;

mod create_index;
pub use create_index::CreateIndex;

mod create_table;
pub use create_table::CreateTable;

mod delete;
pub use delete::Delete;

mod drop_column;
pub use drop_column::DropColumn;

mod drop_foreign_key;
pub use drop_foreign_key::DropForeignKey;

mod drop_index;
pub use drop_index::DropIndex;

mod drop_table;
pub use drop_table::DropTable;

mod foreign_key_def;
pub use foreign_key_def::ForeignKeyDef;

mod insert;
pub use insert::Insert;

mod options;
pub use options::OptionsStatement;

mod pragma;
pub use pragma::Pragma;

mod rename_column;
pub use rename_column::RenameColumn;

mod rename_table;
pub use rename_table::RenameTable;

mod select;
pub use select::{Count, Select};

mod update;
pub use update::Update;

pub use strata_core::stmt::{Condition, Filter, OrderBy, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    AddColumn(AddColumn),
    AddForeignKey(AddForeignKey),
    Catalog(Catalog),
    CopyTable(CopyTable),
    Count(Count),
    CreateIndex(CreateIndex),
    CreateTable(CreateTable),
    Delete(Delete),
    DropColumn(DropColumn),
    DropForeignKey(DropForeignKey),
    DropIndex(DropIndex),
    DropTable(DropTable),
    Insert(Insert),
    Options(OptionsStatement),
    Pragma(Pragma),
    RenameColumn(RenameColumn),
    RenameTable(RenameTable),
    Select(Select),
    Update(Update),
}

impl Statement {
    /// True if executing the statement returns rows.
    pub fn returns_rows(&self) -> bool {
        match self {
            Statement::Catalog(_) | Statement::Count(_) | Statement::Select(_) => true,
            Statement::Insert(insert) => insert.returning.is_some(),
            Statement::Options(stmt) => stmt.returns_rows(),
            Statement::Pragma(pragma) => pragma.value.is_none(),
            _ => false,
        }
    }

    /// The statement undoing this one, if it can be undone.
    ///
    /// Drops and row copies lose data and have no inverse.
    pub fn inverse(&self) -> Option<Statement> {
        match self {
            Statement::CreateTable(stmt) => Some(Statement::drop_table(&stmt.name)),
            Statement::AddColumn(stmt) => {
                Some(Statement::drop_column(&stmt.table, &stmt.column.name))
            }
            Statement::RenameTable(stmt) => Some(Statement::rename_table(&stmt.to, &stmt.from)),
            Statement::RenameColumn(stmt) => Some(Statement::rename_column(
                &stmt.table,
                &stmt.to,
                &stmt.from,
            )),
            Statement::CreateIndex(stmt) => Some(Statement::drop_index(&stmt.name)),
            Statement::AddForeignKey(stmt) => Some(Statement::drop_foreign_key(
                &stmt.table,
                &stmt.foreign_key.name,
            )),
            _ => None,
        }
    }
}
