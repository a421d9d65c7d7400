//! Physical schema: tables, columns, indices and foreign keys as stored in
//! the database.

mod column;
pub use column::{Column, ColumnsDiff, ColumnsDiffItem};

mod diff;
pub use diff::{DiffContext, RenameHints};

mod foreign_key;
pub use foreign_key::{ForeignKey, ForeignKeyAction, ForeignKeysDiff, ForeignKeysDiffItem};

mod index;
pub use index::{Index, IndicesDiff, IndicesDiffItem};

mod lower;

pub mod naming;

mod schema;
pub use schema::{Schema, SchemaDiff};

mod table;
pub use table::{Table, TablesDiff, TablesDiffItem};

mod ty;
pub use ty::Type;

/// Name of the table holding options and locks. Never diffed or dropped.
pub const OPTIONS_TABLE: &str = "Options";
