//! Common imports for test files: `use tests::prelude::*;`

pub use crate::DbTest;

pub use crate::{collections, record, tests};

pub use strata::{
    Collection, Condition, Config, Db, Delete, Field, Filter, ForeignKey, ForeignKeyAction, Index,
    Insert, OrderBy, Record, ScalarKind, Select, State, SyncReport, Update, Value,
};

/// Declared schema of the notes used across tests: a single text field.
pub fn notes() -> Collection {
    Collection::new("notes", "notes").field(Field::text("body"))
}
