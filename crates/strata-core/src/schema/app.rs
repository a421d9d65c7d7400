//! Application-level schema: collections and their fields as declared by the
//! caller.

mod auto;
pub use auto::AutoStrategy;

mod collection;
pub use collection::Collection;

mod field;
pub use field::{Field, FieldKind, ScalarKind};

pub mod field_type;
pub use field_type::{FieldType, Registry, Stage};

mod fk;
pub use fk::ForeignKey;

mod index;
pub use index::Index;

mod schema;
pub use schema::{Builder, Schema};

mod verify;

/// Name of the implicit integer primary key every collection has.
pub const PRIMARY_KEY: &str = "id";
