#[macro_use]
mod macros;

#[macro_use]
mod error;
pub use error::{Error, IntoError, PartialMigration};

pub mod driver;
pub use driver::{Connection, Driver};

pub mod schema;
pub use schema::Schema;

pub mod stmt;

/// A Result type alias that uses Strata's [`Error`] type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

pub use async_trait::async_trait;
