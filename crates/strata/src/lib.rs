pub mod config;
pub use config::Config;

pub mod db;
pub use db::{Db, InsertOutcome, State, SyncReport};

mod sync;

pub use strata_core::{
    driver,
    schema::{
        self,
        app::{AutoStrategy, Collection, Field, FieldKind, ForeignKey, Index, ScalarKind},
        db::ForeignKeyAction,
    },
    stmt::{
        self, query_string, Condition, Delete, Direction, Filter, Insert, OrderBy, Record, Select,
        Update, ValidationErrors, Value,
    },
    Error, Result,
};

#[cfg(feature = "serverless")]
pub use strata_driver_serverless::ServerlessClient;
