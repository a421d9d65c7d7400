use std::{path::PathBuf, time::Duration};
use strata::driver::{Capability, Driver};
use strata_driver_sqlite::Sqlite;
use tempfile::TempDir;

use crate::Setup;

/// A database file in a temporary directory, so that separate handles share
/// it.
pub struct SetupSqlite {
    _dir: TempDir,
    path: PathBuf,
}

impl SetupSqlite {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let path = dir.path().join("test.db");
        Self { _dir: dir, path }
    }
}

impl Default for SetupSqlite {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Setup for SetupSqlite {
    fn driver(&self) -> Box<dyn Driver> {
        Box::new(Sqlite::open(&self.path).busy_timeout(Duration::from_secs(30)))
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }
}
