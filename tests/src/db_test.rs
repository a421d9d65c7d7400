use crate::{DriverOp, Setup, TestDriver};

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};
use strata::{driver::Capability, schema::app::Schema, Config, Db};
use tracing_subscriber::EnvFilter;

/// Owns the runtime and the setup of one test.
///
/// Every handle the test creates goes through a [`TestDriver`] sharing one
/// operation log and one set of armed faults. The setup's database is
/// cleaned up when the test is dropped, even if it panicked.
pub struct DbTest {
    runtime: Arc<tokio::runtime::Runtime>,
    setup: Box<dyn Setup>,
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
    faults: Arc<Mutex<Vec<String>>>,
}

impl DbTest {
    pub fn new(setup: Box<dyn Setup>) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to create Tokio runtime");

        Self {
            runtime: Arc::new(runtime),
            setup,
            ops_log: Arc::new(Mutex::new(vec![])),
            faults: Arc::new(Mutex::new(vec![])),
        }
    }

    /// A driver for the test database, wrapped for logging and faults.
    pub fn driver(&self) -> TestDriver {
        TestDriver::new(
            self.setup.driver(),
            self.ops_log.clone(),
            self.faults.clone(),
        )
    }

    /// A new, unconnected handle on the test database.
    pub fn db(&self, schema: Schema) -> Db {
        self.db_with_config(schema, Config::default())
    }

    pub fn db_with_config(&self, schema: Schema, config: Config) -> Db {
        Db::builder()
            .config(config)
            .schema(schema)
            .driver(self.driver())
            .build()
            .unwrap()
    }

    /// A connected handle on the test database.
    pub async fn setup_db(&self, schema: Schema) -> Db {
        let db = self.db(schema);
        db.connect().await.unwrap();
        db
    }

    pub fn capability(&self) -> &'static Capability {
        self.setup.capability()
    }

    pub fn max_connections(&self) -> usize {
        self.setup.max_connections()
    }

    /// Fails the next operation whose SQL contains `pattern`, once.
    pub fn fail_on(&self, pattern: impl Into<String>) {
        self.faults.lock().unwrap().push(pattern.into());
    }

    /// Operations sent so far, by every handle of the test.
    pub fn ops(&self) -> Vec<DriverOp> {
        self.ops_log.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops_log.lock().unwrap().clear();
    }

    /// SQL of the operations sent so far that start with `prefix`.
    pub fn sql_starting_with(&self, prefix: &str) -> Vec<String> {
        self.ops()
            .into_iter()
            .map(|op| op.sql)
            .filter(|sql| sql.starts_with(prefix))
            .collect()
    }

    pub fn run_test<F>(&mut self, test_fn: F)
    where
        F: for<'a> FnOnce(&'a mut DbTest) -> Pin<Box<dyn Future<Output = ()> + 'a>>,
    {
        let runtime = self.runtime.clone();

        runtime.block_on(async {
            self.setup.prepare().await.unwrap();
        });
        runtime.block_on(test_fn(self));
    }
}

impl Drop for DbTest {
    fn drop(&mut self) {
        let setup = &self.setup;
        self.runtime.block_on(async {
            let _ = setup.cleanup().await;
        });
    }
}
