use strata::driver::{Capability, Driver};
use strata_driver_postgresql::PostgreSQL;
use tokio_postgres::NoTls;

use crate::{isolation::TestIsolation, Setup};

/// Each test works in its own PostgreSQL schema, selected through the
/// connection's `search_path`.
pub struct SetupPostgreSQL {
    isolation: TestIsolation,
}

impl SetupPostgreSQL {
    pub fn new() -> Self {
        Self {
            isolation: TestIsolation::new(),
        }
    }
}

impl Default for SetupPostgreSQL {
    fn default() -> Self {
        Self::new()
    }
}

fn base_url() -> String {
    std::env::var("STRATA_TEST_POSTGRES_URL")
        .unwrap_or_else(|_| "postgresql://localhost:5432/strata_test".to_string())
}

#[async_trait::async_trait]
impl Setup for SetupPostgreSQL {
    fn driver(&self) -> Box<dyn Driver> {
        let url = format!(
            "{}?options=-csearch_path%3D{}",
            base_url(),
            self.isolation.namespace()
        );
        Box::new(PostgreSQL::new(&url).expect("invalid STRATA_TEST_POSTGRES_URL"))
    }

    fn capability(&self) -> &'static Capability {
        &Capability::POSTGRESQL
    }

    fn max_connections(&self) -> usize {
        16
    }

    async fn prepare(&self) -> strata::Result<()> {
        execute(&format!(
            "CREATE SCHEMA IF NOT EXISTS \"{}\"",
            self.isolation.namespace()
        ))
        .await
    }

    async fn cleanup(&self) -> strata::Result<()> {
        execute(&format!(
            "DROP SCHEMA IF EXISTS \"{}\" CASCADE",
            self.isolation.namespace()
        ))
        .await
    }
}

async fn execute(sql: &str) -> strata::Result<()> {
    let (client, connection) = tokio_postgres::connect(&base_url(), NoTls)
        .await
        .map_err(strata::Error::driver_operation_failed)?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("PostgreSQL connection error during setup: {e}");
        }
    });

    client
        .batch_execute(sql)
        .await
        .map_err(strata::Error::driver_operation_failed)
}
