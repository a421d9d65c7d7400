//! Driver for serverless SQLite bindings: a pre-bound client handle that runs
//! one statement per request and cannot hold a transaction open.

use std::{borrow::Cow, fmt::Debug, sync::Arc};
use strata_core::{
    async_trait,
    driver::{operation::Operation, Capability, Driver, Response, ResultSet},
    stmt::Value,
    Error, Result,
};

/// A client handle bound to one serverless database.
///
/// SQL uses SQLite syntax with `?N` placeholders. `params[0]` binds `?1`.
#[async_trait]
pub trait ServerlessClient: Send + Sync + 'static {
    /// Runs a statement and returns the number of rows it changed.
    async fn run(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Runs a query and returns its rows in storage representation.
    async fn all(&self, sql: &str, params: &[Value]) -> Result<ResultSet>;
}

pub struct Serverless {
    client: Arc<dyn ServerlessClient>,

    /// Database name, for logging.
    name: String,
}

impl Debug for Serverless {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serverless")
            .field("name", &self.name)
            .finish()
    }
}

impl Serverless {
    pub fn new(name: impl Into<String>, client: impl ServerlessClient) -> Self {
        Self::from_arc(name, Arc::new(client))
    }

    pub fn from_arc(name: impl Into<String>, client: Arc<dyn ServerlessClient>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }
}

#[async_trait]
impl Driver for Serverless {
    fn url(&self) -> Cow<'_, str> {
        Cow::Owned(format!("serverless:{}", self.name))
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SERVERLESS
    }

    async fn connect(&self) -> Result<Box<dyn strata_core::Connection>> {
        Ok(Box::new(Connection {
            client: self.client.clone(),
        }))
    }
}

pub struct Connection {
    client: Arc<dyn ServerlessClient>,
}

impl Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish()
    }
}

#[async_trait]
impl strata_core::driver::Connection for Connection {
    async fn exec(&mut self, op: Operation) -> Result<Response> {
        match op {
            Operation::Execute(op) => {
                let count = self.client.run(&op.sql, &op.params).await?;
                Ok(Response::count(count))
            }
            Operation::Query(op) => {
                let rows = self.client.all(&op.sql, &op.params).await?;
                Ok(Response::values(rows))
            }
            Operation::Transaction(_) => Err(Error::unsupported_feature(
                "the serverless backend does not support transactions",
            )),
        }
    }
}
