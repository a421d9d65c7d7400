mod builder;
mod connect;
pub(crate) mod lock;
pub(crate) mod options;
mod query;

pub use builder::Builder;
pub use query::InsertOutcome;

use crate::{sync, Config, Result};

use std::{
    fmt,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use strata_core::{
    driver::{
        operation::{Execute, Operation, Query, Transaction},
        Capability, Connection, Driver, ResultSet,
    },
    schema::app,
    stmt::{placeholder_positions, Record, Value},
    Error,
};
use strata_sql::{Serializer, Statement};

/// Lifecycle of a [`Db`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Disconnected,
    Connecting,
    Connected,
}

/// What [`Db::connect`] had to do to bring the database in line with the
/// declared schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// This call created the options table, i.e. the database was fresh.
    pub created_options_table: bool,

    /// This call diffed the database and applied a migration plan. False
    /// when the stored fingerprint already matched the declared schema.
    pub synced: bool,
}

/// A database handle.
///
/// Each handle owns at most one connection; clones share it. Statements of
/// one handle are sent in the order they are issued.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

pub(crate) struct Shared {
    pub(crate) driver: Box<dyn Driver>,
    pub(crate) schema: app::Schema,
    pub(crate) config: Config,
    pub(crate) serializer: Serializer,

    /// Identifies this handle as a lock holder.
    pub(crate) holder: String,

    state: Mutex<State>,
    connection: tokio::sync::Mutex<Option<Box<dyn Connection>>>,
}

/// Exclusive use of the connection for the duration of one logical call.
pub(crate) struct Session<'a> {
    connection: tokio::sync::MutexGuard<'a, Option<Box<dyn Connection>>>,
    serializer: Serializer,
}

/// Moves the state back to `Disconnected` unless the connect sequence ran
/// to completion, including when the connect future is dropped.
struct Connecting<'a> {
    shared: &'a Shared,
    completed: bool,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn new(driver: Box<dyn Driver>, schema: app::Schema, config: Config) -> Db {
        let serializer = Serializer::for_capability(driver.capability());
        Db {
            shared: Arc::new(Shared {
                driver,
                schema,
                config,
                serializer,
                holder: uuid::Uuid::new_v4().to_string(),
                state: Mutex::new(State::Disconnected),
                connection: tokio::sync::Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> State {
        *self.shared.state()
    }

    pub fn schema(&self) -> &app::Schema {
        &self.shared.schema
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn capability(&self) -> &'static Capability {
        self.shared.driver.capability()
    }

    /// False for backends that apply every statement on its own, such as
    /// serverless bindings.
    pub fn transactions_supported(&self) -> bool {
        self.capability().transactions
    }

    /// Opens the connection and synchronizes the declared schema onto the
    /// database.
    ///
    /// The handle is `Connecting` as soon as this is called, before the
    /// returned future is polled, and becomes `Connected` only once
    /// synchronization succeeded. Concurrent callers across processes are
    /// serialized through a lock stored in the database; only one of them
    /// migrates.
    pub fn connect(&self) -> impl Future<Output = Result<SyncReport>> + Send + '_ {
        let entered = self
            .shared
            .transition(State::Disconnected, State::Connecting)
            .map(|()| Connecting {
                shared: &self.shared,
                completed: false,
            });

        async move {
            let mut connecting = entered?;

            let mut slot = self.shared.connection.lock().await;
            let connection = self.shared.driver.connect().await.map_err(|err| {
                err.context(format!("failed to connect to {}", self.shared.driver.url()))
            })?;
            *slot = Some(connection);

            let mut session = Session {
                connection: slot,
                serializer: self.shared.serializer,
            };

            match sync::synchronize(&self.shared, &mut session).await {
                Ok(report) => {
                    self.shared.set_state(State::Connected);
                    connecting.completed = true;
                    tracing::info!(
                        url = %self.shared.driver.url(),
                        created_options_table = report.created_options_table,
                        synced = report.synced,
                        "connected"
                    );
                    Ok(report)
                }
                Err(err) => {
                    *session.connection = None;
                    Err(err)
                }
            }
        }
    }

    /// Closes the connection. Fails if the handle is not connected.
    pub async fn close(&self) -> Result<()> {
        self.shared
            .transition(State::Connected, State::Disconnected)
            .map_err(|err| match self.state() {
                State::Disconnected => Error::already_closed(),
                _ => err,
            })?;

        self.shared.connection.lock().await.take();
        Ok(())
    }

    /// Runs caller-provided SQL, returning the number of affected rows.
    ///
    /// `?` markers outside quoted text are bound to `params` in order.
    pub async fn exec(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let operation = self.raw(sql, params, false)?;
        let response = self.session().await?.run(operation).await?;
        Ok(response.rows.into_count())
    }

    /// Runs a caller-provided query, returning its rows as stored.
    ///
    /// `?` markers outside quoted text are bound to `params` in order.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        let operation = self.raw(sql, params, true)?;
        let response = self.session().await?.run(operation).await?;
        Ok(response.rows.into_values().into_records())
    }

    fn raw(&self, sql: &str, params: &[Value], returns_rows: bool) -> Result<Operation> {
        let markers = placeholder_positions(sql).len();
        if markers != params.len() {
            return Err(strata_core::err!(
                "statement has {markers} parameter markers but {} values were given",
                params.len()
            ));
        }

        let mut bound = Vec::new();
        let sql = self.shared.serializer.serialize_raw(sql, params, &mut bound);

        Ok(if returns_rows {
            Query::new(sql, bound).into()
        } else {
            Execute::new(sql, bound).into()
        })
    }

    /// Takes the connection for one logical call.
    pub(crate) async fn session(&self) -> Result<Session<'_>> {
        if self.state() != State::Connected {
            return Err(Error::not_connected());
        }

        let connection = self.shared.connection.lock().await;
        if connection.is_none() {
            return Err(Error::not_connected());
        }

        Ok(Session {
            connection,
            serializer: self.shared.serializer,
        })
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("driver", &self.shared.driver)
            .field("state", &self.state())
            .finish()
    }
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, to: State) {
        *self.state() = to;
    }

    fn transition(&self, from: State, to: State) -> Result<()> {
        let mut state = self.state();
        if *state != from {
            return Err(Error::connection_state(*state, to));
        }
        *state = to;
        Ok(())
    }
}

impl Drop for Connecting<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.shared.set_state(State::Disconnected);
        }
    }
}

impl Session<'_> {
    pub(crate) fn serializer(&self) -> Serializer {
        self.serializer
    }

    /// Runs a statement, returning the number of affected rows.
    pub(crate) async fn execute(&mut self, stmt: &Statement) -> Result<u64> {
        let mut params = Vec::new();
        let sql = self.serializer.serialize(stmt, &mut params);
        let response = self.run(Execute::new(sql, params).into()).await?;
        Ok(response.rows.into_count())
    }

    /// Runs a statement returning rows.
    pub(crate) async fn query(&mut self, stmt: &Statement) -> Result<ResultSet> {
        let mut params = Vec::new();
        let sql = self.serializer.serialize(stmt, &mut params);
        let response = self.run(Query::new(sql, params).into()).await?;
        Ok(response.rows.into_values())
    }

    pub(crate) async fn transaction(&mut self, op: Transaction) -> Result<()> {
        self.run(op.into()).await.map(|_| ())
    }

    /// Rolls back the open transaction. A failure is only logged, the error
    /// that led here is the one worth reporting.
    pub(crate) async fn rollback(&mut self) {
        if let Err(err) = self.transaction(Transaction::Rollback).await {
            tracing::warn!(error = %err, "rollback failed");
        }
    }

    async fn run(&mut self, operation: Operation) -> Result<strata_core::driver::Response> {
        let connection = self.connection.as_mut().ok_or_else(Error::not_connected)?;

        let statement = match &operation {
            Operation::Execute(op) => Some((op.sql.clone(), op.params.clone())),
            Operation::Query(op) => Some((op.sql.clone(), op.params.clone())),
            Operation::Transaction(_) => None,
        };

        tracing::debug!(sql = operation.sql(), "exec");

        connection.exec(operation).await.map_err(|err| match statement {
            Some((sql, params)) => err.context(Error::execution_failed(
                sql,
                params.iter().map(ToString::to_string).collect(),
            )),
            None => err,
        })
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Disconnected => "disconnected",
            State::Connecting => "connecting",
            State::Connected => "connected",
        })
    }
}
