use rusqlite::types::{Value as SqlValue, ValueRef};
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use strata::{
    driver::{Capability, Driver, ResultSet},
    ServerlessClient, Value,
};
use strata_core::{async_trait, Error, Result};
use strata_driver_serverless::Serverless;
use tempfile::TempDir;

use crate::Setup;

/// A serverless binding backed by a local database file. Each driver gets
/// its own client, as separate workers would.
pub struct SetupServerless {
    _dir: TempDir,
    path: PathBuf,
}

impl SetupServerless {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let path = dir.path().join("test.db");
        Self { _dir: dir, path }
    }
}

impl Default for SetupServerless {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Setup for SetupServerless {
    fn driver(&self) -> Box<dyn Driver> {
        let client = LocalClient::open(&self.path).expect("failed to open local database");
        Box::new(Serverless::new("local", client))
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SERVERLESS
    }
}

/// Runs each request on its own against a rusqlite connection, with the
/// `?N` placeholders the binding speaks.
pub struct LocalClient {
    connection: Mutex<rusqlite::Connection>,
}

impl LocalClient {
    pub fn open(path: &Path) -> Result<Self> {
        let connection = rusqlite::Connection::open(path).map_err(Error::driver_operation_failed)?;
        connection
            .busy_timeout(Duration::from_secs(30))
            .map_err(Error::driver_operation_failed)?;
        connection
            .execute_batch("PRAGMA foreign_keys = ON")
            .map_err(Error::driver_operation_failed)?;

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}

#[async_trait]
impl ServerlessClient for LocalClient {
    async fn run(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let connection = self.connection.lock().unwrap();
        let mut stmt = connection
            .prepare(sql)
            .map_err(Error::driver_operation_failed)?;
        let params = params.iter().map(to_sql).collect::<Vec<_>>();

        if stmt.column_count() == 0 {
            let count = stmt
                .execute(rusqlite::params_from_iter(params))
                .map_err(Error::driver_operation_failed)?;
            return Ok(count as u64);
        }

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .map_err(Error::driver_operation_failed)?;
        while rows.next().map_err(Error::driver_operation_failed)?.is_some() {}

        Ok(connection.changes() as u64)
    }

    async fn all(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        let connection = self.connection.lock().unwrap();
        let mut stmt = connection
            .prepare(sql)
            .map_err(Error::driver_operation_failed)?;
        let params = params.iter().map(to_sql).collect::<Vec<_>>();

        let columns = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        let width = columns.len();
        let mut ret = ResultSet::new(columns);

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .map_err(Error::driver_operation_failed)?;
        while let Some(row) = rows.next().map_err(Error::driver_operation_failed)? {
            let mut items = Vec::with_capacity(width);
            for index in 0..width {
                let value = row.get_ref(index).map_err(Error::driver_operation_failed)?;
                items.push(from_sql(value));
            }
            ret.rows.push(items);
        }

        Ok(ret)
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(value) => SqlValue::Integer(i64::from(*value)),
        Value::I64(value) => SqlValue::Integer(*value),
        Value::F64(value) => SqlValue::Real(*value),
        Value::String(value) => SqlValue::Text(value.clone()),
        Value::DateTime(value) => SqlValue::Text(Value::format_date_time(value)),
        value @ (Value::Json(_) | Value::List(_)) => SqlValue::Text(value.to_json().to_string()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(value) => Value::I64(value),
        ValueRef::Real(value) => Value::F64(value),
        ValueRef::Text(value) => Value::String(String::from_utf8_lossy(value).into_owned()),
        ValueRef::Blob(value) => Value::String(String::from_utf8_lossy(value).into_owned()),
    }
}
