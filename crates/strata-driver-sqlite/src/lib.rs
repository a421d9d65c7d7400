mod value;
pub(crate) use value::Value;

use rusqlite::Connection as RusqliteConnection;
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    time::Duration,
};
use strata_core::{
    async_trait,
    driver::{
        operation::Operation,
        Capability, Driver, Response, ResultSet,
    },
    stmt, Error, Result,
};
use strata_sql as sql;
use url::Url;

/// How long a connection waits on a locked database file by default.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct Sqlite {
    location: Location,

    /// How long a statement waits for another connection's write lock.
    busy_timeout: Duration,
}

#[derive(Debug)]
enum Location {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver from a `sqlite::memory:` or `sqlite:<path>`
    /// URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(|err| {
            Error::invalid_configuration(format!("malformed connection URL `{url_str}`: {err}"))
        })?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_configuration(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        match url.path() {
            ":memory:" => Ok(Self::in_memory()),
            "" => Err(Error::invalid_configuration(format!(
                "connection URL is missing a database path; url={url_str}"
            ))),
            path => Ok(Self::open(path)),
        }
    }

    /// Create an in-memory SQLite database. Every connection gets its own
    /// database.
    pub fn in_memory() -> Self {
        Self {
            location: Location::InMemory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn url(&self) -> Cow<'_, str> {
        match &self.location {
            Location::InMemory => Cow::Borrowed("sqlite::memory:"),
            Location::File(path) => Cow::Owned(format!("sqlite:{}", path.display())),
        }
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn connect(&self) -> Result<Box<dyn strata_core::Connection>> {
        let connection = match &self.location {
            Location::File(path) => Connection::open(path)?,
            Location::InMemory => Connection::in_memory()?,
        };
        connection.configure(self.busy_timeout)?;
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        Ok(Self { connection })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Ok(Self { connection })
    }

    /// Sets the busy timeout and turns on foreign key enforcement, which
    /// SQLite leaves off by default.
    fn configure(&self, busy_timeout: Duration) -> Result<()> {
        self.connection
            .busy_timeout(busy_timeout)
            .map_err(Error::driver_operation_failed)?;

        let pragma = sql::Serializer::sqlite().serialize(
            &sql::Statement::pragma_enable_foreign_keys(),
            &mut Vec::<stmt::Value>::new(),
        );
        self.connection
            .execute_batch(&pragma)
            .map_err(Error::driver_operation_failed)
    }

    fn execute(&self, sql: &str, params: Vec<stmt::Value>) -> Result<Response> {
        let mut stmt = self
            .connection
            .prepare_cached(sql)
            .map_err(Error::driver_operation_failed)?;

        // Placeholders are numbered in order of appearance, so positional
        // binding matches the `:pN` names.
        let params = params.into_iter().map(Value::from).collect::<Vec<_>>();

        if stmt.column_count() == 0 {
            let count = stmt
                .execute(rusqlite::params_from_iter(params.iter()))
                .map_err(Error::driver_operation_failed)?;
            return Ok(Response::count(count as u64));
        }

        // Statements such as `SELECT 1` executed for their side effects
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(Error::driver_operation_failed)?;
        while rows.next().map_err(Error::driver_operation_failed)?.is_some() {}

        Ok(Response::count(self.connection.changes() as u64))
    }

    fn query(&self, sql: &str, params: Vec<stmt::Value>) -> Result<Response> {
        let mut stmt = self
            .connection
            .prepare_cached(sql)
            .map_err(Error::driver_operation_failed)?;

        let columns = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        let width = columns.len();
        let mut ret = ResultSet::new(columns);

        let params = params.into_iter().map(Value::from).collect::<Vec<_>>();
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(Error::driver_operation_failed)?;

        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut items = Vec::with_capacity(width);

                    for index in 0..width {
                        let value = row.get_ref(index).map_err(Error::driver_operation_failed)?;
                        items.push(Value::from_sql(value)?.into_inner());
                    }

                    ret.rows.push(items);
                }
                Ok(None) => break,
                Err(err) => {
                    return Err(Error::driver_operation_failed(err));
                }
            }
        }

        Ok(Response::values(ret))
    }
}

#[async_trait]
impl strata_core::driver::Connection for Connection {
    async fn exec(&mut self, op: Operation) -> Result<Response> {
        match op {
            Operation::Execute(op) => self.execute(&op.sql, op.params),
            Operation::Query(op) => self.query(&op.sql, op.params),
            Operation::Transaction(op) => {
                let sql = sql::Serializer::sqlite().serialize_transaction(&op);
                self.connection
                    .execute_batch(&sql)
                    .map_err(Error::driver_operation_failed)?;
                Ok(Response::count(0))
            }
        }
    }
}
