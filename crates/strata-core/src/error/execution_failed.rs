use super::Error;

/// Error context naming the statement that failed to execute.
///
/// Always used as context around the driver's error so the rendered SQL and
/// its parameters are visible in the message. Execution errors are never
/// retried.
#[derive(Debug)]
pub(super) struct ExecutionFailed {
    sql: Box<str>,
    params: Vec<String>,
}

impl std::error::Error for ExecutionFailed {}

impl core::fmt::Display for ExecutionFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "failed to execute `{}`", self.sql)?;
        if !self.params.is_empty() {
            write!(f, " with params [{}]", self.params.join(", "))?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates an execution failure context for `sql` bound with `params`.
    ///
    /// `params` are the already-rendered parameter values.
    pub fn execution_failed(sql: impl Into<String>, params: Vec<String>) -> Error {
        Error::from(super::ErrorKind::ExecutionFailed(ExecutionFailed {
            sql: sql.into().into(),
            params,
        }))
    }

    /// Returns `true` if this error, or any error it wraps, is an execution
    /// failure.
    pub fn is_execution_failed(&self) -> bool {
        self.failed_sql().is_some()
    }

    /// The SQL text of the statement that failed, if this is an execution
    /// failure.
    pub fn failed_sql(&self) -> Option<&str> {
        self.find(|kind| match kind {
            super::ErrorKind::ExecutionFailed(err) => Some(err),
            _ => None,
        })
        .map(|err| &*err.sql)
    }
}
