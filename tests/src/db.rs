#[cfg(feature = "postgresql")]
pub mod postgresql;

#[cfg(feature = "serverless")]
pub mod serverless;

#[cfg(feature = "sqlite")]
pub mod sqlite;
