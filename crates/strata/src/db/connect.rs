use crate::{Config, Result};

use strata_core::{driver::Driver, Error};
use url::Url;

/// Picks the driver for the configured URL.
///
/// Fails before any I/O when the URL is malformed, names an unknown
/// database, or needs a driver whose feature is not enabled.
pub(crate) fn driver_for(config: &Config) -> Result<Box<dyn Driver>> {
    let Some(url) = config.url.as_deref() else {
        return Err(Error::invalid_configuration(
            "no database URL configured and no driver given",
        ));
    };

    let parsed = Url::parse(url).map_err(|err| {
        Error::invalid_configuration(format!("malformed connection URL `{url}`: {err}"))
    })?;

    match parsed.scheme() {
        "sqlite" => connect_sqlite(url, config),
        "postgresql" | "postgres" => connect_postgresql(url),
        scheme => Err(Error::invalid_configuration(format!(
            "unsupported database; scheme={scheme}; url={url}"
        ))),
    }
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(url: &str, config: &Config) -> Result<Box<dyn Driver>> {
    let driver = strata_driver_sqlite::Sqlite::new(url)?.busy_timeout(config.busy_timeout);
    Ok(Box::new(driver))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_url: &str, _config: &Config) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_configuration("`sqlite` feature not enabled"))
}

#[cfg(feature = "postgresql")]
fn connect_postgresql(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(strata_driver_postgresql::PostgreSQL::new(url)?))
}

#[cfg(not(feature = "postgresql"))]
fn connect_postgresql(_url: &str) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_configuration("`postgresql` feature not enabled"))
}
