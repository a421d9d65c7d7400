use crate::Result;

use serde::Deserialize;
use std::{path::Path, time::Duration};
use strata_core::Error;

/// Connection and synchronization settings.
///
/// Loadable from TOML; durations are given in milliseconds:
///
/// ```toml
/// url = "sqlite:data/app.db"
/// preserve_unrelated_tables = true
/// lock_ttl = 30000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Database to connect to: `sqlite::memory:`, `sqlite:<path>` or
    /// `postgresql://…`. Unused when a driver is passed to the builder.
    pub url: Option<String>,

    /// Leave tables and columns the declared collections do not own alone
    /// instead of dropping them.
    pub preserve_unrelated_tables: bool,

    /// How long a lock taken with [`Db::lock`](crate::Db::lock) outlives a
    /// crashed holder.
    #[serde(deserialize_with = "millis::deserialize")]
    pub lock_ttl: Duration,

    /// How long the synchronization lock outlives a crashed holder.
    #[serde(deserialize_with = "millis::deserialize")]
    pub sync_lock_ttl: Duration,

    /// First delay between two attempts to take a held lock.
    #[serde(deserialize_with = "millis::deserialize")]
    pub lock_poll_interval: Duration,

    /// The delay between attempts doubles up to this bound.
    #[serde(deserialize_with = "millis::deserialize")]
    pub lock_poll_max_interval: Duration,

    /// How long SQLite waits on a database file locked by another
    /// connection.
    #[serde(deserialize_with = "millis::deserialize")]
    pub busy_timeout: Duration,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    pub fn from_toml_str(input: &str) -> Result<Config> {
        let config: Config = toml::from_str(input).map_err(|err| {
            Error::invalid_configuration(format!("malformed configuration: {}", err.message()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|err| {
            Error::from(err).context(format!("failed to read `{}`", path.display()))
        })?;
        Config::from_toml_str(&input)
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn preserve_unrelated_tables(mut self, preserve: bool) -> Self {
        self.preserve_unrelated_tables = preserve;
        self
    }

    pub fn lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = ttl;
        self
    }

    pub fn sync_lock_ttl(mut self, ttl: Duration) -> Self {
        self.sync_lock_ttl = ttl;
        self
    }

    pub fn lock_poll_interval(mut self, interval: Duration) -> Self {
        self.lock_poll_interval = interval;
        self
    }

    pub fn lock_poll_max_interval(mut self, interval: Duration) -> Self {
        self.lock_poll_max_interval = interval;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (name, ttl) in [("lock_ttl", self.lock_ttl), ("sync_lock_ttl", self.sync_lock_ttl)] {
            if ttl.as_millis() == 0 {
                return Err(Error::invalid_configuration(format!(
                    "`{name}` must be at least one millisecond"
                )));
            }
        }

        if self.lock_poll_interval.is_zero() {
            return Err(Error::invalid_configuration(
                "`lock_poll_interval` must not be zero",
            ));
        }

        if self.lock_poll_max_interval < self.lock_poll_interval {
            return Err(Error::invalid_configuration(
                "`lock_poll_max_interval` must not be shorter than `lock_poll_interval`",
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: None,
            preserve_unrelated_tables: false,
            lock_ttl: Duration::from_secs(60),
            sync_lock_ttl: Duration::from_secs(5 * 60),
            lock_poll_interval: Duration::from_millis(10),
            lock_poll_max_interval: Duration::from_millis(500),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
