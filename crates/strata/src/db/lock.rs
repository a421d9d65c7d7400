//! Named locks shared by every process using the database.
//!
//! A lock is a row of the options table keyed `_lock:<name>`, holding the
//! holder id and an expiry in epoch milliseconds of the database clock.
//! Taking a lock is a single upsert that only succeeds when no live row
//! exists, so the database arbitrates between contenders. An expired row
//! is taken over, which bounds how long a crashed holder blocks others.

use super::{Db, Session};
use crate::{Config, Result};

use std::time::Duration;
use strata_core::{stmt::Value, Error};
use strata_sql::{stmt::OptionsStatement, Statement};
use tokio::time::Instant;

/// Lock serializing schema synchronization.
pub(crate) const SYNC_LOCK: &str = "__sync__";

const LOCK_PREFIX: &str = "_lock:";

impl Db {
    /// Takes the lock `name`, waiting while another holder has it.
    ///
    /// Returns `false` if `timeout` elapsed first. `None` waits
    /// indefinitely. The lock expires after [`Config::lock_ttl`] unless
    /// released.
    pub async fn lock(&self, name: &str, timeout: Option<Duration>) -> Result<bool> {
        let key = user_lock_key(name)?;
        let config = &self.shared.config;
        let mut backoff = Backoff::new(config, timeout);

        loop {
            let acquired = {
                let mut session = self.session().await?;
                try_acquire(&mut session, &key, &self.shared.holder, config.lock_ttl).await?
            };

            if acquired {
                tracing::debug!(lock = name, "lock acquired");
                return Ok(true);
            }

            if !backoff.wait(name).await {
                tracing::debug!(lock = name, "lock timed out");
                return Ok(false);
            }
        }
    }

    /// Releases the lock `name`, whoever holds it. Returns `true` if a live
    /// lock was removed.
    pub async fn unlock(&self, name: &str) -> Result<bool> {
        let key = user_lock_key(name)?;
        let mut session = self.session().await?;
        release(&mut session, &key).await
    }

    /// Returns `true` if a live lock `name` exists.
    pub async fn is_locked(&self, name: &str) -> Result<bool> {
        let key = user_lock_key(name)?;
        let mut session = self.session().await?;
        let rows = session
            .query(&OptionsStatement::IsLocked { key }.into())
            .await?;
        Ok(rows.first_value().and_then(Value::as_i64).unwrap_or(0) > 0)
    }

    /// Names of the live locks, sorted. The synchronization lock is never
    /// listed.
    pub async fn list_locks(&self) -> Result<Vec<String>> {
        let mut session = self.session().await?;
        let rows = session
            .query(
                &OptionsStatement::ListLocks {
                    prefix: LOCK_PREFIX.to_string(),
                    excluded: lock_key(SYNC_LOCK),
                }
                .into(),
            )
            .await?;

        rows.rows
            .iter()
            .map(|row| {
                row.first()
                    .and_then(Value::as_str)
                    .and_then(|key| key.strip_prefix(LOCK_PREFIX))
                    .map(str::to_string)
                    .ok_or_else(|| strata_core::err!("unexpected lock row {row:?}"))
            })
            .collect()
    }

    /// Removes every lock, live or expired, except the synchronization
    /// lock. Returns the number of rows removed.
    pub async fn unlock_all(&self) -> Result<u64> {
        let mut session = self.session().await?;
        session
            .execute(
                &OptionsStatement::DeleteLocks {
                    prefix: LOCK_PREFIX.to_string(),
                    excluded: lock_key(SYNC_LOCK),
                }
                .into(),
            )
            .await
    }
}

pub(crate) fn lock_key(name: &str) -> String {
    format!("{LOCK_PREFIX}{name}")
}

fn user_lock_key(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(strata_core::err!("lock name must not be empty"));
    }
    if name == SYNC_LOCK {
        return Err(Error::invalid_option_key(name));
    }
    Ok(lock_key(name))
}

/// One attempt at taking the lock row `key`.
pub(crate) async fn try_acquire(
    session: &mut Session<'_>,
    key: &str,
    holder: &str,
    ttl: Duration,
) -> Result<bool> {
    let stmt: Statement = OptionsStatement::AcquireLock {
        key: key.to_string(),
        holder: holder.to_string(),
        ttl_ms: millis(ttl),
    }
    .into();

    Ok(session.execute(&stmt).await? == 1)
}

/// Removes the lock row `key`. Returns `true` if it was live.
pub(crate) async fn release(session: &mut Session<'_>, key: &str) -> Result<bool> {
    let live = session
        .execute(&OptionsStatement::ReleaseLiveLock { key: key.to_string() }.into())
        .await?;

    // An expired row is garbage either way
    session
        .execute(&OptionsStatement::Delete { key: key.to_string() }.into())
        .await?;

    Ok(live > 0)
}

/// Exponential delay between attempts at a held lock.
pub(crate) struct Backoff {
    interval: Duration,
    max_interval: Duration,
    deadline: Option<Instant>,
}

impl Backoff {
    pub(crate) fn new(config: &Config, timeout: Option<Duration>) -> Backoff {
        Backoff {
            interval: config.lock_poll_interval,
            max_interval: config.lock_poll_max_interval,
            deadline: timeout.map(|timeout| Instant::now() + timeout),
        }
    }

    /// Sleeps until the next attempt. Returns `false` once the deadline has
    /// passed.
    pub(crate) async fn wait(&mut self, lock: &str) -> bool {
        let delay = match self.deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                self.interval.min(deadline - now)
            }
            None => self.interval,
        };

        tracing::debug!(lock, delay_ms = millis(delay), "lock held; polling");
        tokio::time::sleep(delay).await;

        self.interval = (self.interval * 2).min(self.max_interval);
        true
    }
}

/// Whole milliseconds of `duration`, saturating at `i64::MAX`.
fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
