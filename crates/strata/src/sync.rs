//! Brings the database in line with the declared schema on connect.
//!
//! The sequence is:
//!
//! 1. make sure the options table exists, creating it when the database is
//!    fresh. The process that creates it also seeds the sync lock in the
//!    same transaction, so no other process can migrate in between.
//! 2. take the sync lock, waiting for whoever holds it.
//! 3. compare the stored schema fingerprint with the declared one. When they
//!    match there is nothing to do.
//! 4. introspect, diff, and apply the migration plan, then record the new
//!    fingerprint and key registry.
//! 5. release the sync lock, whatever happened.

mod apply;
mod introspect;

use crate::{
    db::{
        lock::{self, Backoff, SYNC_LOCK},
        options::{self, COLLECTIONS, FINGERPRINT},
        Session, Shared,
    },
    Result, SyncReport,
};

use strata_core::{
    driver::operation::Transaction,
    schema::{
        db::{self, SchemaDiff},
        mapping::{KeyRegistry, SchemaMap},
    },
    Error,
};
use strata_sql::{stmt::OptionsStatement, MigrationPlan, Statement};

pub(crate) async fn synchronize(
    shared: &Shared,
    session: &mut Session<'_>,
) -> Result<SyncReport> {
    let key = lock::lock_key(SYNC_LOCK);
    let transactional = shared.driver.capability().transactions;

    let bootstrap = if transactional {
        bootstrap(shared, session, &key).await
    } else {
        bootstrap_without_transaction(session).await
    };
    let (created_options_table, seeded) =
        bootstrap.map_err(|err| err.context("failed to prepare the options table"))?;

    if !seeded {
        let mut backoff = Backoff::new(&shared.config, None);
        while !lock::try_acquire(session, &key, &shared.holder, shared.config.sync_lock_ttl).await? {
            backoff.wait(SYNC_LOCK).await;
        }
    }

    tracing::debug!(holder = %shared.holder, "sync lock acquired");

    let result = migrate(shared, session).await;
    let released = lock::release(session, &key).await;

    match (result, released) {
        (Ok(synced), Ok(_)) => Ok(SyncReport {
            created_options_table,
            synced,
        }),
        (Ok(_), Err(err)) => Err(err.context("failed to release the sync lock")),
        (Err(err), Ok(_)) => Err(err),
        (Err(err), Err(release_err)) => {
            tracing::warn!(error = %release_err, "failed to release the sync lock");
            Err(err)
        }
    }
}

/// Creates the options table if needed. Returns whether it was created and
/// whether the sync lock was seeded along with it.
async fn bootstrap(shared: &Shared, session: &mut Session<'_>, key: &str) -> Result<(bool, bool)> {
    session.transaction(Transaction::Start).await?;

    match bootstrap_in_transaction(shared, session, key).await {
        Ok(created) => {
            session.transaction(Transaction::Commit).await?;
            Ok((created, created))
        }
        Err(err) => {
            session.rollback().await;
            Err(err)
        }
    }
}

async fn bootstrap_in_transaction(
    shared: &Shared,
    session: &mut Session<'_>,
    key: &str,
) -> Result<bool> {
    session.execute(&OptionsStatement::BootstrapLock.into()).await?;

    if options_table_exists(session).await? {
        return Ok(false);
    }

    session.execute(&OptionsStatement::CreateTable.into()).await?;

    let seeded = lock::try_acquire(session, key, &shared.holder, shared.config.sync_lock_ttl).await?;
    if !seeded {
        return Err(strata_core::err!("failed to seed the sync lock"));
    }

    tracing::info!("created options table");
    Ok(true)
}

/// Without transactions two processes may both see no table; the create is
/// idempotent and both report having created it.
async fn bootstrap_without_transaction(session: &mut Session<'_>) -> Result<(bool, bool)> {
    if options_table_exists(session).await? {
        return Ok((false, false));
    }

    session.execute(&OptionsStatement::CreateTable.into()).await?;
    tracing::info!("created options table");
    Ok((true, false))
}

async fn options_table_exists(session: &mut Session<'_>) -> Result<bool> {
    let rows = session.query(&OptionsStatement::TableExists.into()).await?;
    Ok(rows
        .first_value()
        .and_then(strata_core::stmt::Value::as_i64)
        .unwrap_or(0)
        > 0)
}

/// Runs with the sync lock held. Returns `false` if the stored fingerprint
/// already matched.
async fn migrate(shared: &Shared, session: &mut Session<'_>) -> Result<bool> {
    let fingerprint = shared.schema.fingerprint()?;

    let stored: Option<String> = match options::get(session, FINGERPRINT).await? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(stored) => Some(stored),
            Err(err) => {
                tracing::warn!(error = %err, "malformed stored schema fingerprint, resynchronizing");
                None
            }
        },
        None => None,
    };

    if stored.as_deref() == Some(fingerprint.as_str()) {
        tracing::debug!(%fingerprint, "schema fingerprint unchanged");
        return Ok(false);
    }

    let mut introspected = introspect::introspect(session).await?;

    let registry: KeyRegistry = match options::get(session, COLLECTIONS).await? {
        Some(json) => serde_json::from_str(&json)
            .map_err(|err| Error::from(err).context("malformed collection registry"))?,
        None => KeyRegistry::default(),
    };

    let map = SchemaMap::build(&shared.schema, &introspected, &registry);
    if shared.config.preserve_unrelated_tables {
        map.retain_related(&mut introspected);
    }

    let capability = shared.driver.capability();
    let declared = db::Schema::from_app(&shared.schema, capability)?;
    let hints = map.rename_hints();
    let diff = SchemaDiff::from(
        &introspected,
        &declared,
        &hints,
        shared.config.preserve_unrelated_tables,
    );
    let plan = MigrationPlan::from_diff(&diff, capability);

    for warning in plan.warnings() {
        tracing::warn!("{warning}");
    }

    let bookkeeping: Vec<Statement> = vec![
        options::set(FINGERPRINT, serde_json::to_string(&fingerprint)?),
        options::set(COLLECTIONS, serde_json::to_string(&map.declared_registry())?),
    ];

    if capability.transactions {
        apply::transactional(session, &plan, &bookkeeping).await?;
    } else {
        apply::statement_by_statement(session, &plan, &bookkeeping).await?;
    }

    tracing::info!(
        statements = plan.len(),
        %fingerprint,
        "schema synchronized"
    );

    Ok(true)
}
