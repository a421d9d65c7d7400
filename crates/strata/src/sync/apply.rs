use crate::{db::Session, Result};

use std::collections::HashSet;
use strata_core::{driver::operation::Transaction, Error, PartialMigration};
use strata_sql::{MigrationPlan, Statement};

/// Applies `plan` and then `bookkeeping` in one transaction.
///
/// Foreign key enforcement cannot be toggled inside a SQLite transaction,
/// so it is switched off around it when the plan rebuilds or drops tables,
/// and the whole database is checked before committing.
pub(super) async fn transactional(
    session: &mut Session<'_>,
    plan: &MigrationPlan,
    bookkeeping: &[Statement],
) -> Result<()> {
    let foreign_keys_off = plan.requires_foreign_keys_off();

    if foreign_keys_off {
        session
            .execute(&Statement::pragma_disable_foreign_keys())
            .await?;
    }

    let result = run_in_transaction(session, plan, bookkeeping, foreign_keys_off).await;

    if foreign_keys_off {
        if let Err(err) = session
            .execute(&Statement::pragma_enable_foreign_keys())
            .await
        {
            tracing::warn!(error = %err, "failed to re-enable foreign key enforcement");
        }
    }

    result
}

async fn run_in_transaction(
    session: &mut Session<'_>,
    plan: &MigrationPlan,
    bookkeeping: &[Statement],
    check_foreign_keys: bool,
) -> Result<()> {
    session.transaction(Transaction::Start).await?;

    let result = async {
        for planned in plan.statements() {
            session.execute(planned.statement()).await?;
        }

        if check_foreign_keys {
            let violations = session
                .query(&Statement::pragma_foreign_key_check())
                .await?;
            if !violations.rows.is_empty() {
                return Err(strata_core::err!(
                    "migration leaves {} rows violating foreign keys",
                    violations.rows.len()
                ));
            }
        }

        for stmt in bookkeeping {
            session.execute(stmt).await?;
        }

        session.transaction(Transaction::Commit).await
    }
    .await;

    if let Err(err) = result {
        session.rollback().await;
        return Err(err.context(Error::sync_failed_rolled_back()));
    }

    Ok(())
}

/// Applies `plan` one statement at a time. On failure the applied
/// statements are undone in reverse order where they can be, unless a
/// created table references a table whose creation never ran: undoing
/// around such a table is not attempted.
pub(super) async fn statement_by_statement(
    session: &mut Session<'_>,
    plan: &MigrationPlan,
    bookkeeping: &[Statement],
) -> Result<()> {
    let foreign_keys_off = plan.requires_foreign_keys_off();

    if foreign_keys_off {
        session
            .execute(&Statement::pragma_disable_foreign_keys())
            .await?;
    }

    let mut applied = 0;
    let mut failure = None;

    for planned in plan.statements() {
        match session.execute(planned.statement()).await {
            Ok(_) => applied += 1,
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    let result = match failure {
        None => apply_all(session, bookkeeping).await,
        Some(err) => {
            let dangling_foreign_keys = dangling_foreign_keys(plan, applied);
            let compensated = if dangling_foreign_keys.is_empty() {
                compensate(session, plan, applied).await
            } else {
                tracing::warn!(
                    tables = ?dangling_foreign_keys,
                    "migration left foreign keys to missing tables; not compensating"
                );
                false
            };

            Err(err.context(Error::sync_failed(PartialMigration {
                applied,
                total: plan.len(),
                compensated,
                dangling_foreign_keys,
            })))
        }
    };

    if foreign_keys_off {
        if let Err(err) = session
            .execute(&Statement::pragma_enable_foreign_keys())
            .await
        {
            tracing::warn!(error = %err, "failed to re-enable foreign key enforcement");
        }
    }

    result
}

async fn apply_all(session: &mut Session<'_>, statements: &[Statement]) -> Result<()> {
    for stmt in statements {
        session.execute(stmt).await?;
    }
    Ok(())
}

/// Undoes the first `applied` statements of `plan`, last first. Returns
/// `true` only if every one of them was undone.
async fn compensate(session: &mut Session<'_>, plan: &MigrationPlan, applied: usize) -> bool {
    let mut compensated = true;

    for planned in plan.statements()[..applied].iter().rev() {
        let Some(inverse) = planned.inverse() else {
            tracing::warn!(
                statement = ?planned.statement(),
                "applied statement cannot be undone"
            );
            compensated = false;
            continue;
        };

        if let Err(err) = session.execute(inverse).await {
            tracing::warn!(error = %err, "failed to undo applied statement");
            compensated = false;
        }
    }

    compensated
}

/// Tables created by the first `applied` statements with a foreign key to a
/// table the plan creates later, i.e. never.
fn dangling_foreign_keys(plan: &MigrationPlan, applied: usize) -> Vec<String> {
    let (done, pending) = plan.statements().split_at(applied.min(plan.len()));

    let never_created: HashSet<&str> = pending
        .iter()
        .filter_map(|planned| planned.created_table())
        .collect();

    let mut dangling: Vec<String> = vec![];
    for planned in done {
        let Some(table) = planned.created_table() else {
            continue;
        };

        if planned
            .references()
            .iter()
            .any(|(_, referenced)| never_created.contains(referenced.as_str()))
            && !dangling.iter().any(|name| name == table)
        {
            dangling.push(table.to_string());
        }
    }

    dangling
}
