use super::Error;

/// Describes how far a non-transactional migration got before failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialMigration {
    /// Number of plan statements that were applied.
    pub applied: usize,

    /// Number of statements in the plan.
    pub total: usize,

    /// `true` when every applied statement was undone by compensation.
    pub compensated: bool,

    /// Tables created with foreign keys to tables whose creation never ran.
    pub dangling_foreign_keys: Vec<String>,
}

#[derive(Debug)]
pub(super) enum SyncFailed {
    /// The plan ran inside a transaction that was rolled back.
    RolledBack,

    /// The plan ran without a transaction.
    Partial(PartialMigration),
}

impl std::error::Error for SyncFailed {}

impl core::fmt::Display for SyncFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            SyncFailed::RolledBack => {
                f.write_str("schema synchronization failed; changes were rolled back")
            }
            SyncFailed::Partial(partial) if !partial.dangling_foreign_keys.is_empty() => write!(
                f,
                "schema synchronization failed after {}/{} statements; manual intervention required, tables [{}] reference tables that were never created",
                partial.applied,
                partial.total,
                partial.dangling_foreign_keys.join(", ")
            ),
            SyncFailed::Partial(partial) if partial.compensated => write!(
                f,
                "schema synchronization failed after {}/{} statements; applied changes were undone",
                partial.applied, partial.total
            ),
            SyncFailed::Partial(partial) => write!(
                f,
                "schema synchronization failed after {}/{} statements; database may be partially migrated",
                partial.applied, partial.total
            ),
        }
    }
}

impl Error {
    /// Creates a synchronization error for a transactional backend whose
    /// migration was rolled back.
    pub fn sync_failed_rolled_back() -> Error {
        Error::from(super::ErrorKind::SyncFailed(SyncFailed::RolledBack))
    }

    /// Creates a synchronization error for a migration applied without a
    /// transaction.
    pub fn sync_failed(partial: PartialMigration) -> Error {
        Error::from(super::ErrorKind::SyncFailed(SyncFailed::Partial(partial)))
    }

    fn sync_failure(&self) -> Option<&SyncFailed> {
        self.find(|kind| match kind {
            super::ErrorKind::SyncFailed(err) => Some(err),
            _ => None,
        })
    }

    /// Returns `true` if this error is a synchronization failure.
    pub fn is_sync_failed(&self) -> bool {
        self.sync_failure().is_some()
    }

    /// Returns `true` when the schema may have been left between the old and
    /// the declared state.
    pub fn possibly_partially_migrated(&self) -> bool {
        match self.sync_failure() {
            Some(SyncFailed::Partial(partial)) => {
                !partial.compensated || !partial.dangling_foreign_keys.is_empty()
            }
            _ => false,
        }
    }

    /// Returns `true` when the failure left foreign keys pointing at tables
    /// that do not exist. There is no automatic recovery from this state.
    pub fn requires_manual_intervention(&self) -> bool {
        matches!(
            self.sync_failure(),
            Some(SyncFailed::Partial(partial)) if !partial.dangling_foreign_keys.is_empty()
        )
    }

    /// Progress details of a failed non-transactional migration.
    pub fn partial_migration(&self) -> Option<&PartialMigration> {
        match self.sync_failure() {
            Some(SyncFailed::Partial(partial)) => Some(partial),
            _ => None,
        }
    }
}
