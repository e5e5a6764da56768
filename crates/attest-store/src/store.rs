//! In-memory transactional store for status records and ledger entries
//!
//! Both tables live behind one `RwLock`. Readers take a consistent
//! snapshot under the read lock; writers commit atomically under the
//! write lock. Status records carry a per-record version: commits are
//! optimistic, and a commit whose snapshot went stale fails with
//! [`CommitError`] for the caller to retry against fresh state. The
//! identity uniqueness constraint is enforced at insert, which is what
//! makes concurrent lookup-or-create race-safe — the loser sees
//! [`CommitError::UniqueViolation`] and retries as an update.
//!
//! The ledger table is append-only. Entries never conflict, and the only
//! mutation besides insert is retention pruning, which runs its
//! count-delete-recount check inside a single write transaction and
//! restores the pre-operation state on any mismatch.

use attest_core::{
    AttestError, CipherAction, EntryId, Identity, LedgerEntry, StatusRecord,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A value paired with the store version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// Commit version; passed back on update for conflict detection
    pub version: u64,
    /// The stored value
    pub value: T,
}

/// Commit-time failures surfaced to callers for retry handling
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommitError {
    /// Insert hit the identity uniqueness constraint
    #[error("record for {0} already exists")]
    UniqueViolation(Identity),

    /// Update's snapshot went stale; the record changed since it was read
    #[error("record for {0} changed since it was read")]
    VersionConflict(Identity),

    /// Update targeted a record that no longer exists
    #[error("record for {0} no longer exists")]
    Missing(Identity),
}

impl CommitError {
    /// Whether re-reading and re-committing can resolve this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UniqueViolation(_) | Self::VersionConflict(_))
    }
}

impl From<CommitError> for AttestError {
    fn from(err: CommitError) -> Self {
        AttestError::transient_store(err.to_string())
    }
}

#[derive(Debug, Default)]
struct Tables {
    records: HashMap<Identity, Versioned<StatusRecord>>,
    entries: Vec<LedgerEntry>,
}

/// Shared store over the status-record and ledger tables
#[derive(Debug, Clone, Default)]
pub struct RegistryStore {
    inner: Arc<RwLock<Tables>>,
}

impl RegistryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Status records
    // =========================================================================

    /// Read one record with its current version
    pub async fn get_record(&self, identity: &Identity) -> Option<Versioned<StatusRecord>> {
        let tables = self.inner.read().await;
        tables.records.get(identity).cloned()
    }

    /// Insert a new record, enforcing identity uniqueness
    pub async fn insert_record(
        &self,
        record: StatusRecord,
    ) -> Result<Versioned<StatusRecord>, CommitError> {
        let mut tables = self.inner.write().await;
        if tables.records.contains_key(&record.identity) {
            return Err(CommitError::UniqueViolation(record.identity));
        }
        let versioned = Versioned {
            version: 1,
            value: record,
        };
        tables
            .records
            .insert(versioned.value.identity.clone(), versioned.clone());
        Ok(versioned)
    }

    /// Replace a record if it is still at the expected version
    pub async fn update_record(
        &self,
        expected_version: u64,
        record: StatusRecord,
    ) -> Result<Versioned<StatusRecord>, CommitError> {
        let mut tables = self.inner.write().await;
        let current = tables
            .records
            .get(&record.identity)
            .ok_or_else(|| CommitError::Missing(record.identity.clone()))?;
        if current.version != expected_version {
            return Err(CommitError::VersionConflict(record.identity));
        }
        let versioned = Versioned {
            version: expected_version + 1,
            value: record,
        };
        tables
            .records
            .insert(versioned.value.identity.clone(), versioned.clone());
        Ok(versioned)
    }

    // =========================================================================
    // Ledger entries
    // =========================================================================

    /// Insert an immutable ledger entry, assigning its id
    pub async fn append_entry(
        &self,
        identity: Identity,
        action: CipherAction,
        key_material: String,
        recorded_at_ms: u64,
    ) -> LedgerEntry {
        let entry = LedgerEntry {
            id: EntryId::generate(),
            identity,
            action,
            key_material,
            recorded_at_ms,
        };
        let mut tables = self.inner.write().await;
        tables.entries.push(entry.clone());
        entry
    }

    /// One consistent snapshot of the whole ledger table
    pub async fn entries_snapshot(&self) -> Vec<LedgerEntry> {
        let tables = self.inner.read().await;
        tables.entries.clone()
    }

    /// Delete every entry recorded strictly before `cutoff_ms`
    ///
    /// Runs count-delete-recount as one write transaction. If the deleted
    /// count does not match the pre-delete count, or any entry older than
    /// the cutoff survives, the pre-operation state is restored and the
    /// call fails with `ConsistencyViolation` — partial deletion is never
    /// visible to readers.
    pub async fn prune_entries_older_than(&self, cutoff_ms: u64) -> attest_core::Result<u64> {
        let mut tables = self.inner.write().await;
        let expected = tables
            .entries
            .iter()
            .filter(|e| e.recorded_at_ms < cutoff_ms)
            .count();
        let before = tables.entries.len();
        let checkpoint = tables.entries.clone();

        tables.entries.retain(|e| e.recorded_at_ms >= cutoff_ms);
        let deleted = before - tables.entries.len();
        let residual = tables
            .entries
            .iter()
            .filter(|e| e.recorded_at_ms < cutoff_ms)
            .count();

        if deleted != expected || residual != 0 {
            tables.entries = checkpoint;
            tracing::error!(
                expected,
                deleted,
                residual,
                cutoff_ms,
                "retention prune verification failed; transaction aborted"
            );
            return Err(AttestError::consistency_violation(format!(
                "prune expected to delete {expected} entries but deleted {deleted} \
                 with {residual} stale entries remaining; no deletion was applied"
            )));
        }
        Ok(deleted as u64)
    }
}
