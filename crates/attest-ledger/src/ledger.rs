//! Action ledger operations
//!
//! Immutable cipher-action events per identity, over the shared store.
//! Appends never conflict; queries and aggregation read one consistent
//! snapshot; retention pruning delegates to the store's verified
//! count-delete-recount transaction.

use crate::report::{ActivityReport, HourBucket, HourlyActivity};
use attest_core::{AttestError, CipherAction, Clock, Identity, LedgerEntry, Result};
use attest_store::RegistryStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;

/// Milliseconds per day
pub const MS_PER_DAY: u64 = 24 * 60 * 60 * 1_000;

/// Width of the hourly-activity aggregation window
pub const ACTIVITY_WINDOW_MS: u64 = MS_PER_DAY;

/// Coordinator for ledger operations
pub struct ActionLedger {
    store: RegistryStore,
    clock: Arc<dyn Clock>,
}

impl ActionLedger {
    /// Create a ledger over the given store
    pub fn new(store: RegistryStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Record one cipher-key action
    ///
    /// The action label must parse to a recognized kind; anything else is
    /// a `ValidationError`. `recorded_at_ms` defaults to insertion time.
    /// Entries are immutable once inserted and no uniqueness applies —
    /// repeated actions per identity are expected.
    pub async fn append(
        &self,
        identity: Identity,
        action: &str,
        key_material: String,
        recorded_at_ms: Option<u64>,
    ) -> Result<LedgerEntry> {
        if identity.is_empty() {
            return Err(AttestError::validation("identity must not be empty"));
        }
        let action = CipherAction::parse(action)?;
        let recorded_at_ms = match recorded_at_ms {
            Some(at) => at,
            None => self.clock.now_ms().await,
        };
        let entry = self
            .store
            .append_entry(identity, action, key_material, recorded_at_ms)
            .await;
        tracing::debug!(
            id = %entry.id,
            identity = %entry.identity,
            action = %entry.action,
            "ledger entry appended"
        );
        Ok(entry)
    }

    /// All entries for an identity, most-recent-first
    ///
    /// Reads a single logical snapshot; concurrent appends land either
    /// wholly before or wholly after it.
    pub async fn query_by_identity(&self, identity: &Identity) -> Result<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> = self
            .store
            .entries_snapshot()
            .await
            .into_iter()
            .filter(|e| &e.identity == identity)
            .collect();
        // Stable sort: entries sharing a timestamp keep insertion order.
        entries.sort_by(|a, b| b.recorded_at_ms.cmp(&a.recorded_at_ms));
        Ok(entries)
    }

    /// Aggregate the ledger from one snapshot
    ///
    /// Action counts cover every entry regardless of age; hourly activity
    /// covers only entries within the trailing 24-hour window from the
    /// call time, bucketed by calendar hour (UTC) and sorted ascending.
    pub async fn aggregate(&self) -> Result<ActivityReport> {
        let now_ms = self.clock.now_ms().await;
        let entries = self.store.entries_snapshot().await;
        let window_start = now_ms.saturating_sub(ACTIVITY_WINDOW_MS);

        let mut action_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut buckets: BTreeMap<HourBucket, u64> = BTreeMap::new();
        for entry in &entries {
            *action_counts
                .entry(entry.action.as_str().to_string())
                .or_insert(0) += 1;
            if entry.recorded_at_ms >= window_start {
                *buckets.entry(hour_bucket(entry.recorded_at_ms)).or_insert(0) += 1;
            }
        }

        Ok(ActivityReport {
            action_counts,
            hourly_activity: buckets
                .into_iter()
                .map(|(bucket, count)| HourlyActivity { bucket, count })
                .collect(),
        })
    }

    /// Delete entries recorded strictly more than `days` days ago
    ///
    /// The store runs count-delete-recount in one transaction; a mismatch
    /// aborts with `ConsistencyViolation` and restores the pre-operation
    /// state, so either a consistent snapshot is removed or nothing is.
    pub async fn prune_older_than(&self, days: u32) -> Result<u64> {
        let now_ms = self.clock.now_ms().await;
        let cutoff_ms = now_ms.saturating_sub(u64::from(days) * MS_PER_DAY);
        let deleted = self.store.prune_entries_older_than(cutoff_ms).await?;
        tracing::info!(days, cutoff_ms, deleted, "ledger retention prune completed");
        Ok(deleted)
    }
}

/// Calendar-hour bucket (UTC) for a unix-millis timestamp
fn hour_bucket(at_ms: u64) -> HourBucket {
    let ts = OffsetDateTime::from_unix_timestamp((at_ms / 1_000) as i64)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    HourBucket {
        year: ts.year(),
        month: u8::from(ts.month()),
        day: ts.day(),
        hour: ts.hour(),
    }
}
