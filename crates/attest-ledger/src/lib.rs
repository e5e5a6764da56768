//! Append-only action ledger for the attest subsystem
//!
//! Owns the immutable, timestamped cipher-action events and the
//! operations over them: `append`, `query_by_identity`, `aggregate`, and
//! `prune_older_than` with post-deletion verification. Entries share the
//! identity keyspace with the status registry but reference nothing in
//! it.

mod ledger;
mod report;

pub use ledger::{ActionLedger, ACTIVITY_WINDOW_MS, MS_PER_DAY};
pub use report::{ActivityReport, HourBucket, HourlyActivity};
