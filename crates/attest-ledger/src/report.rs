//! Aggregation report types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar-hour activity bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HourBucket {
    /// Calendar year (UTC)
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u8,
    /// Day of month
    pub day: u8,
    /// Hour of day, 0-23
    pub hour: u8,
}

/// A bucket with its entry count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyActivity {
    /// The calendar hour
    pub bucket: HourBucket,
    /// Entries recorded within that hour
    pub count: u64,
}

/// Ledger-wide aggregation result
///
/// `action_counts` covers the entire ledger; `hourly_activity` covers
/// only the trailing 24-hour window from the aggregation call, bucketed
/// by calendar hour and sorted ascending. Both come from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// Total entries per action kind, unbounded by time
    pub action_counts: BTreeMap<String, u64>,
    /// Per-hour counts over the trailing 24 hours, ascending
    pub hourly_activity: Vec<HourlyActivity>,
}
