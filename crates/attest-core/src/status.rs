//! Verification status state machine
//!
//! One status per identity, moving through the review workflow:
//!
//! ```text
//! Unverified --submit--> Pending --decide--> Approved | Rejected
//!                           ^                    |
//!                           +----- resubmit -----+
//! ```
//!
//! `Unverified` is implicit for never-seen identities; a record is only
//! persisted on first contact. A decision applies exclusively to a
//! `Pending` record — re-deciding an already-decided request requires a
//! fresh submission, which prevents stale double-approval.

use crate::error::{AttestError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a verification request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Identity has been seen but never submitted a request
    #[default]
    Unverified,
    /// A submission is awaiting an admin decision
    Pending,
    /// Request approved by an admin
    Approved,
    /// Request rejected by an admin
    Rejected,
}

impl VerificationStatus {
    /// Whether a decision may be applied to this status
    pub fn accepts_decision(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether this status represents an approved verification
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Stable lowercase label for logs and envelopes
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An admin decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Grant verification
    Approved,
    /// Deny verification
    Rejected,
}

impl Decision {
    /// The status this decision transitions a pending record into
    pub fn into_status(self) -> VerificationStatus {
        match self {
            Self::Approved => VerificationStatus::Approved,
            Self::Rejected => VerificationStatus::Rejected,
        }
    }

    /// Apply this decision to a current status
    ///
    /// Fails with `InvalidTransition` unless the current status is
    /// `Pending`.
    pub fn apply(self, current: VerificationStatus) -> Result<VerificationStatus> {
        if !current.accepts_decision() {
            return Err(AttestError::invalid_transition(format!(
                "cannot decide a {current} request; only pending requests accept decisions"
            )));
        }
        Ok(self.into_status())
    }
}
