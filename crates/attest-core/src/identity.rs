//! External identity key
//!
//! Both status records and ledger entries are indexed by an `Identity`,
//! the normalized network-address string of the requesting client. The
//! registry enforces uniqueness on it; the ledger does not.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized external identity (e.g. an IP address string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Create an identity from a normalized address string
    ///
    /// Leading and trailing whitespace is stripped; any other
    /// normalization (IPv6 canonicalization, case folding) is the
    /// caller's responsibility.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    /// The identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identity is empty after normalization
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
