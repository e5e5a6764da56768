//! Append-only ledger entry types
//!
//! Entries record cipher-key actions per identity. They are immutable
//! after insert, ordered by `recorded_at_ms`, and only ever removed by
//! retention pruning. No uniqueness constraint applies; many entries per
//! identity are expected. Ledger entries carry no reference to status
//! records — the two are independent entities.

use crate::error::{AttestError, Result};
use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque ledger entry identifier, assigned at insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh entry id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Recognized cipher-key actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherAction {
    /// A key was used to encrypt
    Encrypt,
    /// A key was used to decrypt
    Decrypt,
}

impl CipherAction {
    /// Parse a caller-supplied action label
    ///
    /// Accepts the two recognized kinds case-insensitively; anything else
    /// is a `ValidationError`.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "encrypt" => Ok(Self::Encrypt),
            "decrypt" => Ok(Self::Decrypt),
            other => Err(AttestError::validation(format!(
                "unrecognized action {other:?}; expected \"encrypt\" or \"decrypt\""
            ))),
        }
    }

    /// Stable lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
        }
    }
}

impl fmt::Display for CipherAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Identifier assigned at insert
    pub id: EntryId,
    /// Identity the action was performed for
    pub identity: Identity,
    /// Which cipher action was performed
    pub action: CipherAction,
    /// Opaque key payload
    pub key_material: String,
    /// When the action happened (unix millis)
    pub recorded_at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_recognized_actions_case_insensitively() {
        assert_matches!(CipherAction::parse("encrypt"), Ok(CipherAction::Encrypt));
        assert_matches!(CipherAction::parse("Decrypt"), Ok(CipherAction::Decrypt));
        assert_matches!(CipherAction::parse(" ENCRYPT "), Ok(CipherAction::Encrypt));
    }

    #[test]
    fn rejects_unrecognized_actions() {
        assert_matches!(
            CipherAction::parse("rotate"),
            Err(AttestError::Validation { .. })
        );
        assert_matches!(CipherAction::parse(""), Err(AttestError::Validation { .. }));
    }
}
