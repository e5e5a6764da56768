//! Error taxonomy for registry and ledger operations

use serde::{Deserialize, Serialize};

/// Unified error type for all attest operations
///
/// Every variant carries a human-readable message; internal detail beyond
/// the message (backtraces, store internals) is never surfaced through this
/// type. `kind()` gives the stable machine-readable classification used by
/// the result envelope.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AttestError {
    /// Malformed or missing required input — the caller's fault
    #[error("Validation failed: {message}")]
    Validation {
        /// What was malformed or missing
        message: String,
    },

    /// Identity or sub-entity absent
    #[error("Not found: {message}")]
    NotFound {
        /// What was looked up and missed
        message: String,
    },

    /// Status-machine rule violated
    #[error("Invalid transition: {message}")]
    InvalidTransition {
        /// Which transition was attempted
        message: String,
    },

    /// Post-condition check failed after a bulk mutation; the transaction
    /// was rolled back and no partial state is visible
    #[error("Consistency violation: {message}")]
    ConsistencyViolation {
        /// Which check failed
        message: String,
    },

    /// Transaction aborted for infrastructure reasons
    #[error("Transient store failure: {message}")]
    TransientStore {
        /// Why the transaction aborted
        message: String,
    },
}

impl AttestError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an invalid transition error
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition {
            message: message.into(),
        }
    }

    /// Create a consistency violation error
    pub fn consistency_violation(message: impl Into<String>) -> Self {
        Self::ConsistencyViolation {
            message: message.into(),
        }
    }

    /// Create a transient store error
    pub fn transient_store(message: impl Into<String>) -> Self {
        Self::TransientStore {
            message: message.into(),
        }
    }

    /// Stable kind string for wire envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::ConsistencyViolation { .. } => "consistency_violation",
            Self::TransientStore { .. } => "transient_store",
        }
    }

    /// Whether the caller may blindly retry the whole operation
    ///
    /// Only transient store aborts are retry-safe, and only for operations
    /// that are themselves idempotent (lookups, queries, aggregation).
    /// Terminal errors are never retried automatically.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientStore { .. })
    }

    /// The human-readable message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::NotFound { message }
            | Self::InvalidTransition { message }
            | Self::ConsistencyViolation { message }
            | Self::TransientStore { message } => message,
        }
    }
}

/// Result type for attest operations
pub type Result<T> = std::result::Result<T, AttestError>;
