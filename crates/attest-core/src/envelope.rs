//! Result envelope for RPC/HTTP bindings
//!
//! Every exposed operation returns `{ok, data | error_kind,
//! error_message}`. Only the stable kind and the human-readable message
//! cross the boundary; internal detail stays inside.

use crate::error::AttestError;
use serde::{Deserialize, Serialize};

/// Wire-level result envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    /// Whether the operation succeeded
    pub ok: bool,
    /// Payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Stable error kind on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Human-readable error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl<T> ResultEnvelope<T> {
    /// Envelope for a successful operation
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error_kind: None,
            error_message: None,
        }
    }

    /// Envelope for a failed operation
    pub fn failure(err: &AttestError) -> Self {
        Self {
            ok: false,
            data: None,
            error_kind: Some(err.kind().to_string()),
            error_message: Some(err.message().to_string()),
        }
    }
}

impl<T> From<crate::error::Result<T>> for ResultEnvelope<T> {
    fn from(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(&err),
        }
    }
}
