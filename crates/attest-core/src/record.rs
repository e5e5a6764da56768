//! Status record and its owned attachment references
//!
//! One `StatusRecord` exists per identity. The record owns only
//! references to uploaded evidence; the binary payloads live in an
//! external attachment store and are deleted by the caller, never here.

use crate::identity::Identity;
use crate::status::VerificationStatus;
use serde::{Deserialize, Serialize};

/// Which attachment sequence an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentKind {
    /// Primary evidence (required for submission)
    Primary,
    /// Supporting evidence (optional)
    Supporting,
}

impl AttachmentKind {
    /// Stable lowercase label for logs and envelopes
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Supporting => "supporting",
        }
    }
}

/// Reference to externally stored binary evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Identifier assigned by the external attachment store
    pub remote_id: String,
    /// Public locator for display
    pub locator_url: String,
    /// Upload timestamp (unix millis)
    pub uploaded_at_ms: u64,
}

/// Freeform contact details captured on submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Device description
    pub device: Option<String>,
    /// Operating system description
    pub os: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
}

/// Geographic/ISP context from the enrichment service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoContext {
    /// City name
    pub city: Option<String>,
    /// Region or state
    pub region: Option<String>,
    /// Country name
    pub country: Option<String>,
    /// Latitude
    pub lat: Option<f64>,
    /// Longitude
    pub lon: Option<f64>,
    /// ISP name
    pub isp_name: Option<String>,
}

/// Lifecycle record for one identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// The unique identity key
    pub identity: Identity,
    /// Current workflow status
    pub status: VerificationStatus,
    /// Lookup counter, incremented on every lookup
    pub access_count: u64,
    /// Timestamp of the most recent lookup (unix millis)
    pub last_accessed_ms: u64,
    /// Primary evidence references, in upload order
    pub primary_attachments: Vec<AttachmentRef>,
    /// Supporting evidence references, in upload order
    pub supporting_attachments: Vec<AttachmentRef>,
    /// Contact details from the most recent submission
    pub contact: Option<ContactInfo>,
    /// Timestamp of the most recent submission (unix millis)
    pub requested_at_ms: Option<u64>,
    /// Admin notes recorded with the decision
    pub review_notes: Option<String>,
    /// Enrichment context captured on creation, if available
    pub geo: Option<GeoContext>,
}

impl StatusRecord {
    /// Create the record persisted on first contact
    pub fn new(identity: Identity, now_ms: u64) -> Self {
        Self {
            identity,
            status: VerificationStatus::Unverified,
            access_count: 1,
            last_accessed_ms: now_ms,
            primary_attachments: Vec::new(),
            supporting_attachments: Vec::new(),
            contact: None,
            requested_at_ms: None,
            review_notes: None,
            geo: None,
        }
    }

    /// Register a lookup: bump the access counter and stamp the time
    pub fn touch(&mut self, now_ms: u64) {
        self.access_count += 1;
        self.last_accessed_ms = now_ms;
    }

    /// Derived projection: has this identity been approved?
    pub fn is_verified(&self) -> bool {
        self.status.is_verified()
    }

    /// The attachment sequence for the given kind
    pub fn attachments(&self, kind: AttachmentKind) -> &[AttachmentRef] {
        match kind {
            AttachmentKind::Primary => &self.primary_attachments,
            AttachmentKind::Supporting => &self.supporting_attachments,
        }
    }

    /// Append references to the named sequence, preserving upload order
    pub fn append_attachments(&mut self, kind: AttachmentKind, refs: Vec<AttachmentRef>) {
        match kind {
            AttachmentKind::Primary => self.primary_attachments.extend(refs),
            AttachmentKind::Supporting => self.supporting_attachments.extend(refs),
        }
    }

    /// Remove one reference from the named sequence by remote id
    ///
    /// Returns the removed reference, or `None` if the id is not present.
    /// The relative order of the remainder is preserved.
    pub fn remove_attachment(
        &mut self,
        kind: AttachmentKind,
        remote_id: &str,
    ) -> Option<AttachmentRef> {
        let seq = match kind {
            AttachmentKind::Primary => &mut self.primary_attachments,
            AttachmentKind::Supporting => &mut self.supporting_attachments,
        };
        let idx = seq.iter().position(|a| a.remote_id == remote_id)?;
        Some(seq.remove(idx))
    }
}
