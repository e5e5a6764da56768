//! Collaborator contracts consumed by the registry
//!
//! The registry calls out to three external services: geo/ISP enrichment,
//! binary attachment storage, and the reviewer notification sink. All
//! three are trait seams injected at construction; none of their
//! implementations live in this workspace. Enrichment and notification
//! failures are non-fatal by contract.

use async_trait::async_trait;
use attest_core::{AttachmentRef, GeoContext, Identity};
use serde::{Deserialize, Serialize};

/// Geo/ISP lookup for a newly created record
///
/// Failure is expressed as `None` ("no enrichment available") and never
/// propagates as a hard error.
#[async_trait]
pub trait EnrichmentService: Send + Sync {
    /// Look up geographic and ISP context for an identity
    async fn lookup(&self, identity: &Identity) -> Option<GeoContext>;
}

/// Reference returned by the external attachment store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAttachment {
    /// Identifier for later deletion
    pub remote_id: String,
    /// Public locator for display
    pub locator_url: String,
}

/// External store for binary evidence payloads
///
/// The registry keeps only the returned reference; uploading before
/// `submit` and deleting alongside `remove_attachment` are the caller's
/// responsibility.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store a binary payload, returning its reference
    async fn store(&self, payload: Vec<u8>) -> anyhow::Result<StoredAttachment>;

    /// Delete a previously stored payload
    async fn delete(&self, remote_id: &str) -> anyhow::Result<()>;
}

/// Payload delivered to the reviewer channel after a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewNotification {
    /// Identity that submitted
    pub identity: Identity,
    /// Enrichment context, if any was captured
    pub geo: Option<GeoContext>,
    /// Evidence references attached to the submission
    pub attachments: Vec<AttachmentRef>,
}

/// Asynchronous reviewer notification channel
///
/// Delivery failure is logged by the dispatcher and never reaches the
/// submitting caller.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification
    async fn notify(&self, notification: ReviewNotification) -> anyhow::Result<()>;
}

/// In-memory collaborator doubles for tests
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    /// Enrichment service that never has context available
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NoEnrichment;

    #[async_trait]
    impl EnrichmentService for NoEnrichment {
        async fn lookup(&self, _identity: &Identity) -> Option<GeoContext> {
            None
        }
    }

    /// Enrichment service returning one fixed context for every identity
    #[derive(Debug, Clone)]
    pub struct StaticEnrichment(pub GeoContext);

    #[async_trait]
    impl EnrichmentService for StaticEnrichment {
        async fn lookup(&self, _identity: &Identity) -> Option<GeoContext> {
            Some(self.0.clone())
        }
    }

    /// Attachment store keeping payloads in memory
    #[derive(Debug, Clone, Default)]
    pub struct MemoryAttachmentStore {
        payloads: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    }

    impl MemoryAttachmentStore {
        /// Create an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Whether a payload is still held under the given id
        pub async fn contains(&self, remote_id: &str) -> bool {
            self.payloads.read().await.contains_key(remote_id)
        }
    }

    #[async_trait]
    impl AttachmentStore for MemoryAttachmentStore {
        async fn store(&self, payload: Vec<u8>) -> anyhow::Result<StoredAttachment> {
            let remote_id = Uuid::new_v4().to_string();
            let locator_url = format!("memory://attachments/{remote_id}");
            self.payloads.write().await.insert(remote_id.clone(), payload);
            Ok(StoredAttachment {
                remote_id,
                locator_url,
            })
        }

        async fn delete(&self, remote_id: &str) -> anyhow::Result<()> {
            self.payloads
                .write()
                .await
                .remove(remote_id)
                .map(|_| ())
                .ok_or_else(|| anyhow::anyhow!("unknown attachment {remote_id}"))
        }
    }

    /// Notification sink that records deliveries, optionally failing them
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        delivered: Arc<RwLock<Vec<ReviewNotification>>>,
        fail: bool,
    }

    impl RecordingSink {
        /// Sink that accepts every delivery
        pub fn new() -> Self {
            Self::default()
        }

        /// Sink that fails every delivery after recording the attempt
        pub fn failing() -> Self {
            Self {
                delivered: Arc::default(),
                fail: true,
            }
        }

        /// Notifications attempted so far
        pub async fn attempted(&self) -> Vec<ReviewNotification> {
            self.delivered.read().await.clone()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn notify(&self, notification: ReviewNotification) -> anyhow::Result<()> {
            self.delivered.write().await.push(notification);
            if self.fail {
                anyhow::bail!("reviewer channel unavailable");
            }
            Ok(())
        }
    }
}
