//! Status registry for the attest subsystem
//!
//! Owns one lifecycle record per external identity and the operations
//! that move it through the review workflow: `lookup_or_create`,
//! `submit`, `decide`, and `remove_attachment`. Collaborator services
//! (enrichment, attachment storage, reviewer notification) are trait
//! seams injected at construction; the reviewer notification after a
//! submission is dispatched fire-and-forget.

mod collaborators;
mod config;
mod registry;

pub use collaborators::{
    testing, AttachmentStore, EnrichmentService, NotificationSink, ReviewNotification,
    StoredAttachment,
};
pub use config::RegistryConfig;
pub use registry::StatusRegistry;
