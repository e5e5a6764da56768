//! Status registry operations
//!
//! One record per identity, moving through the review workflow. Every
//! public operation is one optimistic transaction against the store:
//! read a versioned snapshot, mutate a copy, commit with a version check,
//! and retry against fresh state on conflict within a bounded budget.
//! Terminal errors (`Validation`, `NotFound`, `InvalidTransition`) are
//! never retried; an exhausted budget surfaces as `TransientStore`.

use crate::collaborators::{EnrichmentService, NotificationSink, ReviewNotification};
use crate::config::RegistryConfig;
use attest_core::{
    AttachmentKind, AttachmentRef, AttestError, Clock, ContactInfo, Decision, Identity, Result,
    StatusRecord, VerificationStatus,
};
use attest_store::{RegistryStore, RetryBudget, Versioned};
use std::sync::Arc;

/// Coordinator for status-record operations
pub struct StatusRegistry {
    store: RegistryStore,
    clock: Arc<dyn Clock>,
    enrichment: Arc<dyn EnrichmentService>,
    notifier: Arc<dyn NotificationSink>,
    config: RegistryConfig,
}

impl StatusRegistry {
    /// Create a registry over the given store and collaborators
    pub fn new(
        store: RegistryStore,
        clock: Arc<dyn Clock>,
        enrichment: Arc<dyn EnrichmentService>,
        notifier: Arc<dyn NotificationSink>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            store,
            clock,
            enrichment,
            notifier,
            config,
        }
    }

    /// The registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // =========================================================================
    // lookup_or_create
    // =========================================================================

    /// Look up a record, creating it on first contact
    ///
    /// Found: bumps the access counter, stamps the access time, returns
    /// `(record, false)`. Absent: persists a fresh `Unverified` record
    /// and returns `(record, true)`. Two concurrent calls for the same
    /// unseen identity create exactly one record — the loser of the
    /// insert race observes the uniqueness violation and retries as an
    /// update. On the create path, geo enrichment is attempted
    /// best-effort; its failure never blocks creation.
    pub async fn lookup_or_create(&self, identity: Identity) -> Result<(StatusRecord, bool)> {
        validate_identity(&identity)?;
        let mut budget = RetryBudget::new(self.config.max_commit_attempts);
        loop {
            match self.store.get_record(&identity).await {
                Some(versioned) => {
                    let mut record = versioned.value;
                    record.touch(self.clock.now_ms().await);
                    match self.store.update_record(versioned.version, record).await {
                        Ok(committed) => return Ok((committed.value, false)),
                        Err(err) if err.is_retryable() => budget.spend("lookup_or_create")?,
                        Err(err) => return Err(err.into()),
                    }
                }
                None => {
                    let now = self.clock.now_ms().await;
                    let record = StatusRecord::new(identity.clone(), now);
                    match self.store.insert_record(record).await {
                        Ok(committed) => {
                            tracing::debug!(identity = %identity, "created status record");
                            let record = self.enrich_new_record(committed).await;
                            return Ok((record, true));
                        }
                        // Lost the creation race; loop around and update.
                        Err(err) if err.is_retryable() => budget.spend("lookup_or_create")?,
                        Err(err) => return Err(err.into()),
                    }
                }
            }
        }
    }

    /// Best-effort geo enrichment of a freshly created record
    async fn enrich_new_record(&self, committed: Versioned<StatusRecord>) -> StatusRecord {
        if !self.config.enrichment_enabled {
            return committed.value;
        }
        let Some(geo) = self.enrichment.lookup(&committed.value.identity).await else {
            tracing::debug!(
                identity = %committed.value.identity,
                "no enrichment available"
            );
            return committed.value;
        };
        let mut enriched = committed.value.clone();
        enriched.geo = Some(geo);
        match self.store.update_record(committed.version, enriched).await {
            Ok(updated) => updated.value,
            Err(err) => {
                // The record moved on; keep the committed state.
                tracing::debug!(
                    identity = %committed.value.identity,
                    %err,
                    "skipping enrichment write"
                );
                committed.value
            }
        }
    }

    // =========================================================================
    // submit
    // =========================================================================

    /// Record a verification submission for an identity
    ///
    /// Requires at least one primary attachment. Performs the
    /// lookup-or-create, overwrites contact details, appends to both
    /// attachment sequences, and moves the record to `Pending` whatever
    /// its prior status — a resubmission on a decided record reopens
    /// review. After the commit, a reviewer notification is dispatched
    /// fire-and-forget.
    pub async fn submit(
        &self,
        identity: Identity,
        contact: ContactInfo,
        primary: Vec<AttachmentRef>,
        supporting: Vec<AttachmentRef>,
    ) -> Result<StatusRecord> {
        validate_identity(&identity)?;
        if primary.is_empty() {
            return Err(AttestError::validation(
                "at least one primary attachment is required",
            ));
        }
        let mut budget = RetryBudget::new(self.config.max_commit_attempts);
        loop {
            let now = self.clock.now_ms().await;
            let outcome = match self.store.get_record(&identity).await {
                Some(versioned) => {
                    let mut record = versioned.value;
                    record.touch(now);
                    apply_submission(&mut record, &contact, &primary, &supporting, now);
                    self.store.update_record(versioned.version, record).await
                }
                None => {
                    let mut record = StatusRecord::new(identity.clone(), now);
                    apply_submission(&mut record, &contact, &primary, &supporting, now);
                    self.store.insert_record(record).await
                }
            };
            match outcome {
                Ok(committed) => {
                    tracing::info!(
                        identity = %identity,
                        attachments = committed.value.primary_attachments.len(),
                        "submission recorded; review pending"
                    );
                    self.dispatch_notification(&committed.value);
                    return Ok(committed.value);
                }
                Err(err) if err.is_retryable() => budget.spend("submit")?,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Dispatch the reviewer notification without blocking the caller
    ///
    /// The submission is already committed; delivery failure is logged
    /// and never propagated or rolled back.
    fn dispatch_notification(&self, record: &StatusRecord) {
        if !self.config.notify_on_submit {
            return;
        }
        let notification = ReviewNotification {
            identity: record.identity.clone(),
            geo: record.geo.clone(),
            attachments: record
                .primary_attachments
                .iter()
                .chain(record.supporting_attachments.iter())
                .cloned()
                .collect(),
        };
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(err) = notifier.notify(notification).await {
                tracing::warn!(%err, "reviewer notification failed");
            }
        });
    }

    // =========================================================================
    // decide
    // =========================================================================

    /// Apply an admin decision to a pending request
    ///
    /// Fails with `NotFound` if the identity has no record and with
    /// `InvalidTransition` unless the record is `Pending`. Re-deciding a
    /// decided request requires a fresh submission.
    pub async fn decide(
        &self,
        identity: Identity,
        decision: Decision,
        notes: Option<String>,
    ) -> Result<StatusRecord> {
        let mut budget = RetryBudget::new(self.config.max_commit_attempts);
        loop {
            let versioned = self
                .store
                .get_record(&identity)
                .await
                .ok_or_else(|| AttestError::not_found(format!("no record for {identity}")))?;
            let mut record = versioned.value;
            record.status = decision.apply(record.status)?;
            if let Some(notes) = notes.clone() {
                record.review_notes = Some(notes);
            }
            match self.store.update_record(versioned.version, record).await {
                Ok(committed) => {
                    tracing::info!(
                        identity = %identity,
                        status = %committed.value.status,
                        verified = committed.value.is_verified(),
                        "decision recorded"
                    );
                    return Ok(committed.value);
                }
                Err(err) if err.is_retryable() => budget.spend("decide")?,
                Err(err) => return Err(err.into()),
            }
        }
    }

    // =========================================================================
    // remove_attachment
    // =========================================================================

    /// Remove one attachment reference from the named sequence
    ///
    /// Fails with `NotFound` if the record or the attachment id is
    /// absent, leaving both sequences unchanged. Only the reference is
    /// removed here; deleting the external binary is the caller's job.
    pub async fn remove_attachment(
        &self,
        identity: Identity,
        attachment_id: &str,
        kind: AttachmentKind,
    ) -> Result<()> {
        let mut budget = RetryBudget::new(self.config.max_commit_attempts);
        loop {
            let versioned = self
                .store
                .get_record(&identity)
                .await
                .ok_or_else(|| AttestError::not_found(format!("no record for {identity}")))?;
            let mut record = versioned.value;
            if record.remove_attachment(kind, attachment_id).is_none() {
                return Err(AttestError::not_found(format!(
                    "no {} attachment {attachment_id} for {identity}",
                    kind.as_str()
                )));
            }
            match self.store.update_record(versioned.version, record).await {
                Ok(_) => {
                    tracing::debug!(
                        identity = %identity,
                        attachment_id,
                        kind = kind.as_str(),
                        "attachment reference removed"
                    );
                    return Ok(());
                }
                Err(err) if err.is_retryable() => budget.spend("remove_attachment")?,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn validate_identity(identity: &Identity) -> Result<()> {
    if identity.is_empty() {
        return Err(AttestError::validation("identity must not be empty"));
    }
    Ok(())
}

fn apply_submission(
    record: &mut StatusRecord,
    contact: &ContactInfo,
    primary: &[AttachmentRef],
    supporting: &[AttachmentRef],
    now_ms: u64,
) {
    record.contact = Some(contact.clone());
    record.append_attachments(AttachmentKind::Primary, primary.to_vec());
    record.append_attachments(AttachmentKind::Supporting, supporting.to_vec());
    // Resubmission always reopens review, whatever the prior status.
    record.status = VerificationStatus::Pending;
    record.requested_at_ms = Some(now_ms);
}
