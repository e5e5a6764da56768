//! End-to-end flows through the status registry

use assert_matches::assert_matches;
use attest_core::{
    AttachmentKind, AttachmentRef, AttestError, ContactInfo, Decision, GeoContext, Identity,
    ManualClock, VerificationStatus,
};
use attest_registry::testing::{
    MemoryAttachmentStore, NoEnrichment, RecordingSink, StaticEnrichment,
};
use attest_registry::{AttachmentStore, RegistryConfig, StatusRegistry};
use attest_store::RegistryStore;
use std::sync::Arc;
use std::time::Duration;

fn attachment(id: &str) -> AttachmentRef {
    AttachmentRef {
        remote_id: id.to_string(),
        locator_url: format!("https://img.example/{id}"),
        uploaded_at_ms: 5_000,
    }
}

fn contact() -> ContactInfo {
    ContactInfo {
        device: Some("laptop".into()),
        os: Some("linux".into()),
        email: Some("person@example.com".into()),
        phone: None,
    }
}

fn registry_with(
    store: RegistryStore,
    clock: Arc<ManualClock>,
    sink: RecordingSink,
) -> StatusRegistry {
    StatusRegistry::new(
        store,
        clock,
        Arc::new(NoEnrichment),
        Arc::new(sink),
        RegistryConfig::default(),
    )
}

async fn wait_for_notifications(sink: &RecordingSink, at_least: usize) -> usize {
    for _ in 0..100 {
        let attempted = sink.attempted().await.len();
        if attempted >= at_least {
            return attempted;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    sink.attempted().await.len()
}

#[tokio::test]
async fn first_contact_creates_then_counts_lookups() {
    let clock = Arc::new(ManualClock::at(1_000));
    let registry = registry_with(RegistryStore::new(), clock.clone(), RecordingSink::new());
    let identity = Identity::from("203.0.113.7");

    let (record, is_new) = registry.lookup_or_create(identity.clone()).await.unwrap();
    assert!(is_new);
    assert_eq!(record.status, VerificationStatus::Unverified);
    assert_eq!(record.access_count, 1);
    assert_eq!(record.last_accessed_ms, 1_000);

    clock.advance(250);
    let (record, is_new) = registry.lookup_or_create(identity).await.unwrap();
    assert!(!is_new);
    assert_eq!(record.access_count, 2);
    assert_eq!(record.last_accessed_ms, 1_250);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_contact_creates_exactly_one_record() {
    let clock = Arc::new(ManualClock::at(1_000));
    let registry = Arc::new(StatusRegistry::new(
        RegistryStore::new(),
        clock,
        Arc::new(NoEnrichment),
        Arc::new(RecordingSink::new()),
        RegistryConfig {
            // Generous budget so CAS contention between racers cannot
            // exhaust it and fail the test spuriously.
            max_commit_attempts: 64,
            ..RegistryConfig::default()
        },
    ));
    let identity = Identity::from("198.51.100.42");

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let identity = identity.clone();
            tokio::spawn(async move { registry.lookup_or_create(identity).await })
        })
        .collect();

    let mut creations = 0;
    for task in tasks {
        let (_, is_new) = task.await.unwrap().unwrap();
        if is_new {
            creations += 1;
        }
    }
    assert_eq!(creations, 1, "exactly one racer may create the record");

    let (record, is_new) = registry.lookup_or_create(identity).await.unwrap();
    assert!(!is_new);
    assert_eq!(record.access_count, 17);
}

#[tokio::test]
async fn enrichment_is_captured_on_create_when_available() {
    let geo = GeoContext {
        city: Some("Reykjavik".into()),
        region: None,
        country: Some("Iceland".into()),
        lat: Some(64.14),
        lon: Some(-21.94),
        isp_name: Some("Example ISP".into()),
    };
    let registry = StatusRegistry::new(
        RegistryStore::new(),
        Arc::new(ManualClock::at(1_000)),
        Arc::new(StaticEnrichment(geo.clone())),
        Arc::new(RecordingSink::new()),
        RegistryConfig::default(),
    );

    let (record, is_new) = registry
        .lookup_or_create(Identity::from("203.0.113.8"))
        .await
        .unwrap();
    assert!(is_new);
    assert_eq!(record.geo, Some(geo));
}

#[tokio::test]
async fn submit_requires_a_primary_attachment() {
    let registry = registry_with(
        RegistryStore::new(),
        Arc::new(ManualClock::at(1_000)),
        RecordingSink::new(),
    );
    let identity = Identity::from("203.0.113.7");
    registry.lookup_or_create(identity.clone()).await.unwrap();

    let err = registry
        .submit(identity.clone(), contact(), vec![], vec![attachment("s1")])
        .await
        .unwrap_err();
    assert_matches!(err, AttestError::Validation { .. });

    // The record is unchanged by the rejected submission.
    let (record, _) = registry.lookup_or_create(identity).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Unverified);
    assert!(record.primary_attachments.is_empty());
    assert!(record.supporting_attachments.is_empty());
    assert!(record.contact.is_none());
}

#[tokio::test]
async fn submit_moves_any_status_to_pending_and_appends_attachments() {
    let clock = Arc::new(ManualClock::at(1_000));
    let registry = registry_with(RegistryStore::new(), clock.clone(), RecordingSink::new());
    let identity = Identity::from("203.0.113.7");

    // First submission on a never-seen identity.
    let record = registry
        .submit(
            identity.clone(),
            contact(),
            vec![attachment("p1")],
            vec![attachment("s1")],
        )
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);
    assert_eq!(record.requested_at_ms, Some(1_000));

    // Approve, then resubmit: review reopens and attachments accumulate.
    registry
        .decide(identity.clone(), Decision::Approved, None)
        .await
        .unwrap();
    clock.advance(500);
    let record = registry
        .submit(identity, contact(), vec![attachment("p2")], vec![])
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);
    assert_eq!(record.requested_at_ms, Some(1_500));
    let primaries: Vec<_> = record
        .primary_attachments
        .iter()
        .map(|a| a.remote_id.as_str())
        .collect();
    assert_eq!(primaries, vec!["p1", "p2"]);
    assert_eq!(record.supporting_attachments.len(), 1);
}

#[tokio::test]
async fn submit_dispatches_reviewer_notification() {
    let sink = RecordingSink::new();
    let registry = registry_with(
        RegistryStore::new(),
        Arc::new(ManualClock::at(1_000)),
        sink.clone(),
    );

    registry
        .submit(
            Identity::from("203.0.113.7"),
            contact(),
            vec![attachment("p1")],
            vec![attachment("s1")],
        )
        .await
        .unwrap();

    assert_eq!(wait_for_notifications(&sink, 1).await, 1);
    let delivered = sink.attempted().await;
    assert_eq!(delivered[0].identity, Identity::from("203.0.113.7"));
    assert_eq!(delivered[0].attachments.len(), 2);
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_submission() {
    let sink = RecordingSink::failing();
    let registry = registry_with(
        RegistryStore::new(),
        Arc::new(ManualClock::at(1_000)),
        sink.clone(),
    );

    let record = registry
        .submit(
            Identity::from("203.0.113.7"),
            contact(),
            vec![attachment("p1")],
            vec![],
        )
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);

    // The delivery was attempted and failed; the submission stood.
    assert_eq!(wait_for_notifications(&sink, 1).await, 1);
}

#[tokio::test]
async fn decide_applies_only_to_pending_records() {
    let registry = registry_with(
        RegistryStore::new(),
        Arc::new(ManualClock::at(1_000)),
        RecordingSink::new(),
    );
    let identity = Identity::from("203.0.113.7");

    assert_matches!(
        registry
            .decide(Identity::from("192.0.2.99"), Decision::Approved, None)
            .await,
        Err(AttestError::NotFound { .. })
    );

    registry.lookup_or_create(identity.clone()).await.unwrap();
    assert_matches!(
        registry
            .decide(identity.clone(), Decision::Approved, None)
            .await,
        Err(AttestError::InvalidTransition { .. })
    );

    registry
        .submit(identity.clone(), contact(), vec![attachment("p1")], vec![])
        .await
        .unwrap();
    let record = registry
        .decide(identity.clone(), Decision::Approved, Some("evidence ok".into()))
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Approved);
    assert!(record.is_verified());
    assert_eq!(record.review_notes.as_deref(), Some("evidence ok"));

    // Already decided: a second decision needs a fresh submission.
    assert_matches!(
        registry.decide(identity, Decision::Rejected, None).await,
        Err(AttestError::InvalidTransition { .. })
    );
}

#[tokio::test]
async fn rejected_then_resubmitted_record_can_be_decided_again() {
    let registry = registry_with(
        RegistryStore::new(),
        Arc::new(ManualClock::at(1_000)),
        RecordingSink::new(),
    );
    let identity = Identity::from("203.0.113.7");

    registry
        .submit(identity.clone(), contact(), vec![attachment("p1")], vec![])
        .await
        .unwrap();
    let record = registry
        .decide(identity.clone(), Decision::Rejected, None)
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Rejected);
    assert!(!record.is_verified());

    registry
        .submit(identity.clone(), contact(), vec![attachment("p2")], vec![])
        .await
        .unwrap();
    let record = registry
        .decide(identity, Decision::Approved, None)
        .await
        .unwrap();
    assert!(record.is_verified());
}

#[tokio::test]
async fn stored_blob_reference_flows_through_submit_and_removal() {
    let blobs = MemoryAttachmentStore::new();
    let registry = registry_with(
        RegistryStore::new(),
        Arc::new(ManualClock::at(1_000)),
        RecordingSink::new(),
    );
    let identity = Identity::from("203.0.113.7");

    // The caller uploads the binary first and submits only the reference.
    let stored = blobs.store(vec![0xFF, 0xD8, 0xFF]).await.unwrap();
    let reference = AttachmentRef {
        remote_id: stored.remote_id.clone(),
        locator_url: stored.locator_url,
        uploaded_at_ms: 1_000,
    };
    registry
        .submit(identity.clone(), contact(), vec![reference], vec![])
        .await
        .unwrap();

    // Removal deletes the reference here and the payload at the store.
    registry
        .remove_attachment(identity.clone(), &stored.remote_id, AttachmentKind::Primary)
        .await
        .unwrap();
    blobs.delete(&stored.remote_id).await.unwrap();
    assert!(!blobs.contains(&stored.remote_id).await);

    let (record, _) = registry.lookup_or_create(identity).await.unwrap();
    assert!(record.primary_attachments.is_empty());
}

#[tokio::test]
async fn remove_attachment_by_unknown_id_is_not_found() {
    let registry = registry_with(
        RegistryStore::new(),
        Arc::new(ManualClock::at(1_000)),
        RecordingSink::new(),
    );
    let identity = Identity::from("203.0.113.7");
    registry
        .submit(
            identity.clone(),
            contact(),
            vec![attachment("p1")],
            vec![attachment("s1")],
        )
        .await
        .unwrap();

    assert_matches!(
        registry
            .remove_attachment(identity.clone(), "missing", AttachmentKind::Primary)
            .await,
        Err(AttestError::NotFound { .. })
    );

    // Both sequences are untouched by the failed removal.
    let (record, _) = registry.lookup_or_create(identity.clone()).await.unwrap();
    assert_eq!(record.primary_attachments.len(), 1);
    assert_eq!(record.supporting_attachments.len(), 1);

    registry
        .remove_attachment(identity.clone(), "s1", AttachmentKind::Supporting)
        .await
        .unwrap();
    let (record, _) = registry.lookup_or_create(identity).await.unwrap();
    assert_eq!(record.primary_attachments.len(), 1);
    assert!(record.supporting_attachments.is_empty());
}
