//! End-to-end lifecycle walkthroughs.

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use specflow_core::{ActorRef, ManualClock, Priority};
use specflow_diff::ChangeKind;
use specflow_lifecycle::{
    ApprovalStatus, Approver, ChangeSection, EventKind, LifecycleError, SnapshotRequest,
    SpecFile, SpecLifecycle, SpecStatus, Stage, StoryPatch, StoryStatus, UserStory, Verdict,
};

fn clock() -> ManualClock {
    ManualClock::starting_at(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap())
        .with_tick(Duration::seconds(30))
}

fn alice() -> ActorRef {
    ActorRef::new("u1", "Alice Johnson")
}

fn auth_spec() -> SpecLifecycle<ManualClock> {
    let mut engine =
        SpecLifecycle::create("spec-001", "User Authentication System", clock(), Some(alice()));
    engine
        .edit_description("Comprehensive authentication system with secure login.")
        .unwrap();
    engine
        .add_story(
            UserStory::new("US-001", "User Registration with Email Verification")
                .with_description("As a new user, I want to register with my email.")
                .with_priority(Priority::Urgent)
                .with_estimate(8.0),
        )
        .unwrap();
    engine
        .add_story(
            UserStory::new("US-002", "Secure User Login")
                .with_description("As a registered user, I want to log in.")
                .with_priority(Priority::Urgent)
                .with_estimate(5.0),
        )
        .unwrap();
    engine
}

#[test]
fn moving_to_technical_design_locks_requirements() {
    let mut engine = auth_spec();
    assert_eq!(engine.spec().stage(), Stage::Requirements);
    assert!(!engine.spec().requirements_locked());

    let spec = engine.change_stage(Stage::TechnicalDesign).unwrap();
    assert_eq!(spec.stage(), Stage::TechnicalDesign);
    assert!(spec.requirements_locked());
    assert!(!spec.lock_reason().unwrap_or_default().is_empty());

    let before = engine.spec().clone();
    match engine.edit_description("x") {
        Err(LifecycleError::Locked { reason }) => {
            assert_eq!(
                reason,
                "Requirements locked because spec moved to technical design stage"
            );
        }
        other => panic!("expected Locked, got {other:?}"),
    }
    assert_eq!(engine.spec(), &before);
}

#[test]
fn snapshot_records_story_set_changes() {
    let mut engine = auth_spec();
    engine.create_snapshot(alice(), SnapshotRequest::minor()).unwrap();
    engine
        .update_story(
            "US-002",
            StoryPatch {
                status: Some(StoryStatus::InProgress),
                ..StoryPatch::default()
            },
        )
        .unwrap();
    engine.create_snapshot(alice(), SnapshotRequest::minor()).unwrap();
    assert_eq!(engine.spec().current_version_id().unwrap().to_string(), "v1.1");
    let ids: Vec<_> = engine
        .version("v1.1")
        .unwrap()
        .user_stories()
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(ids, vec!["US-001", "US-002"]);

    engine
        .update_story(
            "US-001",
            StoryPatch {
                description: Some("As a new user, I want to register and verify my email.".into()),
                ..StoryPatch::default()
            },
        )
        .unwrap();
    engine.remove_story("US-002").unwrap();
    engine
        .add_story(UserStory::new("US-003", "Multi-Factor Authentication Setup"))
        .unwrap();

    let spec = engine.create_snapshot(alice(), SnapshotRequest::minor()).unwrap();
    let version = spec.current_version().unwrap();
    assert_eq!(version.id(), "v1.2");

    let records: Vec<(ChangeKind, ChangeSection, Option<&str>)> = version
        .changes()
        .iter()
        .map(|c| (c.kind, c.section, c.story_id.as_deref()))
        .collect();
    assert_eq!(
        records,
        vec![
            (ChangeKind::Modified, ChangeSection::UserStory, Some("US-001")),
            (ChangeKind::Added, ChangeSection::UserStory, Some("US-003")),
            (ChangeKind::Removed, ChangeSection::UserStory, Some("US-002")),
        ]
    );
    assert_eq!(version.changes()[0].detail, "Changed description");
}

#[test]
fn full_review_cycle() {
    let mut engine = auth_spec();
    for (id, name) in [("1", "John Doe"), ("2", "Sarah Wilson"), ("3", "Mike Davis")] {
        engine
            .add_approver(Approver::new(id, ActorRef::new(format!("u-{id}"), name)))
            .unwrap();
    }
    engine.set_status(SpecStatus::Review).unwrap();
    engine.create_snapshot(alice(), SnapshotRequest::minor()).unwrap();

    engine.record_decision("1", Verdict::Approve, None).unwrap();
    engine
        .record_decision(
            "3",
            Verdict::Reject,
            Some("Need more details on security requirements".into()),
        )
        .unwrap();
    let summary = engine.overview().approvals;
    assert_eq!((summary.approved, summary.rejected, summary.pending, summary.total), (1, 1, 1, 3));
    assert_eq!(engine.spec().status(), SpecStatus::Review);

    engine.change_stage(Stage::TechnicalDesign).unwrap();
    engine.change_stage(Stage::ImplementationTasks).unwrap();
    engine.change_stage(Stage::Requirements).unwrap();
    assert!(engine.spec().requirements_locked(), "returning to requirements keeps the lock");
    assert_eq!(
        engine.spec().lock_reason(),
        Some("Requirements locked because spec moved to implementation tasks stage")
    );

    engine.unlock().unwrap();
    engine.edit_description("Revised after review.").unwrap();
    engine.record_decision("3", Verdict::Approve, None).unwrap();
    let rejected_then_approved = &engine.spec().approvers()[2];
    assert_eq!(rejected_then_approved.status(), ApprovalStatus::Approved);
    assert_eq!(rejected_then_approved.comment(), None);

    let journal = engine.spec().journal();
    assert!(journal.validate().is_ok());
    let locks = journal
        .filter(|k| matches!(k, EventKind::Locked { .. }))
        .count();
    assert_eq!(locks, 2);

    let bytes = SpecFile::new(engine.spec().clone()).to_bytes().unwrap();
    let restored = SpecFile::from_bytes(&bytes).unwrap().into_spec();
    assert_eq!(&restored, engine.spec());
    let reopened = SpecLifecycle::with_clock(restored, clock()).unwrap();
    assert_eq!(reopened.overview(), engine.overview());
}
