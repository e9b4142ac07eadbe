//! The spec aggregate.
//!
//! A [`Spec`] owns its working requirement content, its approvers, its
//! version history, and its journal. Fields are only writable inside the
//! crate; hosts change a spec through [`crate::SpecLifecycle`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use specflow_core::{ActorRef, Priority, Timestamp};

use crate::approval::{ApprovalSummary, ApprovalTracker, Approver};
use crate::error::LifecycleError;
use crate::journal::Journal;
use crate::stage::{LockState, Stage};
use crate::story::UserStory;
use crate::version::{SpecVersion, VersionLabel, VersionStore};

/// Editorial status of a spec. Set explicitly, never derived from stage or
/// approvals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecStatus {
    #[default]
    Draft,
    Review,
    Approved,
    Implemented,
}

impl SpecStatus {
    pub const ALL: [SpecStatus; 4] = [
        SpecStatus::Draft,
        SpecStatus::Review,
        SpecStatus::Approved,
        SpecStatus::Implemented,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecStatus::Draft => "draft",
            SpecStatus::Review => "review",
            SpecStatus::Approved => "approved",
            SpecStatus::Implemented => "implemented",
        }
    }
}

impl fmt::Display for SpecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpecStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LifecycleError::UnknownStatus(s.to_string()))
    }
}

/// A specification and everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    pub(crate) id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) priority: Priority,
    #[serde(default)]
    pub(crate) stage: Stage,
    #[serde(default)]
    pub(crate) status: SpecStatus,
    #[serde(default)]
    pub(crate) lock: LockState,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) user_stories: Vec<UserStory>,
    #[serde(default)]
    pub(crate) approvers: ApprovalTracker,
    #[serde(default)]
    pub(crate) versions: VersionStore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) assignee: Option<ActorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) cycle: Option<String>,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
    #[serde(default)]
    pub(crate) journal: Journal,
}

impl Spec {
    /// A fresh draft in the requirements stage, unlocked and unversioned.
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            priority: Priority::default(),
            stage: Stage::Requirements,
            status: SpecStatus::Draft,
            lock: LockState::Unlocked,
            description: String::new(),
            user_stories: Vec::new(),
            approvers: ApprovalTracker::new(),
            versions: VersionStore::new(),
            assignee: None,
            cycle: None,
            created_at,
            updated_at: created_at,
            journal: Journal::new(),
        }
    }

    /// Builder: set priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder: set the initial description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: append a working story.
    pub fn with_story(mut self, story: UserStory) -> Self {
        self.user_stories.push(story);
        self
    }

    /// Builder: assign an approver. Duplicates are caught by [`Spec::validate`].
    pub fn with_approver(mut self, approver: Approver) -> Self {
        self.approvers.push_unchecked(approver);
        self
    }

    /// Builder: set the assignee.
    pub fn with_assignee(mut self, assignee: ActorRef) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Builder: set the planning cycle label.
    pub fn with_cycle(mut self, cycle: impl Into<String>) -> Self {
        self.cycle = Some(cycle.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn status(&self) -> SpecStatus {
        self.status
    }

    pub fn lock(&self) -> &LockState {
        &self.lock
    }

    pub fn requirements_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Present exactly when the requirements are locked.
    pub fn lock_reason(&self) -> Option<&str> {
        self.lock.reason()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn user_stories(&self) -> &[UserStory] {
        &self.user_stories
    }

    pub fn story(&self, id: &str) -> Option<&UserStory> {
        self.user_stories.iter().find(|s| s.id == id)
    }

    pub fn approvers(&self) -> &[Approver] {
        self.approvers.approvers()
    }

    pub fn approval_summary(&self) -> ApprovalSummary {
        self.approvers.summary()
    }

    pub fn versions(&self) -> &VersionStore {
        &self.versions
    }

    pub fn current_version_id(&self) -> Option<VersionLabel> {
        self.versions.current_label()
    }

    pub fn current_version(&self) -> Option<&SpecVersion> {
        self.versions.current()
    }

    pub fn assignee(&self) -> Option<&ActorRef> {
        self.assignee.as_ref()
    }

    pub fn cycle(&self) -> Option<&str> {
        self.cycle.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Whether the working description or stories differ from the current
    /// version. Always true before the first snapshot.
    pub fn has_unsnapshotted_changes(&self) -> bool {
        match self.versions.current() {
            None => true,
            Some(version) => {
                version.description() != self.description
                    || version.user_stories() != self.user_stories.as_slice()
            }
        }
    }

    pub(crate) fn story_index(&self, id: &str) -> Result<usize, LifecycleError> {
        self.user_stories
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| LifecycleError::UnknownStory(id.to_string()))
    }

    /// Check the invariants of a spec built by hand or loaded from disk.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        let mut seen = HashSet::new();
        for story in &self.user_stories {
            if !seen.insert(story.id.as_str()) {
                return Err(LifecycleError::DuplicateStory(story.id.clone()));
            }
            story.validate()?;
        }
        self.approvers.validate()?;
        self.versions.validate()?;
        self.journal.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn spec() -> Spec {
        Spec::new(
            "spec-001",
            "User Authentication System",
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
        )
        .with_priority(Priority::Urgent)
        .with_description("Auth system")
        .with_story(UserStory::new("US-001", "Registration"))
        .with_approver(Approver::new("1", ActorRef::new("u1", "John Doe")))
    }

    #[test]
    fn new_spec_defaults() {
        let s = spec();
        assert_eq!(s.stage(), Stage::Requirements);
        assert_eq!(s.status(), SpecStatus::Draft);
        assert!(!s.requirements_locked());
        assert_eq!(s.lock_reason(), None);
        assert_eq!(s.current_version_id(), None);
        assert!(s.has_unsnapshotted_changes());
        assert_eq!(s.created_at(), s.updated_at());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicates() {
        let s = spec().with_story(UserStory::new("US-001", "Again"));
        assert_eq!(s.validate(), Err(LifecycleError::DuplicateStory("US-001".into())));

        let s = spec().with_approver(Approver::new("1", ActorRef::new("u2", "Other")));
        assert_eq!(s.validate(), Err(LifecycleError::DuplicateApprover("1".into())));
    }

    #[test]
    fn status_parse() {
        assert_eq!("Review".parse::<SpecStatus>().unwrap(), SpecStatus::Review);
        assert_eq!(
            "shipped".parse::<SpecStatus>(),
            Err(LifecycleError::UnknownStatus("shipped".into()))
        );
    }

    #[test]
    fn serde_round_trip() {
        let s = spec().with_cycle("Q1 2024");
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"userStories\""));
        assert!(json.contains("\"updatedAt\""));
        let back: Spec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
