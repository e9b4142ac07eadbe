//! The lifecycle orchestrator.
//!
//! [`SpecLifecycle`] owns one [`Spec`] and is the only way to change it.
//! Each command checks everything it needs before touching the aggregate,
//! so a command either applies fully and returns the updated spec, or
//! returns an error and leaves the spec exactly as it was.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use specflow_core::{ActorRef, Clock, SystemClock};

use crate::anchor::{find_anchor, AnchorTarget, TextAnchor};
use crate::approval::{Approver, Verdict};
use crate::compare::{compare, CompareSide, VersionComparison};
use crate::error::LifecycleError;
use crate::journal::EventKind;
use crate::listing::SpecSummary;
use crate::overview::SpecOverview;
use crate::spec::{Spec, SpecStatus};
use crate::stage::{plan_stage_change, plan_unlock, LockChange, Stage};
use crate::story::{StoryPatch, UserStory};
use crate::version::{BumpKind, SnapshotDraft, SpecVersion, VersionHistory};

/// Whether snapshots are allowed while the requirements are locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotPolicy {
    /// Snapshots are always allowed.
    #[default]
    Always,
    /// Snapshots fail with [`LifecycleError::Locked`] while locked.
    RequireUnlocked,
}

impl fmt::Display for SnapshotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotPolicy::Always => write!(f, "always"),
            SnapshotPolicy::RequireUnlocked => write!(f, "require-unlocked"),
        }
    }
}

impl FromStr for SnapshotPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "always" => Ok(SnapshotPolicy::Always),
            "require-unlocked" => Ok(SnapshotPolicy::RequireUnlocked),
            other => Err(format!(
                "unknown snapshot policy '{other}' (expected always or require-unlocked)"
            )),
        }
    }
}

/// Options for [`SpecLifecycle::create_snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub bump: BumpKind,
    /// Author's note on what changed.
    pub summary: Option<String>,
}

impl SnapshotRequest {
    pub fn minor() -> Self {
        Self::default()
    }

    pub fn major() -> Self {
        Self {
            bump: BumpKind::Major,
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Command and query surface over one spec.
#[derive(Debug, Clone)]
pub struct SpecLifecycle<C: Clock = SystemClock> {
    spec: Spec,
    clock: C,
    policy: SnapshotPolicy,
    actor: Option<ActorRef>,
}

impl SpecLifecycle<SystemClock> {
    /// Wrap an existing spec using wall-clock time.
    pub fn new(spec: Spec) -> Result<Self, LifecycleError> {
        Self::with_clock(spec, SystemClock)
    }
}

impl<C: Clock> SpecLifecycle<C> {
    /// Wrap an existing spec. The spec must pass [`Spec::validate`].
    pub fn with_clock(spec: Spec, clock: C) -> Result<Self, LifecycleError> {
        spec.validate()?;
        Ok(Self {
            spec,
            clock,
            policy: SnapshotPolicy::default(),
            actor: None,
        })
    }

    /// Start a new spec and journal its creation.
    pub fn create(
        id: impl Into<String>,
        title: impl Into<String>,
        clock: C,
        actor: Option<ActorRef>,
    ) -> Self {
        let now = clock.now();
        let mut spec = Spec::new(id, title, now);
        spec.journal.record(EventKind::Created, actor.clone(), now);
        info!(spec = %spec.id, "spec created");
        Self {
            spec,
            clock,
            policy: SnapshotPolicy::default(),
            actor,
        }
    }

    /// Builder: set the snapshot policy.
    pub fn with_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder: set the actor recorded on journal events.
    pub fn with_actor(mut self, actor: ActorRef) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn into_spec(self) -> Spec {
        self.spec
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn policy(&self) -> SnapshotPolicy {
        self.policy
    }

    pub fn actor(&self) -> Option<&ActorRef> {
        self.actor.as_ref()
    }

    // ---------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------

    /// Move to `target`, locking the requirements when entering a
    /// downstream stage.
    pub fn change_stage(&mut self, target: Stage) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, from = %self.spec.stage, to = %target, "change_stage");
        let transition = plan_stage_change(self.spec.stage, &self.spec.lock, target);

        let mut events = vec![EventKind::StageChanged {
            from: transition.from,
            to: transition.to,
        }];
        match &transition.lock_change {
            Some(LockChange::Locked { reason }) => {
                info!(spec = %self.spec.id, %reason, "requirements locked");
                events.push(EventKind::Locked {
                    reason: reason.clone(),
                });
            }
            Some(LockChange::Unlocked) => events.push(EventKind::Unlocked),
            None => {}
        }
        if !transition.is_noop() {
            info!(spec = %self.spec.id, from = %transition.from, to = %transition.to, "stage changed");
        }

        self.spec.stage = transition.to;
        self.spec.lock = transition.lock;
        Ok(self.commit(events))
    }

    /// Parse a stage name and move to it.
    pub fn change_stage_named(&mut self, target: &str) -> Result<&Spec, LifecycleError> {
        let stage = Stage::parse(target).map_err(|e| self.rejected("change_stage", e))?;
        self.change_stage(stage)
    }

    /// Release the requirement lock without changing stage.
    pub fn unlock(&mut self) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, "unlock");
        plan_unlock(&self.spec.lock).map_err(|e| self.rejected("unlock", e))?;
        self.spec.lock = Default::default();
        info!(spec = %self.spec.id, "requirements unlocked");
        Ok(self.commit(vec![EventKind::Unlocked]))
    }

    /// Set the editorial status. Independent of stage and approvals.
    pub fn set_status(&mut self, status: SpecStatus) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, %status, "set_status");
        let from = self.spec.status;
        self.spec.status = status;
        Ok(self.commit(vec![EventKind::StatusChanged { from, to: status }]))
    }

    pub fn edit_description(
        &mut self,
        description: impl Into<String>,
    ) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, "edit_description");
        self.ensure_unlocked("edit_description")?;
        self.spec.description = description.into();
        Ok(self.commit(vec![EventKind::DescriptionEdited]))
    }

    /// Append a story to the working set.
    pub fn add_story(&mut self, story: UserStory) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, story = %story.id, "add_story");
        self.ensure_unlocked("add_story")?;
        if self.spec.story(&story.id).is_some() {
            return Err(self.rejected("add_story", LifecycleError::DuplicateStory(story.id)));
        }
        story.validate().map_err(|e| self.rejected("add_story", e))?;
        let id = story.id.clone();
        self.spec.user_stories.push(story);
        Ok(self.commit(vec![EventKind::StoryAdded { id }]))
    }

    /// Apply a partial update to a working story.
    pub fn update_story(&mut self, id: &str, patch: StoryPatch) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, story = id, "update_story");
        self.ensure_unlocked("update_story")?;
        let index = self
            .spec
            .story_index(id)
            .map_err(|e| self.rejected("update_story", e))?;
        let updated = patch.applied_to(&self.spec.user_stories[index]);
        updated.validate().map_err(|e| self.rejected("update_story", e))?;
        let fields = self.spec.user_stories[index].changed_fields(&updated);
        self.spec.user_stories[index] = updated;
        Ok(self.commit(vec![EventKind::StoryUpdated {
            id: id.to_string(),
            fields,
        }]))
    }

    pub fn remove_story(&mut self, id: &str) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, story = id, "remove_story");
        self.ensure_unlocked("remove_story")?;
        let index = self
            .spec
            .story_index(id)
            .map_err(|e| self.rejected("remove_story", e))?;
        self.spec.user_stories.remove(index);
        Ok(self.commit(vec![EventKind::StoryRemoved { id: id.to_string() }]))
    }

    /// Put the working stories in the given order.
    ///
    /// `ids` must be a permutation of the current story ids.
    pub fn reorder_stories<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, count = ids.len(), "reorder_stories");
        self.ensure_unlocked("reorder_stories")?;
        let order = self
            .permutation(ids)
            .map_err(|e| self.rejected("reorder_stories", e))?;
        let mut slots: Vec<Option<UserStory>> =
            std::mem::take(&mut self.spec.user_stories).into_iter().map(Some).collect();
        self.spec.user_stories = order.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(self.commit(vec![EventKind::StoriesReordered]))
    }

    /// Move one story to `to_index`, shifting the others.
    pub fn move_story(&mut self, id: &str, to_index: usize) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, story = id, to_index, "move_story");
        self.ensure_unlocked("move_story")?;
        let from = self
            .spec
            .story_index(id)
            .map_err(|e| self.rejected("move_story", e))?;
        let len = self.spec.user_stories.len();
        if to_index >= len {
            let err = LifecycleError::InvalidReorder(format!(
                "position {to_index} is out of range for {len} stories"
            ));
            return Err(self.rejected("move_story", err));
        }
        let story = self.spec.user_stories.remove(from);
        self.spec.user_stories.insert(to_index, story);
        Ok(self.commit(vec![EventKind::StoriesReordered]))
    }

    /// Snapshot the working description and stories as a new version.
    pub fn create_snapshot(
        &mut self,
        author: ActorRef,
        request: SnapshotRequest,
    ) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, bump = ?request.bump, "create_snapshot");
        if self.policy == SnapshotPolicy::RequireUnlocked {
            self.ensure_unlocked("create_snapshot")?;
        }
        self.spec
            .versions
            .next_label(request.bump)
            .map_err(|e| self.rejected("create_snapshot", e))?;
        let now = self.clock.now();
        let version = self.spec.versions.create_snapshot(SnapshotDraft {
            description: &self.spec.description,
            user_stories: &self.spec.user_stories,
            created_by: author,
            created_at: now,
            bump: request.bump,
            summary: request.summary,
        })?;
        let label = version.label();
        let changes = version.changes().len();
        info!(spec = %self.spec.id, %label, changes, "snapshot created");
        Ok(self.commit_at(now, vec![EventKind::SnapshotCreated { label, changes }]))
    }

    pub fn add_approver(&mut self, approver: Approver) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, approver = approver.id(), "add_approver");
        let id = approver.id().to_string();
        if let Err(e) = self.spec.approvers.add(approver) {
            return Err(self.rejected("add_approver", e));
        }
        Ok(self.commit(vec![EventKind::ApproverAdded { id }]))
    }

    /// Record an approver's verdict, replacing any earlier one.
    pub fn record_decision(
        &mut self,
        approver_id: &str,
        verdict: Verdict,
        comment: Option<String>,
    ) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, approver = approver_id, ?verdict, "record_decision");
        if !self.spec.approvers.contains(approver_id) {
            let err = LifecycleError::UnknownApprover(approver_id.to_string());
            return Err(self.rejected("record_decision", err));
        }
        let now = self.clock.now();
        let status = self
            .spec
            .approvers
            .record_decision(approver_id, verdict, comment, now)?
            .status();
        info!(spec = %self.spec.id, approver = approver_id, %status, "decision recorded");
        Ok(self.commit_at(
            now,
            vec![EventKind::DecisionRecorded {
                approver: approver_id.to_string(),
                status,
            }],
        ))
    }

    /// Set or clear the spec's assignee.
    pub fn set_assignee(&mut self, assignee: Option<ActorRef>) -> Result<&Spec, LifecycleError> {
        debug!(spec = %self.spec.id, "set_assignee");
        let event = EventKind::AssigneeChanged {
            assignee: assignee.as_ref().map(|a| a.id.clone()),
        };
        self.spec.assignee = assignee;
        Ok(self.commit(vec![event]))
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn overview(&self) -> SpecOverview {
        SpecOverview::from(&self.spec)
    }

    pub fn summary(&self) -> SpecSummary {
        SpecSummary::from(&self.spec)
    }

    /// Versions newest-first.
    pub fn versions(&self) -> VersionHistory<'_> {
        self.spec.versions.list()
    }

    pub fn version(&self, id: &str) -> Result<&SpecVersion, LifecycleError> {
        self.spec.versions.get(id)
    }

    /// Compare two versions by id.
    pub fn compare_versions(
        &self,
        from: &str,
        to: &str,
    ) -> Result<VersionComparison, LifecycleError> {
        let old = self.version(from)?;
        let new = self.version(to)?;
        Ok(compare(
            CompareSide::Version(old.label()),
            old.description(),
            old.user_stories(),
            CompareSide::Version(new.label()),
            new.description(),
            new.user_stories(),
        ))
    }

    /// Compare the current version with the working set.
    pub fn compare_working(&self) -> Result<VersionComparison, LifecycleError> {
        let current = self
            .spec
            .versions
            .current()
            .ok_or_else(|| LifecycleError::UnknownVersion("current".into()))?;
        Ok(compare(
            CompareSide::Version(current.label()),
            current.description(),
            current.user_stories(),
            CompareSide::Working,
            &self.spec.description,
            &self.spec.user_stories,
        ))
    }

    /// Locate a span for a comment anchor. Never changes the spec.
    pub fn anchor(
        &self,
        target: AnchorTarget<'_>,
        span: &str,
    ) -> Result<Option<TextAnchor>, LifecycleError> {
        let text = match target {
            AnchorTarget::Description => self.spec.description.as_str(),
            AnchorTarget::Story(id) => {
                let index = self.spec.story_index(id)?;
                self.spec.user_stories[index].description.as_str()
            }
        };
        Ok(find_anchor(text, span))
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn ensure_unlocked(&self, command: &'static str) -> Result<(), LifecycleError> {
        self.spec
            .lock
            .ensure_unlocked()
            .map_err(|e| self.rejected(command, e))
    }

    /// Index order for a full permutation of the working story ids.
    fn permutation<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<usize>, LifecycleError> {
        let stories = &self.spec.user_stories;
        if ids.len() != stories.len() {
            return Err(LifecycleError::InvalidReorder(format!(
                "expected {} story ids, got {}",
                stories.len(),
                ids.len()
            )));
        }
        let mut seen = HashSet::new();
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                if !seen.insert(id) {
                    return Err(LifecycleError::InvalidReorder(format!(
                        "story '{id}' listed twice"
                    )));
                }
                self.spec.story_index(id).map_err(|_| {
                    LifecycleError::InvalidReorder(format!("story '{id}' is not in the spec"))
                })
            })
            .collect()
    }

    fn rejected(&self, command: &'static str, err: LifecycleError) -> LifecycleError {
        warn!(spec = %self.spec.id, command, error = %err, "command rejected");
        err
    }

    fn commit(&mut self, events: Vec<EventKind>) -> &Spec {
        let now = self.clock.now();
        self.commit_at(now, events)
    }

    /// Stamp `updatedAt` and journal the command's events.
    fn commit_at(&mut self, now: specflow_core::Timestamp, events: Vec<EventKind>) -> &Spec {
        self.spec.updated_at = now;
        for kind in events {
            self.spec.journal.record(kind, self.actor.clone(), now);
        }
        &self.spec
    }
}
