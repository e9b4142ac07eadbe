//! Specification lifecycle engine.
//!
//! A spec moves through three stages (requirements, technical design,
//! implementation tasks). Entering a downstream stage locks the
//! requirements until someone explicitly unlocks them. Requirement content
//! is captured in immutable, labelled versions whose differences are
//! recorded at snapshot time, and a set of approvers record their verdicts
//! independently of the spec's editorial status.
//!
//! [`SpecLifecycle`] is the single entry point for changes. It owns a
//! [`Spec`], applies commands atomically, and journals every change.

pub mod anchor;
pub mod approval;
pub mod changes;
pub mod compare;
pub mod engine;
pub mod error;
pub mod journal;
pub mod listing;
pub mod overview;
pub mod serialize;
pub mod spec;
pub mod stage;
pub mod story;
pub mod version;

pub use anchor::{find_anchor, AnchorTarget, TextAnchor};
pub use approval::{ApprovalStatus, ApprovalSummary, ApprovalTracker, Approver, Verdict};
pub use changes::derive_changes;
pub use compare::{field_value, CompareSide, FieldChange, StoryComparison, VersionComparison};
pub use engine::{SnapshotPolicy, SnapshotRequest, SpecLifecycle};
pub use error::LifecycleError;
pub use journal::{EventKind, Journal, LifecycleEvent};
pub use listing::{filter_summaries, sort_summaries, SortKey, SpecSummary};
pub use overview::SpecOverview;
pub use serialize::SpecFile;
pub use spec::{Spec, SpecStatus};
pub use stage::{lock_reason, plan_stage_change, plan_unlock, LockChange, LockState, Stage, StageTransition};
pub use story::{StoryField, StoryPatch, StoryStatus, UserStory};
pub use version::{
    BumpKind, ChangeRecord, ChangeSection, SnapshotDraft, SpecVersion, VersionHistory,
    VersionLabel, VersionStore,
};
