//! The read model shown at the top of a spec's detail view.

use serde::{Deserialize, Serialize};

use specflow_core::{ActorRef, Priority, Timestamp};

use crate::approval::ApprovalSummary;
use crate::spec::{Spec, SpecStatus};
use crate::stage::{LockState, Stage};
use crate::version::VersionLabel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecOverview {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub stage: Stage,
    pub lock: LockState,
    pub status: SpecStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<VersionLabel>,
    pub version_count: usize,
    pub story_count: usize,
    pub approvals: ApprovalSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<ActorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
    pub updated_at: Timestamp,
    /// Working content differs from the current version.
    pub has_unsnapshotted_changes: bool,
}

impl From<&Spec> for SpecOverview {
    fn from(spec: &Spec) -> Self {
        SpecOverview {
            id: spec.id().to_string(),
            title: spec.title().to_string(),
            priority: spec.priority(),
            stage: spec.stage(),
            lock: spec.lock().clone(),
            status: spec.status(),
            current_version: spec.current_version_id(),
            version_count: spec.versions().len(),
            story_count: spec.user_stories().len(),
            approvals: spec.approval_summary(),
            assignee: spec.assignee().cloned(),
            cycle: spec.cycle().map(str::to_string),
            updated_at: spec.updated_at(),
            has_unsnapshotted_changes: spec.has_unsnapshotted_changes(),
        }
    }
}
