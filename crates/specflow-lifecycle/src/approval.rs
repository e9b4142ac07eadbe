//! Approvers and their decisions.
//!
//! Approval state is tracked per approver and summarised on demand. It
//! never changes a spec's status; hosts read the summary and decide.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use specflow_core::{ActorRef, Timestamp};

use crate::error::LifecycleError;

/// Where an approver stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A decision an approver can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub fn status(&self) -> ApprovalStatus {
        match self {
            Verdict::Approve => ApprovalStatus::Approved,
            Verdict::Reject => ApprovalStatus::Rejected,
        }
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" | "approved" => Ok(Verdict::Approve),
            "reject" | "rejected" => Ok(Verdict::Reject),
            other => Err(format!("unknown verdict '{other}'")),
        }
    }
}

/// A person asked to sign off on a spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approver {
    id: String,
    actor: ActorRef,
    #[serde(default)]
    status: ApprovalStatus,
    #[serde(default, rename = "approvedAt", skip_serializing_if = "Option::is_none")]
    decided_at: Option<Timestamp>,
    #[serde(default, rename = "comments", skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl Approver {
    /// A pending approver.
    pub fn new(id: impl Into<String>, actor: ActorRef) -> Self {
        Self {
            id: id.into(),
            actor,
            status: ApprovalStatus::Pending,
            decided_at: None,
            comment: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn actor(&self) -> &ActorRef {
        &self.actor
    }

    pub fn status(&self) -> ApprovalStatus {
        self.status
    }

    /// When the latest decision was recorded.
    pub fn decided_at(&self) -> Option<Timestamp> {
        self.decided_at
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Counts of approver states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSummary {
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    pub total: usize,
}

impl fmt::Display for ApprovalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} approved", self.approved, self.total)
    }
}

/// The approver set of one spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalTracker {
    approvers: Vec<Approver>,
}

impl ApprovalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn approvers(&self) -> &[Approver] {
        &self.approvers
    }

    pub fn get(&self, id: &str) -> Option<&Approver> {
        self.approvers.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Add a pending approver. Ids must be unique.
    pub fn add(&mut self, approver: Approver) -> Result<(), LifecycleError> {
        if self.contains(&approver.id) {
            return Err(LifecycleError::DuplicateApprover(approver.id));
        }
        self.approvers.push(approver);
        Ok(())
    }

    pub(crate) fn push_unchecked(&mut self, approver: Approver) {
        self.approvers.push(approver);
    }

    /// Record a decision, replacing any earlier one from the same approver.
    ///
    /// Allowed from any status. The timestamp and comment are overwritten
    /// along with the status, so a decision without a comment clears the
    /// previous comment.
    pub fn record_decision(
        &mut self,
        approver_id: &str,
        verdict: Verdict,
        comment: Option<String>,
        at: Timestamp,
    ) -> Result<&Approver, LifecycleError> {
        let approver = self
            .approvers
            .iter_mut()
            .find(|a| a.id == approver_id)
            .ok_or_else(|| LifecycleError::UnknownApprover(approver_id.to_string()))?;
        approver.status = verdict.status();
        approver.decided_at = Some(at);
        approver.comment = comment;
        Ok(approver)
    }

    pub fn summary(&self) -> ApprovalSummary {
        let mut summary = ApprovalSummary {
            total: self.approvers.len(),
            ..ApprovalSummary::default()
        };
        for approver in &self.approvers {
            match approver.status {
                ApprovalStatus::Approved => summary.approved += 1,
                ApprovalStatus::Rejected => summary.rejected += 1,
                ApprovalStatus::Pending => summary.pending += 1,
            }
        }
        summary
    }

    /// Check that approver ids are unique.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        for (i, approver) in self.approvers.iter().enumerate() {
            if self.approvers[..i].iter().any(|a| a.id == approver.id) {
                return Err(LifecycleError::DuplicateApprover(approver.id.clone()));
            }
        }
        Ok(())
    }
}
