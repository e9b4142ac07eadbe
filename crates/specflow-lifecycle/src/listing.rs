//! Summaries for spec listings: search and sort.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use specflow_core::{Priority, Timestamp};

use crate::approval::ApprovalSummary;
use crate::spec::{Spec, SpecStatus};
use crate::stage::Stage;
use crate::version::VersionLabel;

/// One row of a spec listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecSummary {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub status: SpecStatus,
    pub stage: Stage,
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<VersionLabel>,
    pub updated_at: Timestamp,
    pub approval_summary: ApprovalSummary,
}

impl From<&Spec> for SpecSummary {
    fn from(spec: &Spec) -> Self {
        SpecSummary {
            id: spec.id().to_string(),
            title: spec.title().to_string(),
            priority: spec.priority(),
            status: spec.status(),
            stage: spec.stage(),
            locked: spec.requirements_locked(),
            current_version: spec.current_version_id(),
            updated_at: spec.updated_at(),
            approval_summary: spec.approval_summary(),
        }
    }
}

impl SpecSummary {
    /// Case-insensitive substring match on id or title. An empty query
    /// matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.id.to_lowercase().contains(&query)
            || self.title.to_lowercase().contains(&query)
    }
}

/// Summaries matching `query`, in their original order.
pub fn filter_summaries<'a>(summaries: &'a [SpecSummary], query: &str) -> Vec<&'a SpecSummary> {
    summaries.iter().filter(|s| s.matches(query)).collect()
}

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Most urgent first.
    #[default]
    Priority,
    /// Most recently updated first.
    UpdatedAt,
    Title,
    Id,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "priority" => Ok(SortKey::Priority),
            "updated" | "updated-at" => Ok(SortKey::UpdatedAt),
            "title" => Ok(SortKey::Title),
            "id" => Ok(SortKey::Id),
            other => Err(format!(
                "unknown sort key '{other}' (expected priority, updated, title, or id)"
            )),
        }
    }
}

/// Sort in place. Ties fall back to id so the order is total.
pub fn sort_summaries(summaries: &mut [SpecSummary], key: SortKey) {
    summaries.sort_by(|a, b| compare_by(a, b, key).then_with(|| a.id.cmp(&b.id)));
}

fn compare_by(a: &SpecSummary, b: &SpecSummary, key: SortKey) -> Ordering {
    match key {
        SortKey::Priority => b.priority.cmp(&a.priority),
        SortKey::UpdatedAt => b.updated_at.cmp(&a.updated_at),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Id => Ordering::Equal,
    }
}
