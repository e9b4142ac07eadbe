//! Version labels, immutable snapshots, and the append-only version store.
//!
//! Versions are stored in creation order and handed out newest-first. A
//! snapshot owns deep copies of the description and stories it captured, so
//! later edits to the working set never reach back into history.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use specflow_core::{ActorRef, Timestamp};
use specflow_diff::ChangeKind;

use crate::changes::derive_changes;
use crate::error::LifecycleError;
use crate::story::UserStory;

/// A `vMAJOR.MINOR` version label. Also serves as the version id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionLabel {
    pub major: u32,
    pub minor: u32,
}

impl VersionLabel {
    /// Label of the first snapshot.
    pub const INITIAL: VersionLabel = VersionLabel { major: 1, minor: 0 };

    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The label following this one. Fails once the bumped component
    /// would leave `u32`.
    pub fn bump(&self, kind: BumpKind) -> Result<Self, LifecycleError> {
        let next = match kind {
            BumpKind::Minor => self
                .minor
                .checked_add(1)
                .map(|minor| VersionLabel::new(self.major, minor)),
            BumpKind::Major => self
                .major
                .checked_add(1)
                .map(|major| VersionLabel::new(major, 0)),
        };
        next.ok_or_else(|| LifecycleError::LabelExhausted(self.to_string()))
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

impl FromStr for VersionLabel {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LifecycleError::InvalidLabel(s.to_string());
        let body = s.trim().strip_prefix('v').ok_or_else(invalid)?;
        let (major, minor) = body.split_once('.').ok_or_else(invalid)?;
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(major) || !digits(minor) {
            return Err(invalid());
        }
        Ok(VersionLabel {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for VersionLabel {
    type Error = LifecycleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VersionLabel> for String {
    fn from(label: VersionLabel) -> String {
        label.to_string()
    }
}

/// Which component of the label a new snapshot increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    /// `v1.1 -> v1.2`
    #[default]
    Minor,
    /// `v1.2 -> v2.0`, for re-baselining from a clean slate.
    Major,
}

/// Label for the next snapshot given the current one, if any.
pub fn next_label(
    current: Option<VersionLabel>,
    kind: BumpKind,
) -> Result<VersionLabel, LifecycleError> {
    match current {
        None => Ok(VersionLabel::INITIAL),
        Some(label) => label.bump(kind),
    }
}

/// Part of the spec a change record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeSection {
    Description,
    UserStory,
}

impl fmt::Display for ChangeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeSection::Description => write!(f, "description"),
            ChangeSection::UserStory => write!(f, "user-story"),
        }
    }
}

/// One described difference between a version and its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub section: ChangeSection,
    pub title: String,
    pub detail: String,
    /// The story concerned, for user-story records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
}

/// An immutable snapshot of a spec's requirement content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecVersion {
    #[serde(rename = "id")]
    label: VersionLabel,
    description: String,
    user_stories: Vec<UserStory>,
    created_at: Timestamp,
    created_by: ActorRef,
    changes: Vec<ChangeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

impl SpecVersion {
    pub fn label(&self) -> VersionLabel {
        self.label
    }

    /// The version id, identical to its label.
    pub fn id(&self) -> String {
        self.label.to_string()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn user_stories(&self) -> &[UserStory] {
        &self.user_stories
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn created_by(&self) -> &ActorRef {
        &self.created_by
    }

    /// Differences from the version that was current before this one.
    pub fn changes(&self) -> &[ChangeRecord] {
        &self.changes
    }

    /// Free-text note supplied by the author.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

/// Input for a new snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotDraft<'a> {
    pub description: &'a str,
    pub user_stories: &'a [UserStory],
    pub created_by: ActorRef,
    pub created_at: Timestamp,
    pub bump: BumpKind,
    pub summary: Option<String>,
}

/// Append-only log of a spec's versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionStore {
    versions: Vec<SpecVersion>,
    current: Option<VersionLabel>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Label of the current version, once a snapshot exists.
    pub fn current_label(&self) -> Option<VersionLabel> {
        self.current
    }

    /// The current version, once a snapshot exists.
    pub fn current(&self) -> Option<&SpecVersion> {
        self.current.and_then(|label| self.by_label(label))
    }

    /// Look a version up by label.
    pub fn by_label(&self, label: VersionLabel) -> Option<&SpecVersion> {
        self.versions.iter().find(|v| v.label == label)
    }

    /// Look a version up by id, failing with [`LifecycleError::UnknownVersion`].
    pub fn get(&self, id: &str) -> Result<&SpecVersion, LifecycleError> {
        id.parse::<VersionLabel>()
            .ok()
            .and_then(|label| self.by_label(label))
            .ok_or_else(|| LifecycleError::UnknownVersion(id.to_string()))
    }

    /// Versions newest-first.
    ///
    /// The returned iterator borrows the store; call again or clone it to
    /// walk the history any number of times.
    pub fn list(&self) -> VersionHistory<'_> {
        VersionHistory {
            inner: self.versions.iter().rev(),
        }
    }

    /// Label the next snapshot would receive.
    pub fn next_label(&self, kind: BumpKind) -> Result<VersionLabel, LifecycleError> {
        next_label(self.latest_label(), kind)
    }

    fn latest_label(&self) -> Option<VersionLabel> {
        self.versions.last().map(|v| v.label)
    }

    /// Capture a snapshot, append it, and make it current.
    ///
    /// Change records are computed against the current version before the
    /// append. Stories are deep-copied. Nothing is appended when the label
    /// cannot be bumped.
    pub fn create_snapshot(
        &mut self,
        draft: SnapshotDraft<'_>,
    ) -> Result<&SpecVersion, LifecycleError> {
        let label = self.next_label(draft.bump)?;
        let changes = derive_changes(self.current(), draft.description, draft.user_stories);
        self.versions.push(SpecVersion {
            label,
            description: draft.description.to_string(),
            user_stories: draft.user_stories.to_vec(),
            created_at: draft.created_at,
            created_by: draft.created_by,
            changes,
            summary: draft.summary,
        });
        self.current = Some(label);
        Ok(&self.versions[self.versions.len() - 1])
    }

    /// Check the invariants a loaded history must satisfy.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        for pair in self.versions.windows(2) {
            if pair[0].label >= pair[1].label {
                return Err(LifecycleError::CorruptHistory(format!(
                    "version {} is not newer than {}",
                    pair[1].label, pair[0].label
                )));
            }
        }
        match (self.current, self.versions.is_empty()) {
            (None, true) => Ok(()),
            (None, false) => Err(LifecycleError::CorruptHistory(
                "history has versions but no current version".into(),
            )),
            (Some(label), _) if self.by_label(label).is_none() => Err(
                LifecycleError::CorruptHistory(format!("current version {label} is not in history")),
            ),
            (Some(_), _) => Ok(()),
        }
    }
}

/// Newest-first view over a [`VersionStore`].
#[derive(Debug, Clone)]
pub struct VersionHistory<'a> {
    inner: std::iter::Rev<std::slice::Iter<'a, SpecVersion>>,
}

impl<'a> Iterator for VersionHistory<'a> {
    type Item = &'a SpecVersion;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for VersionHistory<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for VersionHistory<'_> {}

impl<'a> IntoIterator for &'a VersionStore {
    type Item = &'a SpecVersion;
    type IntoIter = VersionHistory<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.list()
    }
}
