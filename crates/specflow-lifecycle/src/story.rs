//! User stories: the working requirement items of a spec.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use specflow_core::{ActorRef, Priority};
use specflow_diff::Keyed;

use crate::error::LifecycleError;

/// Progress of a single user story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoryStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl StoryStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Todo => "todo",
            StoryStatus::InProgress => "in-progress",
            StoryStatus::Done => "done",
        }
    }

    /// Human label.
    pub fn label(&self) -> &'static str {
        match self {
            StoryStatus::Todo => "To Do",
            StoryStatus::InProgress => "In Progress",
            StoryStatus::Done => "Done",
        }
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "todo" | "to-do" => Ok(StoryStatus::Todo),
            "in-progress" => Ok(StoryStatus::InProgress),
            "done" => Ok(StoryStatus::Done),
            _ => Err(LifecycleError::UnknownStoryStatus(s.to_string())),
        }
    }
}

/// A user story in the working set or in a version snapshot.
///
/// The `id` is stable across versions; diffs match stories by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: StoryStatus,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<ActorRef>,
    /// Effort in story points.
    #[serde(default, rename = "estimatedPoints")]
    pub estimate: f64,
}

impl UserStory {
    /// Create a story with an id and title; everything else defaulted.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            status: StoryStatus::default(),
            acceptance_criteria: Vec::new(),
            assignee: None,
            estimate: 0.0,
        }
    }

    /// Builder: set description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder: set status.
    pub fn with_status(mut self, status: StoryStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder: append an acceptance criterion.
    pub fn with_criterion(mut self, criterion: impl Into<String>) -> Self {
        self.acceptance_criteria.push(criterion.into());
        self
    }

    /// Builder: set assignee.
    pub fn with_assignee(mut self, assignee: ActorRef) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Builder: set the estimate in story points.
    pub fn with_estimate(mut self, points: f64) -> Self {
        self.estimate = points;
        self
    }

    /// Reject negative or non-finite estimates.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        if self.estimate.is_finite() && self.estimate >= 0.0 {
            Ok(())
        } else {
            Err(LifecycleError::InvalidEstimate {
                id: self.id.clone(),
                value: self.estimate,
            })
        }
    }

    /// Fields that differ between two revisions of the same story.
    pub fn changed_fields(&self, other: &UserStory) -> Vec<StoryField> {
        StoryField::ALL
            .into_iter()
            .filter(|field| !field.equal_in(self, other))
            .collect()
    }
}

impl Keyed for UserStory {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }
}

/// A comparable field of a user story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoryField {
    Title,
    Description,
    Priority,
    Status,
    AcceptanceCriteria,
    Assignee,
    Estimate,
}

impl StoryField {
    pub const ALL: [StoryField; 7] = [
        StoryField::Title,
        StoryField::Description,
        StoryField::Priority,
        StoryField::Status,
        StoryField::AcceptanceCriteria,
        StoryField::Assignee,
        StoryField::Estimate,
    ];

    /// Human label.
    pub fn label(&self) -> &'static str {
        match self {
            StoryField::Title => "title",
            StoryField::Description => "description",
            StoryField::Priority => "priority",
            StoryField::Status => "status",
            StoryField::AcceptanceCriteria => "acceptance criteria",
            StoryField::Assignee => "assignee",
            StoryField::Estimate => "estimate",
        }
    }

    fn equal_in(&self, a: &UserStory, b: &UserStory) -> bool {
        match self {
            StoryField::Title => a.title == b.title,
            StoryField::Description => a.description == b.description,
            StoryField::Priority => a.priority == b.priority,
            StoryField::Status => a.status == b.status,
            StoryField::AcceptanceCriteria => a.acceptance_criteria == b.acceptance_criteria,
            StoryField::Assignee => a.assignee == b.assignee,
            StoryField::Estimate => a.estimate == b.estimate,
        }
    }
}

impl fmt::Display for StoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A partial update to a working story. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<StoryStatus>,
    pub acceptance_criteria: Option<Vec<String>>,
    /// `Some(None)` clears the assignee.
    pub assignee: Option<Option<ActorRef>>,
    pub estimate: Option<f64>,
}

impl StoryPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == StoryPatch::default()
    }

    /// The story with this patch applied. The input is left untouched.
    pub fn applied_to(&self, story: &UserStory) -> UserStory {
        let mut next = story.clone();
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(criteria) = &self.acceptance_criteria {
            next.acceptance_criteria = criteria.clone();
        }
        if let Some(assignee) = &self.assignee {
            next.assignee = assignee.clone();
        }
        if let Some(estimate) = self.estimate {
            next.estimate = estimate;
        }
        next
    }
}
