//! Side-by-side comparison of two versions, or of a version and the
//! working set.

use std::fmt;

use serde::{Deserialize, Serialize};

use specflow_diff::{diff_keyed, diff_words, ChangeKind, DiffStats, EditScript, KeyedChange};

use crate::story::{StoryField, UserStory};
use crate::version::VersionLabel;

/// One side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "side", content = "label", rename_all = "lowercase")]
pub enum CompareSide {
    Version(VersionLabel),
    /// The unsnapshotted working description and stories.
    Working,
}

impl fmt::Display for CompareSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareSide::Version(label) => write!(f, "{label}"),
            CompareSide::Working => write!(f, "working"),
        }
    }
}

/// Old and new rendering of one changed story field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: StoryField,
    pub old: String,
    pub new: String,
}

/// How one story differs between the two sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryComparison {
    pub id: String,
    pub kind: ChangeKind,
    /// Title on the newer side, or the old title for removals.
    pub title: String,
    /// Changed fields, for modified stories.
    pub fields: Vec<FieldChange>,
    /// Word diff of the story description, when it changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<EditScript>,
}

/// Full comparison between two snapshots of requirement content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionComparison {
    pub from: CompareSide,
    pub to: CompareSide,
    pub description: EditScript,
    pub stories: Vec<StoryComparison>,
}

impl VersionComparison {
    /// True when neither the description nor any story differs.
    pub fn is_unchanged(&self) -> bool {
        self.description.is_unchanged() && self.stories.is_empty()
    }

    /// Word-level stats for the description.
    pub fn description_stats(&self) -> DiffStats {
        self.description.stats()
    }

    /// Number of story changes of the given kind.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.stories.iter().filter(|s| s.kind == kind).count()
    }
}

/// Compare two sets of requirement content.
pub fn compare(
    from: CompareSide,
    old_description: &str,
    old_stories: &[UserStory],
    to: CompareSide,
    new_description: &str,
    new_stories: &[UserStory],
) -> VersionComparison {
    let stories = diff_keyed(old_stories, new_stories)
        .into_iter()
        .map(compare_story)
        .collect();
    VersionComparison {
        from,
        to,
        description: diff_words(old_description, new_description),
        stories,
    }
}

fn compare_story(change: KeyedChange<'_, UserStory>) -> StoryComparison {
    let (fields, description) = match change {
        KeyedChange::Modified { old, new } => {
            let changed = old.changed_fields(new);
            let description = changed
                .contains(&StoryField::Description)
                .then(|| diff_words(&old.description, &new.description));
            let fields = changed
                .into_iter()
                .map(|field| FieldChange {
                    field,
                    old: field_value(old, field),
                    new: field_value(new, field),
                })
                .collect();
            (fields, description)
        }
        KeyedChange::Added(_) | KeyedChange::Removed(_) => (Vec::new(), None),
    };
    StoryComparison {
        id: change.key().clone(),
        kind: change.kind(),
        title: change.item().title.clone(),
        fields,
        description,
    }
}

/// Display form of one field of a story.
pub fn field_value(story: &UserStory, field: StoryField) -> String {
    match field {
        StoryField::Title => story.title.clone(),
        StoryField::Description => story.description.clone(),
        StoryField::Priority => story.priority.to_string(),
        StoryField::Status => story.status.to_string(),
        StoryField::AcceptanceCriteria => story.acceptance_criteria.join("\n"),
        StoryField::Assignee => story
            .assignee
            .as_ref()
            .map(|a| a.display_name.clone())
            .unwrap_or_default(),
        StoryField::Estimate => story.estimate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::StoryStatus;
    use specflow_core::ActorRef;

    #[test]
    fn modified_story_lists_field_changes() {
        let old = vec![UserStory::new("US-002", "Login").with_description("log in with email")];
        let new = vec![UserStory::new("US-002", "Login")
            .with_description("log in with email or SSO")
            .with_status(StoryStatus::Done)
            .with_assignee(ActorRef::new("u2", "Bob Smith"))];
        let cmp = compare(
            CompareSide::Version(VersionLabel::new(1, 0)),
            "d",
            &old,
            CompareSide::Working,
            "d",
            &new,
        );
        assert!(cmp.description.is_unchanged());
        assert_eq!(cmp.stories.len(), 1);
        let story = &cmp.stories[0];
        assert_eq!(story.kind, ChangeKind::Modified);
        let fields: Vec<_> = story.fields.iter().map(|f| f.field).collect();
        assert_eq!(
            fields,
            vec![StoryField::Description, StoryField::Status, StoryField::Assignee]
        );
        assert_eq!(story.fields[1].old, "todo");
        assert_eq!(story.fields[1].new, "done");
        assert_eq!(story.fields[2].new, "Bob Smith");
        let desc = story.description.as_ref().unwrap();
        assert_eq!(desc.new_text(), "log in with email or SSO");
    }

    #[test]
    fn identical_sides_are_unchanged() {
        let stories = vec![UserStory::new("US-001", "Registration")];
        let cmp = compare(
            CompareSide::Version(VersionLabel::new(1, 0)),
            "text",
            &stories,
            CompareSide::Version(VersionLabel::new(1, 1)),
            "text",
            &stories,
        );
        assert!(cmp.is_unchanged());
        assert_eq!(cmp.count(ChangeKind::Added), 0);
    }

    #[test]
    fn removed_story_keeps_old_title() {
        let old = vec![UserStory::new("US-004", "Legacy import")];
        let cmp = compare(CompareSide::Working, "", &old, CompareSide::Working, "", &[]);
        assert_eq!(cmp.stories[0].kind, ChangeKind::Removed);
        assert_eq!(cmp.stories[0].title, "Legacy import");
        assert_eq!(CompareSide::Version(VersionLabel::new(2, 0)).to_string(), "v2.0");
    }
}
