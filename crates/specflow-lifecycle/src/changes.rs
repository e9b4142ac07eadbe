//! Change records for a new snapshot, derived from the diff engine.

use specflow_diff::{diff_keyed, diff_words, ChangeKind, EditScript, KeyedChange, OpKind};

use crate::story::UserStory;
use crate::version::{ChangeRecord, ChangeSection, SpecVersion};

/// Describe how `description` and `stories` differ from `previous`.
///
/// With no previous version the description is recorded as added when it is
/// non-empty, and every story is recorded as added. Description records
/// come first, followed by story records in diff order.
pub fn derive_changes(
    previous: Option<&SpecVersion>,
    description: &str,
    stories: &[UserStory],
) -> Vec<ChangeRecord> {
    let mut records = Vec::new();

    let (old_description, old_stories) = match previous {
        Some(version) => (version.description(), version.user_stories()),
        None => ("", &[][..]),
    };

    if let Some(record) = description_change(previous.is_none(), old_description, description) {
        records.push(record);
    }

    records.extend(diff_keyed(old_stories, stories).into_iter().map(story_change));
    records
}

fn description_change(first: bool, old: &str, new: &str) -> Option<ChangeRecord> {
    if first {
        if new.is_empty() {
            return None;
        }
        return Some(ChangeRecord {
            kind: ChangeKind::Added,
            section: ChangeSection::Description,
            title: "Initial description".into(),
            detail: format!("{} words", count_words(new)),
            story_id: None,
        });
    }
    if old == new {
        return None;
    }
    let script = diff_words(old, new);
    let (added, removed) = word_counts(&script);
    Some(ChangeRecord {
        kind: ChangeKind::Modified,
        section: ChangeSection::Description,
        title: "Updated description".into(),
        detail: format!("{added} words added, {removed} words removed"),
        story_id: None,
    })
}

fn story_change(change: KeyedChange<'_, UserStory>) -> ChangeRecord {
    let (title, detail) = match change {
        KeyedChange::Added(story) => (format!("Added user story {}", story.id), story.title.clone()),
        KeyedChange::Removed(story) => {
            (format!("Removed user story {}", story.id), story.title.clone())
        }
        KeyedChange::Modified { old, new } => {
            let fields: Vec<&str> = old.changed_fields(new).iter().map(|f| f.label()).collect();
            (
                format!("Modified user story {}", new.id),
                format!("Changed {}", fields.join(", ")),
            )
        }
    };
    ChangeRecord {
        kind: change.kind(),
        section: ChangeSection::UserStory,
        title,
        detail,
        story_id: Some(change.key().clone()),
    }
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Non-whitespace tokens inserted and deleted by a word-level script.
fn word_counts(script: &EditScript) -> (usize, usize) {
    script.edits().fold((0, 0), |(added, removed), op| match op.kind {
        OpKind::Insert => (added + count_words(&op.text), removed),
        OpKind::Delete => (added, removed + count_words(&op.text)),
        OpKind::Equal => (added, removed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{BumpKind, SnapshotDraft, VersionStore};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use specflow_core::{ActorRef, Priority};

    fn store_with(description: &str, stories: &[UserStory]) -> VersionStore {
        let mut store = VersionStore::new();
        store.create_snapshot(SnapshotDraft {
            description,
            user_stories: stories,
            created_by: ActorRef::new("u1", "Alice Johnson"),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            bump: BumpKind::Minor,
            summary: None,
        })
        .unwrap();
        store
    }

    #[test]
    fn first_snapshot_with_empty_description_lists_only_stories() {
        let stories = vec![UserStory::new("US-001", "A"), UserStory::new("US-002", "B")];
        let records = derive_changes(None, "", &stories);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind == ChangeKind::Added));
        assert_eq!(records[1].story_id.as_deref(), Some("US-002"));
    }

    #[test]
    fn modified_description_counts_words() {
        let store = store_with("Login with email and password", &[]);
        let records = derive_changes(store.current(), "Login with email, password and MFA", &[]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ChangeKind::Modified);
        assert_eq!(records[0].title, "Updated description");
        assert_eq!(records[0].detail, "3 words added, 2 words removed");
    }

    #[test]
    fn story_records_follow_diff_order() {
        let old = vec![
            UserStory::new("US-001", "Registration"),
            UserStory::new("US-002", "Login"),
            UserStory::new("US-004", "Legacy"),
        ];
        let store = store_with("same", &old);
        let new = vec![
            UserStory::new("US-001", "Registration"),
            UserStory::new("US-002", "Login").with_priority(Priority::Urgent),
            UserStory::new("US-003", "MFA setup"),
        ];
        let records = derive_changes(store.current(), "same", &new);
        let summary: Vec<(ChangeKind, &str, &str)> = records
            .iter()
            .map(|r| (r.kind, r.story_id.as_deref().unwrap_or(""), r.detail.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ChangeKind::Modified, "US-002", "Changed priority"),
                (ChangeKind::Added, "US-003", "MFA setup"),
                (ChangeKind::Removed, "US-004", "Legacy"),
            ]
        );
    }

    #[test]
    fn unchanged_content_yields_no_records() {
        let stories = vec![UserStory::new("US-001", "Registration")];
        let store = store_with("text", &stories);
        assert!(derive_changes(store.current(), "text", &stories).is_empty());
    }
}
