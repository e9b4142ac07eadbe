//! `specflow story add|edit|remove|move|reorder`.

use anyhow::{bail, Result};

use specflow_core::{ActorRef, Priority};
use specflow_lifecycle::{StoryPatch, StoryStatus, UserStory};

use super::workspace::Workspace;

/// Field values given on the command line. Every field is optional so the
/// same shape serves `add` and `edit`.
#[derive(Debug, Default, Clone)]
pub struct StoryFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub criteria: Vec<String>,
    /// Replace rather than keep criteria when editing with none given.
    pub clear_criteria: bool,
    pub estimate: Option<f64>,
    pub assignee: Option<ActorRef>,
    pub unassign: bool,
}

impl StoryFields {
    fn into_patch(self) -> Result<StoryPatch> {
        if self.assignee.is_some() && self.unassign {
            bail!("pass either an assignee or --unassign, not both");
        }
        let criteria = if !self.criteria.is_empty() || self.clear_criteria {
            Some(self.criteria)
        } else {
            None
        };
        let assignee = match (self.assignee, self.unassign) {
            (Some(actor), _) => Some(Some(actor)),
            (None, true) => Some(None),
            (None, false) => None,
        };
        Ok(StoryPatch {
            title: self.title,
            description: self.description,
            priority: self.priority.map(|p| p.parse::<Priority>()).transpose()?,
            status: self.status.map(|s| s.parse::<StoryStatus>()).transpose()?,
            acceptance_criteria: criteria,
            assignee,
            estimate: self.estimate,
        })
    }
}

/// `specflow story add <spec> <story-id> --title ...`
pub fn add(ws: &Workspace, spec_id: &str, story_id: &str, fields: StoryFields) -> Result<()> {
    let Some(title) = fields.title.clone() else {
        bail!("a new story needs --title");
    };
    let patch = fields.into_patch()?;
    let story = patch.applied_to(&UserStory::new(story_id, title));

    let mut engine = ws.open_spec(spec_id)?;
    engine.add_story(story)?;
    ws.save(engine.spec())?;
    println!(
        "{spec_id}: added {story_id} ({} stories)",
        engine.spec().user_stories().len()
    );
    Ok(())
}

/// `specflow story edit <spec> <story-id> [fields]`
pub fn edit(ws: &Workspace, spec_id: &str, story_id: &str, fields: StoryFields) -> Result<()> {
    let patch = fields.into_patch()?;
    if patch.is_empty() {
        bail!("nothing to change (pass at least one field)");
    }

    let mut engine = ws.open_spec(spec_id)?;
    engine.update_story(story_id, patch)?;
    ws.save(engine.spec())?;
    println!("{spec_id}: updated {story_id}");
    Ok(())
}

/// `specflow story remove <spec> <story-id>`
pub fn remove(ws: &Workspace, spec_id: &str, story_id: &str) -> Result<()> {
    let mut engine = ws.open_spec(spec_id)?;
    engine.remove_story(story_id)?;
    ws.save(engine.spec())?;
    println!("{spec_id}: removed {story_id}");
    Ok(())
}

/// `specflow story move <spec> <story-id> --to <position>`, 1-based.
pub fn move_to(ws: &Workspace, spec_id: &str, story_id: &str, position: usize) -> Result<()> {
    if position == 0 {
        bail!("positions start at 1");
    }
    let mut engine = ws.open_spec(spec_id)?;
    engine.move_story(story_id, position - 1)?;
    ws.save(engine.spec())?;
    println!("{spec_id}: moved {story_id} to position {position}");
    Ok(())
}

/// `specflow story reorder <spec> <id>...`
pub fn reorder(ws: &Workspace, spec_id: &str, ids: &[String]) -> Result<()> {
    let mut engine = ws.open_spec(spec_id)?;
    engine.reorder_stories(ids)?;
    ws.save(engine.spec())?;
    println!("{spec_id}: order is now {}", ids.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::lifecycle;
    use crate::commands::spec::{create, NewSpec};
    use crate::commands::workspace::tests::temp_workspace;

    fn fields(title: &str) -> StoryFields {
        StoryFields {
            title: Some(title.to_string()),
            ..StoryFields::default()
        }
    }

    fn ids(ws: &Workspace) -> Vec<String> {
        ws.load("spec-001")
            .unwrap()
            .user_stories()
            .iter()
            .map(|s| s.id.clone())
            .collect()
    }

    fn setup() -> (tempfile::TempDir, Workspace) {
        let (dir, ws) = temp_workspace();
        create(&ws, "spec-001", "Auth", NewSpec::default()).unwrap();
        for (id, title) in [("US-001", "Registration"), ("US-002", "Login"), ("US-003", "Reset")] {
            add(&ws, "spec-001", id, fields(title)).unwrap();
        }
        (dir, ws)
    }

    #[test]
    fn add_with_all_fields() {
        let (_dir, ws) = setup();
        let full = StoryFields {
            title: Some("Profile".into()),
            description: Some("Edit profile details".into()),
            priority: Some("high".into()),
            status: Some("in-progress".into()),
            criteria: vec!["Name is editable".into()],
            estimate: Some(3.0),
            assignee: Some(ActorRef::new("u1", "Alice Johnson")),
            ..StoryFields::default()
        };
        add(&ws, "spec-001", "US-004", full).unwrap();

        let spec = ws.load("spec-001").unwrap();
        let story = spec.story("US-004").unwrap();
        assert_eq!(story.priority, Priority::High);
        assert_eq!(story.status, StoryStatus::InProgress);
        assert_eq!(story.acceptance_criteria, vec!["Name is editable"]);
        assert_eq!(story.estimate, 3.0);
    }

    #[test]
    fn add_requires_title_and_unique_id() {
        let (_dir, ws) = setup();
        assert!(add(&ws, "spec-001", "US-009", StoryFields::default()).is_err());
        assert!(add(&ws, "spec-001", "US-001", fields("Again")).is_err());
        let negative = StoryFields {
            estimate: Some(-1.0),
            ..fields("Negative")
        };
        assert!(add(&ws, "spec-001", "US-009", negative).is_err());
    }

    #[test]
    fn edit_patches_only_given_fields() {
        let (_dir, ws) = setup();
        let patch = StoryFields {
            description: Some("Log in with email or SSO".into()),
            ..StoryFields::default()
        };
        edit(&ws, "spec-001", "US-002", patch).unwrap();

        let spec = ws.load("spec-001").unwrap();
        let story = spec.story("US-002").unwrap();
        assert_eq!(story.title, "Login");
        assert_eq!(story.description, "Log in with email or SSO");
        assert!(edit(&ws, "spec-001", "US-002", StoryFields::default()).is_err());
        assert!(edit(&ws, "spec-001", "US-404", fields("x")).is_err());
    }

    #[test]
    fn move_and_reorder() {
        let (_dir, ws) = setup();
        move_to(&ws, "spec-001", "US-003", 1).unwrap();
        assert_eq!(ids(&ws), vec!["US-003", "US-001", "US-002"]);
        assert!(move_to(&ws, "spec-001", "US-003", 0).is_err());
        assert!(move_to(&ws, "spec-001", "US-003", 4).is_err());

        let order: Vec<String> = ["US-002", "US-001", "US-003"].map(String::from).to_vec();
        reorder(&ws, "spec-001", &order).unwrap();
        assert_eq!(ids(&ws), order);
        assert!(reorder(&ws, "spec-001", &order[..2]).is_err());
    }

    #[test]
    fn locked_spec_rejects_story_edits() {
        let (_dir, ws) = setup();
        lifecycle::stage(&ws, "spec-001", "implementation-tasks").unwrap();
        let before = ws.load("spec-001").unwrap();

        assert!(remove(&ws, "spec-001", "US-001").is_err());
        assert!(add(&ws, "spec-001", "US-009", fields("Late")).is_err());
        assert_eq!(ws.load("spec-001").unwrap(), before);
    }
}
