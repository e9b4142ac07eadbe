//! Stories view: the working user stories with their acceptance criteria.

use serde_json::json;

use specflow_lifecycle::{Spec, UserStory};

use crate::error::ObserveError;
use crate::format::{format_points, truncate, wrap};
use crate::view::{RenderContext, View, ViewKind, ViewOutput};

pub struct StoriesView;

impl View for StoriesView {
    fn kind(&self) -> ViewKind {
        ViewKind::Stories
    }

    fn render(&self, spec: &Spec, ctx: &RenderContext<'_>) -> Result<ViewOutput, ObserveError> {
        let stories = spec.user_stories();
        let mut text = String::new();

        text.push_str("=== User Stories ===\n\n");
        if stories.is_empty() {
            text.push_str("No user stories defined.\n\n");
        } else {
            render_table(stories, &mut text);
            for story in stories {
                render_detail(story, ctx.width, &mut text);
            }
        }
        if let Some(reason) = spec.lock_reason() {
            text.push_str(&format!("Read-only: {reason}\n"));
        }

        let total_points: f64 = stories.iter().map(|s| s.estimate).sum();
        let data = json!({
            "view": "stories",
            "locked": spec.requirements_locked(),
            "totalPoints": total_points,
            "stories": serde_json::to_value(stories)?,
        });
        Ok(ViewOutput { text, data })
    }
}

fn render_table(stories: &[UserStory], text: &mut String) {
    let id_w = stories.iter().map(|s| s.id.len()).max().unwrap_or(2).max(2);
    let title_w = stories
        .iter()
        .map(|s| s.title.chars().count())
        .max()
        .unwrap_or(5)
        .clamp(5, 40);

    text.push_str(&format!(
        "  {:<id_w$}  {:<title_w$}  {:<8}  {:<11}  {:>6}  Assignee\n",
        "ID", "Title", "Priority", "Status", "Points",
    ));
    for story in stories {
        let assignee = story
            .assignee
            .as_ref()
            .map(|a| a.display_name.as_str())
            .unwrap_or("-");
        text.push_str(&format!(
            "  {:<id_w$}  {:<title_w$}  {:<8}  {:<11}  {:>6}  {}\n",
            story.id,
            truncate(&story.title, title_w),
            story.priority.as_str(),
            story.status.label(),
            format_points(story.estimate),
            assignee,
        ));
    }
    text.push('\n');
}

fn render_detail(story: &UserStory, width: usize, text: &mut String) {
    text.push_str(&format!("--- {} · {} ---\n", story.id, story.title));
    if !story.description.is_empty() {
        for line in wrap(&story.description, width.saturating_sub(2)) {
            text.push_str(&format!("  {line}\n"));
        }
    }
    if !story.acceptance_criteria.is_empty() {
        text.push_str("  Acceptance criteria:\n");
        for (i, criterion) in story.acceptance_criteria.iter().enumerate() {
            text.push_str(&format!("    {}. {criterion}\n", i + 1));
        }
    }
    text.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use specflow_core::{ActorRef, Priority};

    fn spec() -> Spec {
        Spec::new(
            "spec-001",
            "Auth",
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
        )
        .with_story(
            UserStory::new("US-001", "User Registration")
                .with_priority(Priority::Urgent)
                .with_estimate(8.0)
                .with_assignee(ActorRef::new("u1", "Alice Johnson"))
                .with_criterion("User can enter email address and password"),
        )
        .with_story(UserStory::new("US-002", "Secure User Login").with_estimate(2.5))
    }

    #[test]
    fn empty_spec() {
        let s = Spec::new("s", "t", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let output = StoriesView.render(&s, &RenderContext::empty()).unwrap();
        assert!(output.text.contains("No user stories defined"));
        assert_eq!(output.data["stories"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn table_and_details() {
        let output = StoriesView.render(&spec(), &RenderContext::empty()).unwrap();
        assert!(output.text.contains("US-001"));
        assert!(output.text.contains("Alice Johnson"));
        assert!(output.text.contains("To Do"));
        assert!(output.text.contains("1. User can enter email address and password"));
        assert!(!output.text.contains("Read-only"));
        assert_eq!(output.data["totalPoints"], 10.5);
        assert_eq!(output.data["stories"][1]["estimatedPoints"], 2.5);
    }
}
