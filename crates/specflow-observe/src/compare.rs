//! Compare view: description and story differences between two sides.
//!
//! The description is laid out side by side or inline depending on the
//! render context. Story sections list additions, modifications, and
//! removals; modified stories show each changed field and an inline word
//! diff of their description.

use serde_json::json;

use specflow_diff::ChangeKind;
use specflow_lifecycle::{
    CompareSide, Spec, StoryComparison, StoryField, UserStory, VersionComparison,
};

use crate::error::ObserveError;
use crate::format::{inline_diff, side_by_side, wrap};
use crate::view::{DiffLayout, RenderContext, View, ViewKind, ViewOutput};

pub struct CompareView;

impl View for CompareView {
    fn kind(&self) -> ViewKind {
        ViewKind::Compare
    }

    fn render(&self, spec: &Spec, ctx: &RenderContext<'_>) -> Result<ViewOutput, ObserveError> {
        let cmp = ctx.comparison.ok_or(ObserveError::NoComparison)?;
        let mut text = String::new();

        text.push_str(&format!("=== Compare {} → {} ===\n\n", cmp.from, cmp.to));
        if cmp.is_unchanged() {
            text.push_str("No differences.\n\n");
        } else {
            render_description(cmp, ctx, &mut text);
            render_stories(spec, cmp, ctx.width, &mut text);
        }

        let stats = cmp.description_stats();
        let data = json!({
            "view": "compare",
            "unchanged": cmp.is_unchanged(),
            "descriptionStats": stats,
            "counts": {
                "added": cmp.count(ChangeKind::Added),
                "modified": cmp.count(ChangeKind::Modified),
                "removed": cmp.count(ChangeKind::Removed),
            },
            "comparison": serde_json::to_value(cmp)?,
        });
        Ok(ViewOutput { text, data })
    }
}

fn render_description(cmp: &VersionComparison, ctx: &RenderContext<'_>, text: &mut String) {
    text.push_str("--- Description ---\n");
    if cmp.description.is_unchanged() {
        text.push_str("  unchanged\n\n");
        return;
    }
    match ctx.layout {
        DiffLayout::SideBySide => {
            let column = ctx.width.saturating_sub(3) / 2;
            text.push_str(&side_by_side(
                &cmp.from.to_string(),
                &cmp.description.old_text(),
                &cmp.to.to_string(),
                &cmp.description.new_text(),
                column,
            ));
        }
        DiffLayout::Inline => {
            for line in inline_diff(&cmp.description).lines() {
                text.push_str(&format!("  {line}\n"));
            }
        }
    }
    text.push('\n');
}

fn render_stories(spec: &Spec, cmp: &VersionComparison, width: usize, text: &mut String) {
    for (kind, heading) in [
        (ChangeKind::Added, "Added stories"),
        (ChangeKind::Modified, "Modified stories"),
        (ChangeKind::Removed, "Removed stories"),
    ] {
        let stories: Vec<&StoryComparison> =
            cmp.stories.iter().filter(|s| s.kind == kind).collect();
        if stories.is_empty() {
            continue;
        }
        text.push_str(&format!("--- {heading} ({}) ---\n", stories.len()));
        for story in stories {
            match kind {
                ChangeKind::Added => {
                    text.push_str(&format!("  + {} {}\n", story.id, story.title));
                    let full = find_story(spec, cmp.to, &story.id);
                    render_story_body(full, width, text);
                }
                ChangeKind::Removed => {
                    text.push_str(&format!("  - {} {}\n", story.id, story.title));
                    let full = find_story(spec, cmp.from, &story.id);
                    render_story_body(full, width, text);
                }
                ChangeKind::Modified => render_modified(story, text),
            }
        }
        text.push('\n');
    }
}

fn render_modified(story: &StoryComparison, text: &mut String) {
    text.push_str(&format!("  ~ {} {}\n", story.id, story.title));
    for change in &story.fields {
        if let (StoryField::Description, Some(script)) =
            (change.field, &story.description)
        {
            text.push_str(&format!("      {}: {}\n", change.field.label(), inline_diff(script)));
            continue;
        }
        text.push_str(&format!(
            "      {}: {} → {}\n",
            change.field.label(),
            or_dash(&change.old),
            or_dash(&change.new)
        ));
    }
}

fn render_story_body(story: Option<&UserStory>, width: usize, text: &mut String) {
    let Some(story) = story else { return };
    if story.description.is_empty() {
        return;
    }
    for line in wrap(&story.description, width.saturating_sub(6)) {
        text.push_str(&format!("      {line}\n"));
    }
}

/// The story with `id` on one side of a comparison, if that side still exists.
fn find_story<'a>(spec: &'a Spec, side: CompareSide, id: &str) -> Option<&'a UserStory> {
    let stories = match side {
        CompareSide::Working => spec.user_stories(),
        CompareSide::Version(label) => spec.versions().by_label(label)?.user_stories(),
    };
    stories.iter().find(|s| s.id == id)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
