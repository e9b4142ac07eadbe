//! History view: versions newest-first with their change records.

use serde_json::json;

use specflow_diff::ChangeKind;
use specflow_lifecycle::{ChangeRecord, Spec, SpecVersion};

use crate::error::ObserveError;
use crate::format::format_date;
use crate::view::{RenderContext, View, ViewKind, ViewOutput};

pub struct HistoryView;

impl View for HistoryView {
    fn kind(&self) -> ViewKind {
        ViewKind::History
    }

    fn render(&self, spec: &Spec, _ctx: &RenderContext<'_>) -> Result<ViewOutput, ObserveError> {
        let store = spec.versions();
        let current = store.current_label();
        let mut text = String::new();

        text.push_str("=== Version History ===\n\n");
        if store.is_empty() {
            text.push_str("No versions yet. Run `specflow snapshot` to create v1.0.\n\n");
        }
        for version in store.list() {
            render_version(version, current == Some(version.label()), &mut text);
        }

        let versions: Vec<_> = store
            .list()
            .map(|v| {
                json!({
                    "id": v.id(),
                    "current": current == Some(v.label()),
                    "createdAt": v.created_at(),
                    "createdBy": v.created_by(),
                    "summary": v.summary(),
                    "stories": v.user_stories().len(),
                    "changes": v.changes(),
                })
            })
            .collect();
        let data = json!({
            "view": "history",
            "current": current.map(|l| l.to_string()),
            "versions": versions,
        });
        Ok(ViewOutput { text, data })
    }
}

fn render_version(version: &SpecVersion, current: bool, text: &mut String) {
    let marker = if current { " (current)" } else { "" };
    text.push_str(&format!(
        "{}{marker} · {} · {} · {} changes\n",
        version.label(),
        format_date(&version.created_at()),
        version.created_by().display_name,
        version.changes().len(),
    ));
    if let Some(summary) = version.summary() {
        text.push_str(&format!("  \"{summary}\"\n"));
    }
    for change in version.changes() {
        text.push_str(&format!("  {} {}\n", change_symbol(change), change.title));
        if !change.detail.is_empty() {
            text.push_str(&format!("      {}\n", change.detail));
        }
    }
    text.push('\n');
}

fn change_symbol(change: &ChangeRecord) -> &'static str {
    match change.kind {
        ChangeKind::Added => "+",
        ChangeKind::Modified => "~",
        ChangeKind::Removed => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use specflow_core::{ActorRef, ManualClock};
    use specflow_lifecycle::{SnapshotRequest, SpecLifecycle, UserStory};

    fn versioned() -> Spec {
        let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap())
            .with_tick(Duration::hours(1));
        let alice = ActorRef::new("u1", "Alice Johnson");
        let mut engine = SpecLifecycle::create("spec-001", "Auth", clock, None);
        engine.edit_description("Login").unwrap();
        engine.add_story(UserStory::new("US-001", "Registration")).unwrap();
        engine
            .create_snapshot(alice.clone(), SnapshotRequest::minor().with_summary("Baseline"))
            .unwrap();
        engine.add_story(UserStory::new("US-002", "Login")).unwrap();
        engine.create_snapshot(alice, SnapshotRequest::minor()).unwrap();
        engine.into_spec()
    }

    #[test]
    fn empty_history() {
        let spec = Spec::new("s", "t", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let output = HistoryView.render(&spec, &RenderContext::empty()).unwrap();
        assert!(output.text.contains("No versions yet"));
        assert!(output.data["current"].is_null());
    }

    #[test]
    fn newest_first_with_changes() {
        let output = HistoryView.render(&versioned(), &RenderContext::empty()).unwrap();
        let v11 = output.text.find("v1.1 (current)").unwrap();
        let v10 = output.text.find("v1.0 ·").unwrap();
        assert!(v11 < v10);
        assert!(output.text.contains("+ Added user story US-002"));
        assert!(output.text.contains("\"Baseline\""));
        assert_eq!(output.data["versions"][0]["id"], "v1.1");
        assert_eq!(output.data["versions"][1]["changes"][0]["type"], "added");
        assert_eq!(output.data["versions"][1]["changes"][0]["section"], "description");
    }
}
