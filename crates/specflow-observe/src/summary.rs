//! Summary view: stage, lock, status, version, and approval progress.

use serde_json::json;

use specflow_core::format_timestamp;
use specflow_lifecycle::{Spec, SpecOverview};

use crate::error::ObserveError;
use crate::format::bar_chart;
use crate::view::{RenderContext, View, ViewKind, ViewOutput};

pub struct SummaryView;

impl View for SummaryView {
    fn kind(&self) -> ViewKind {
        ViewKind::Summary
    }

    fn render(&self, spec: &Spec, _ctx: &RenderContext<'_>) -> Result<ViewOutput, ObserveError> {
        let overview = SpecOverview::from(spec);
        let mut text = String::new();

        text.push_str(&format!("=== {} · {} ===\n\n", overview.id, overview.title));
        text.push_str(&format!("  Priority:  {}\n", overview.priority));
        text.push_str(&format!("  Status:    {}\n", overview.status));
        text.push_str(&format!("  Stage:     {}\n", overview.stage));
        match overview.lock.reason() {
            Some(reason) => text.push_str(&format!("  Locked:    yes ({reason})\n")),
            None => text.push_str("  Locked:    no\n"),
        }
        let version = overview
            .current_version
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string());
        text.push_str(&format!(
            "  Version:   {version} ({} total)\n",
            overview.version_count
        ));
        if overview.has_unsnapshotted_changes {
            text.push_str("             working set has unsnapshotted changes\n");
        }
        text.push_str(&format!("  Stories:   {}\n", overview.story_count));
        if let Some(assignee) = &overview.assignee {
            text.push_str(&format!("  Assignee:  {}\n", assignee.display_name));
        }
        if let Some(cycle) = &overview.cycle {
            text.push_str(&format!("  Cycle:     {cycle}\n"));
        }
        text.push_str(&format!(
            "  Updated:   {}\n",
            format_timestamp(&overview.updated_at)
        ));
        text.push_str(&format!(
            "  Approvals: {} {}\n",
            bar_chart(overview.approvals.approved, overview.approvals.total, 20),
            overview.approvals
        ));
        text.push('\n');

        let mut data = json!({ "view": "summary" });
        data["overview"] = serde_json::to_value(&overview)?;
        Ok(ViewOutput { text, data })
    }
}
