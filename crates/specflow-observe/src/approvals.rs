//! Approvals view: each approver's decision and overall progress.

use serde_json::json;

use specflow_lifecycle::{ApprovalStatus, Approver, Spec};

use crate::error::ObserveError;
use crate::format::{bar_chart, format_date, truncate};
use crate::view::{RenderContext, View, ViewKind, ViewOutput};

pub struct ApprovalsView;

impl View for ApprovalsView {
    fn kind(&self) -> ViewKind {
        ViewKind::Approvals
    }

    fn render(&self, spec: &Spec, ctx: &RenderContext<'_>) -> Result<ViewOutput, ObserveError> {
        let approvers = spec.approvers();
        let summary = spec.approval_summary();
        let mut text = String::new();

        text.push_str("=== Approvals ===\n\n");
        if approvers.is_empty() {
            text.push_str("No approvers assigned.\n\n");
        } else {
            let name_w = approvers
                .iter()
                .map(|a| a.actor().display_name.chars().count())
                .max()
                .unwrap_or(4)
                .max(4);
            let comment_w = ctx.width.saturating_sub(name_w + 30).max(10);
            text.push_str(&format!(
                "  {:<name_w$}  {:<8}  {:<10}  Comment\n",
                "Name", "Status", "Date"
            ));
            for approver in approvers {
                text.push_str(&format!(
                    "  {:<name_w$}  {:<8}  {:<10}  {}\n",
                    approver.actor().display_name,
                    status_label(approver.status()),
                    approver
                        .decided_at()
                        .map(|t| format_date(&t))
                        .unwrap_or_else(|| "-".to_string()),
                    truncate(approver.comment().unwrap_or(""), comment_w),
                ));
            }
            text.push('\n');
        }
        text.push_str(&format!(
            "  Progress: {} {summary}\n",
            bar_chart(summary.approved, summary.total, 20)
        ));
        if summary.rejected > 0 {
            text.push_str(&format!("  Rejected: {}\n", summary.rejected));
        }
        text.push('\n');

        let data = json!({
            "view": "approvals",
            "summary": summary,
            "approvers": approvers.iter().map(approver_json).collect::<Vec<_>>(),
        });
        Ok(ViewOutput { text, data })
    }
}

fn status_label(status: ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::Pending => "Pending",
        ApprovalStatus::Approved => "Approved",
        ApprovalStatus::Rejected => "Rejected",
    }
}

fn approver_json(approver: &Approver) -> serde_json::Value {
    json!({
        "id": approver.id(),
        "name": approver.actor().display_name,
        "initials": approver.actor().initials(),
        "status": approver.status(),
        "approvedAt": approver.decided_at(),
        "comments": approver.comment(),
    })
}
