//! `specflow approver add`, `specflow approve`, and `specflow reject`.

use anyhow::Result;

use specflow_core::ActorRef;
use specflow_lifecycle::{Approver, Verdict};
use specflow_observe::{RenderContext, ViewKind};

use super::print_view;
use super::workspace::Workspace;

/// `specflow approver add <spec> <approver-id> [--user ID] [--name NAME]`
///
/// Without `--user`/`--name` the approver is the configured identity.
pub fn add(ws: &Workspace, spec_id: &str, approver_id: &str, actor: Option<ActorRef>) -> Result<()> {
    let actor = actor.unwrap_or_else(|| ws.actor());
    let name = actor.display_name.clone();

    let mut engine = ws.open_spec(spec_id)?;
    engine.add_approver(Approver::new(approver_id, actor))?;
    ws.save(engine.spec())?;
    println!(
        "{spec_id}: {name} added as approver {approver_id} ({})",
        engine.spec().approval_summary()
    );
    Ok(())
}

/// `specflow approve|reject <spec> <approver-id> [--comment TEXT]`
pub fn decide(
    ws: &Workspace,
    spec_id: &str,
    approver_id: &str,
    verdict: Verdict,
    comment: Option<&str>,
) -> Result<()> {
    let mut engine = ws.open_spec(spec_id)?;
    engine.record_decision(approver_id, verdict, comment.map(str::to_string))?;
    ws.save(engine.spec())?;
    println!(
        "{spec_id}: {approver_id} {} ({})",
        verdict.status(),
        engine.spec().approval_summary()
    );
    Ok(())
}

/// `specflow approvals <spec>`
pub fn show(ws: &Workspace, spec_id: &str, export: Option<&str>) -> Result<()> {
    let spec = ws.load(spec_id)?;
    print_view(ViewKind::Approvals, &spec, &RenderContext::empty(), export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::lifecycle;
    use crate::commands::spec::{create, NewSpec};
    use crate::commands::workspace::tests::temp_workspace;
    use specflow_lifecycle::{ApprovalStatus, SpecStatus};

    #[test]
    fn approval_round() {
        let (_dir, ws) = temp_workspace();
        create(&ws, "spec-001", "Auth", NewSpec::default()).unwrap();
        add(&ws, "spec-001", "ap-1", Some(ActorRef::new("u1", "Alice Johnson"))).unwrap();
        add(&ws, "spec-001", "ap-2", None).unwrap();
        assert!(add(&ws, "spec-001", "ap-1", None).is_err());

        decide(&ws, "spec-001", "ap-1", Verdict::Approve, Some("Looks good")).unwrap();
        decide(&ws, "spec-001", "ap-2", Verdict::Reject, None).unwrap();
        assert!(decide(&ws, "spec-001", "ap-9", Verdict::Approve, None).is_err());

        let spec = ws.load("spec-001").unwrap();
        let summary = spec.approval_summary();
        assert_eq!((summary.approved, summary.rejected, summary.total), (1, 1, 2));
        assert_eq!(spec.approvers()[1].actor().id, "local");
        assert_eq!(spec.approvers()[0].comment(), Some("Looks good"));
        assert_eq!(spec.status(), SpecStatus::Draft);
        show(&ws, "spec-001", None).unwrap();
    }

    #[test]
    fn decisions_allowed_while_locked() {
        let (_dir, ws) = temp_workspace();
        create(&ws, "spec-001", "Auth", NewSpec::default()).unwrap();
        add(&ws, "spec-001", "ap-1", None).unwrap();
        lifecycle::stage(&ws, "spec-001", "technical-design").unwrap();

        decide(&ws, "spec-001", "ap-1", Verdict::Approve, None).unwrap();
        let spec = ws.load("spec-001").unwrap();
        assert_eq!(spec.approvers()[0].status(), ApprovalStatus::Approved);
        assert!(spec.requirements_locked());
    }
}
