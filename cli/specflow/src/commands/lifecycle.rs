//! Stage, lock, status, description, and assignee commands.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use specflow_core::ActorRef;
use specflow_lifecycle::SpecStatus;

use super::workspace::Workspace;

/// `specflow stage <id> <stage>`
pub fn stage(ws: &Workspace, id: &str, target: &str) -> Result<()> {
    let mut engine = ws.open_spec(id)?;
    let before = engine.spec().stage();
    let was_locked = engine.spec().requirements_locked();

    let spec = engine.change_stage_named(target)?;
    if spec.stage() == before {
        println!("{id}: already in {before}");
    } else {
        println!("{id}: {before} -> {}", spec.stage());
    }
    if let (false, Some(reason)) = (was_locked, spec.lock_reason()) {
        println!("  {reason}");
    }

    ws.save(engine.spec())?;
    Ok(())
}

/// `specflow unlock <id>`
pub fn unlock(ws: &Workspace, id: &str) -> Result<()> {
    let mut engine = ws.open_spec(id)?;
    engine.unlock()?;
    ws.save(engine.spec())?;
    println!("{id}: requirements unlocked (stage {})", engine.spec().stage());
    Ok(())
}

/// `specflow status <id> <status>`
pub fn status(ws: &Workspace, id: &str, status: &str) -> Result<()> {
    let status: SpecStatus = status.parse()?;
    let mut engine = ws.open_spec(id)?;
    let before = engine.spec().status();
    engine.set_status(status)?;
    ws.save(engine.spec())?;
    println!("{id}: status {before} -> {status}");
    Ok(())
}

/// `specflow describe <id> [TEXT] [--file PATH]`
pub fn describe(ws: &Workspace, id: &str, text: Option<&str>, file: Option<&Path>) -> Result<()> {
    let description = match (text, file) {
        (Some(_), Some(_)) => bail!("pass either a description or --file, not both"),
        (Some(text), None) => text.to_string(),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        (None, None) => bail!("no description given (pass TEXT or --file)"),
    };

    let mut engine = ws.open_spec(id)?;
    engine.edit_description(description)?;
    ws.save(engine.spec())?;
    let words = engine.spec().description().split_whitespace().count();
    println!("{id}: description updated ({words} words)");
    Ok(())
}

/// `specflow assign <id> [--to ID --name NAME | --clear]`
pub fn assign(ws: &Workspace, id: &str, assignee: Option<ActorRef>) -> Result<()> {
    let mut engine = ws.open_spec(id)?;
    let message = match &assignee {
        Some(actor) => format!("{id}: assigned to {}", actor.display_name),
        None => format!("{id}: unassigned"),
    };
    engine.set_assignee(assignee)?;
    ws.save(engine.spec())?;
    println!("{message}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::spec::{create, NewSpec};
    use crate::commands::workspace::tests::temp_workspace;
    use specflow_lifecycle::Stage;

    fn workspace_with_spec() -> (tempfile::TempDir, Workspace) {
        let (dir, ws) = temp_workspace();
        create(&ws, "spec-001", "Auth", NewSpec::default()).unwrap();
        (dir, ws)
    }

    #[test]
    fn stage_change_locks_and_persists() {
        let (_dir, ws) = workspace_with_spec();
        stage(&ws, "spec-001", "technical-design").unwrap();

        let spec = ws.load("spec-001").unwrap();
        assert_eq!(spec.stage(), Stage::TechnicalDesign);
        assert_eq!(
            spec.lock_reason(),
            Some("Requirements locked because spec moved to technical design stage")
        );

        let err = describe(&ws, "spec-001", Some("New text"), None).unwrap_err();
        assert!(err.to_string().contains("locked"));
        assert_eq!(ws.load("spec-001").unwrap(), spec);

        unlock(&ws, "spec-001").unwrap();
        describe(&ws, "spec-001", Some("New text"), None).unwrap();
        assert_eq!(ws.load("spec-001").unwrap().description(), "New text");
    }

    #[test]
    fn bad_stage_and_double_unlock_fail() {
        let (_dir, ws) = workspace_with_spec();
        assert!(stage(&ws, "spec-001", "shipping").is_err());
        assert!(unlock(&ws, "spec-001").is_err());
    }

    #[test]
    fn status_and_assignee() {
        let (_dir, ws) = workspace_with_spec();
        status(&ws, "spec-001", "review").unwrap();
        assert!(status(&ws, "spec-001", "shipped").is_err());
        assign(&ws, "spec-001", Some(ActorRef::new("u2", "Bob Smith"))).unwrap();

        let spec = ws.load("spec-001").unwrap();
        assert_eq!(spec.status(), SpecStatus::Review);
        assert_eq!(spec.assignee().map(|a| a.id.as_str()), Some("u2"));

        assign(&ws, "spec-001", None).unwrap();
        assert!(ws.load("spec-001").unwrap().assignee().is_none());
    }

    #[test]
    fn describe_from_file() {
        let (dir, ws) = workspace_with_spec();
        let path = dir.path().join("desc.md");
        fs::write(&path, "Users sign in.\nSessions expire.\n").unwrap();

        describe(&ws, "spec-001", None, Some(&path)).unwrap();
        assert_eq!(
            ws.load("spec-001").unwrap().description(),
            "Users sign in.\nSessions expire.\n"
        );
        assert!(describe(&ws, "spec-001", None, None).is_err());
    }
}
