//! `specflow new`, `specflow list`, and `specflow show`.

use anyhow::{anyhow, Result};

use specflow_core::{format_timestamp, Priority};
use specflow_lifecycle::{filter_summaries, sort_summaries, SortKey, SpecSummary};
use specflow_observe::{truncate, RenderContext, ViewFormat, ViewKind};

use super::print_view;
use super::workspace::Workspace;

/// Options for a new spec.
#[derive(Debug, Default)]
pub struct NewSpec<'a> {
    pub priority: Option<&'a str>,
    pub description: Option<&'a str>,
    pub cycle: Option<&'a str>,
}

/// `specflow new <id> <title>`
pub fn create(ws: &Workspace, id: &str, title: &str, opts: NewSpec<'_>) -> Result<()> {
    let priority = opts
        .priority
        .map(|p| p.parse::<Priority>())
        .transpose()?;

    let engine = ws.create_spec(id, title)?;
    let mut spec = engine.into_spec();
    if let Some(priority) = priority {
        spec = spec.with_priority(priority);
    }
    if let Some(cycle) = opts.cycle {
        spec = spec.with_cycle(cycle);
    }
    let mut engine = ws.engine_for(spec)?;
    if let Some(description) = opts.description {
        engine.edit_description(description)?;
    }

    let path = ws.save(engine.spec())?;
    println!("Created spec '{id}' at {}", path.display());
    Ok(())
}

/// `specflow list [--query] [--sort]`
pub fn list(
    ws: &Workspace,
    query: Option<&str>,
    sort: Option<&str>,
    export: Option<&str>,
) -> Result<()> {
    let key = sort
        .map(|s| s.parse::<SortKey>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or_default();

    let mut summaries: Vec<SpecSummary> = ws.load_all()?.iter().map(SpecSummary::from).collect();
    sort_summaries(&mut summaries, key);
    let rows = filter_summaries(&summaries, query.unwrap_or(""));

    if export.map(ViewFormat::parse) == Some(ViewFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No specs found.");
        return Ok(());
    }

    println!(
        "{:<14}  {:<32}  {:<8}  {:<11}  {:<20}  {:<7}  {:<10}  UPDATED",
        "ID", "TITLE", "PRIORITY", "STATUS", "STAGE", "VERSION", "APPROVALS"
    );
    println!("{}", "-".repeat(130));
    for row in rows {
        let stage = if row.locked {
            format!("{} *", row.stage)
        } else {
            row.stage.to_string()
        };
        println!(
            "{:<14}  {:<32}  {:<8}  {:<11}  {:<20}  {:<7}  {:<10}  {}",
            row.id,
            truncate(&row.title, 32),
            row.priority.as_str(),
            row.status.as_str(),
            stage,
            row.current_version
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format!("{}/{}", row.approval_summary.approved, row.approval_summary.total),
            format_timestamp(&row.updated_at),
        );
    }
    println!();
    println!("* requirements locked");
    Ok(())
}

/// `specflow show <id>`: summary followed by the stories.
pub fn show(ws: &Workspace, id: &str, export: Option<&str>) -> Result<()> {
    let spec = ws.load(id)?;
    let ctx = RenderContext::empty();
    print_view(ViewKind::Summary, &spec, &ctx, export)?;
    if export.map(ViewFormat::parse) != Some(ViewFormat::Json) {
        print_view(ViewKind::Stories, &spec, &ctx, export)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::workspace::tests::temp_workspace;
    use specflow_lifecycle::Stage;

    #[test]
    fn create_applies_options() {
        let (_dir, ws) = temp_workspace();
        create(
            &ws,
            "spec-001",
            "User Authentication System",
            NewSpec {
                priority: Some("urgent"),
                description: Some("Users sign in with email."),
                cycle: Some("Q1 2024"),
            },
        )
        .unwrap();

        let spec = ws.load("spec-001").unwrap();
        assert_eq!(spec.priority(), Priority::Urgent);
        assert_eq!(spec.description(), "Users sign in with email.");
        assert_eq!(spec.cycle(), Some("Q1 2024"));
        assert_eq!(spec.stage(), Stage::Requirements);
        assert_eq!(spec.journal().len(), 2);
    }

    #[test]
    fn create_rejects_bad_priority_without_writing() {
        let (_dir, ws) = temp_workspace();
        let opts = NewSpec {
            priority: Some("critical"),
            ..NewSpec::default()
        };
        assert!(create(&ws, "spec-001", "Auth", opts).is_err());
        assert!(!ws.exists("spec-001").unwrap());
    }

    #[test]
    fn list_and_show_run() {
        let (_dir, ws) = temp_workspace();
        create(&ws, "spec-001", "Auth", NewSpec::default()).unwrap();
        create(&ws, "spec-002", "Billing", NewSpec::default()).unwrap();

        list(&ws, Some("bill"), Some("title"), None).unwrap();
        list(&ws, None, None, Some("json")).unwrap();
        assert!(list(&ws, None, Some("size"), None).is_err());
        show(&ws, "spec-001", None).unwrap();
        assert!(show(&ws, "spec-404", None).is_err());
    }
}
