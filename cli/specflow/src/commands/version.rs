//! `specflow snapshot`, `specflow versions`, and `specflow compare`.

use anyhow::{bail, Result};

use specflow_lifecycle::compare::compare as compare_content;
use specflow_lifecycle::{CompareSide, SnapshotRequest, SpecLifecycle, VersionComparison};
use specflow_observe::{DiffLayout, RenderContext, ViewKind};

use super::print_view;
use super::workspace::Workspace;

/// `specflow snapshot <id> [--major] [--summary TEXT]`
pub fn snapshot(ws: &Workspace, id: &str, major: bool, summary: Option<&str>) -> Result<()> {
    let mut request = if major {
        SnapshotRequest::major()
    } else {
        SnapshotRequest::minor()
    };
    if let Some(summary) = summary {
        request = request.with_summary(summary);
    }

    let mut engine = ws.open_spec(id)?;
    engine.create_snapshot(ws.actor(), request)?;
    ws.save(engine.spec())?;

    if let Some(version) = engine.spec().current_version() {
        println!("{id}: created {} ({} changes)", version.label(), version.changes().len());
        for change in version.changes() {
            println!("  {}", change.title);
        }
    }
    Ok(())
}

/// `specflow versions <id>`: the history view.
pub fn versions(ws: &Workspace, id: &str, export: Option<&str>) -> Result<()> {
    let spec = ws.load(id)?;
    print_view(ViewKind::History, &spec, &RenderContext::empty(), export)
}

/// `specflow compare <id> [--from V] [--to V] [--inline]`
///
/// `--from` defaults to the current version and `--to` to the working set.
pub fn compare(
    ws: &Workspace,
    id: &str,
    from: Option<&str>,
    to: Option<&str>,
    inline: bool,
    export: Option<&str>,
) -> Result<()> {
    let engine = ws.open_spec(id)?;
    let comparison = resolve_comparison(&engine, from, to)?;
    let ctx = RenderContext {
        comparison: Some(&comparison),
        layout: if inline {
            DiffLayout::Inline
        } else {
            DiffLayout::SideBySide
        },
        ..RenderContext::empty()
    };
    print_view(ViewKind::Compare, engine.spec(), &ctx, export)
}

pub(crate) fn resolve_comparison(
    engine: &SpecLifecycle,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<VersionComparison> {
    let comparison = match (from, to) {
        (None, None) => engine.compare_working()?,
        (from, Some(to)) => {
            let from = match from {
                Some(from) => from.to_string(),
                None => current_id(engine)?,
            };
            engine.compare_versions(&from, to)?
        }
        (Some(from), None) => {
            let old = engine.version(from)?;
            let spec = engine.spec();
            compare_content(
                CompareSide::Version(old.label()),
                old.description(),
                old.user_stories(),
                CompareSide::Working,
                spec.description(),
                spec.user_stories(),
            )
        }
    };
    Ok(comparison)
}

fn current_id(engine: &SpecLifecycle) -> Result<String> {
    match engine.spec().current_version_id() {
        Some(label) => Ok(label.to_string()),
        None => bail!("'{}' has no versions yet (run `specflow snapshot` first)", engine.spec().id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::lifecycle::describe;
    use crate::commands::spec::{create, NewSpec};
    use crate::commands::workspace::tests::temp_workspace;
    use specflow_diff::ChangeKind;

    fn setup() -> (tempfile::TempDir, Workspace) {
        let (dir, ws) = temp_workspace();
        create(&ws, "spec-001", "Auth", NewSpec::default()).unwrap();
        describe(&ws, "spec-001", Some("Users sign in with email."), None).unwrap();
        snapshot(&ws, "spec-001", false, Some("Baseline")).unwrap();
        describe(&ws, "spec-001", Some("Users sign in with email or SSO."), None).unwrap();
        (dir, ws)
    }

    #[test]
    fn snapshot_labels_and_records() {
        let (_dir, ws) = setup();
        snapshot(&ws, "spec-001", false, None).unwrap();
        snapshot(&ws, "spec-001", true, None).unwrap();

        let spec = ws.load("spec-001").unwrap();
        let labels: Vec<String> = spec.versions().list().map(|v| v.id()).collect();
        assert_eq!(labels, vec!["v2.0", "v1.1", "v1.0"]);
        let v11 = spec.versions().get("v1.1").unwrap();
        assert_eq!(v11.changes()[0].title, "Updated description");
        assert_eq!(v11.created_by().id, "local");
        assert_eq!(spec.versions().get("v1.0").unwrap().summary(), Some("Baseline"));
        versions(&ws, "spec-001", None).unwrap();
    }

    #[test]
    fn comparison_defaults() {
        let (_dir, ws) = setup();
        let engine = ws.open_spec("spec-001").unwrap();

        let working = resolve_comparison(&engine, None, None).unwrap();
        assert_eq!(working.from, CompareSide::Version("v1.0".parse().unwrap()));
        assert_eq!(working.to, CompareSide::Working);
        assert!(!working.description.is_unchanged());

        let explicit = resolve_comparison(&engine, Some("v1.0"), None).unwrap();
        assert_eq!(explicit, working);

        assert!(resolve_comparison(&engine, Some("v1.0"), Some("v9.9")).is_err());
    }

    #[test]
    fn compare_between_versions() {
        let (_dir, ws) = setup();
        crate::commands::story::add(
            &ws,
            "spec-001",
            "US-001",
            crate::commands::story::StoryFields {
                title: Some("Login".into()),
                ..Default::default()
            },
        )
        .unwrap();
        snapshot(&ws, "spec-001", false, None).unwrap();

        let engine = ws.open_spec("spec-001").unwrap();
        let cmp = resolve_comparison(&engine, None, Some("v1.1")).unwrap();
        assert!(cmp.is_unchanged());
        let cmp = resolve_comparison(&engine, Some("v1.0"), Some("v1.1")).unwrap();
        assert_eq!(cmp.count(ChangeKind::Added), 1);

        compare(&ws, "spec-001", Some("v1.0"), Some("v1.1"), true, None).unwrap();
        compare(&ws, "spec-001", None, None, false, Some("json")).unwrap();
    }
}
