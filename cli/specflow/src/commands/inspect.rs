//! `specflow inspect`: render any view of a spec.

use anyhow::Result;

use specflow_observe::{DiffLayout, RenderContext, ViewKind};

use super::print_view;
use super::version::resolve_comparison;
use super::workspace::Workspace;

/// Render `view` (default `summary`) for spec `id`.
///
/// The compare view compares the current version with the working set.
pub fn run(ws: &Workspace, id: &str, view: Option<&str>, export: Option<&str>) -> Result<()> {
    let kind = match view {
        Some(name) => ViewKind::parse(name)?,
        None => ViewKind::Summary,
    };

    let engine = ws.open_spec(id)?;
    let comparison = if kind == ViewKind::Compare {
        Some(resolve_comparison(&engine, None, None)?)
    } else {
        None
    };
    let ctx = RenderContext {
        comparison: comparison.as_ref(),
        layout: DiffLayout::default(),
        ..RenderContext::empty()
    };
    print_view(kind, engine.spec(), &ctx, export)
}
