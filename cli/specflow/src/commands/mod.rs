//! CLI command implementations.

pub mod approval;
pub mod init;
pub mod inspect;
pub mod lifecycle;
pub mod spec;
pub mod story;
pub mod version;
pub mod workspace;

use anyhow::Result;

use specflow_lifecycle::Spec;
use specflow_observe::{view_for, RenderContext, ViewFormat, ViewKind};

/// Render one view of `spec` to stdout.
pub(crate) fn print_view(
    kind: ViewKind,
    spec: &Spec,
    ctx: &RenderContext<'_>,
    export: Option<&str>,
) -> Result<()> {
    let output = view_for(kind).render(spec, ctx)?;
    let format = export.map(ViewFormat::parse).unwrap_or(ViewFormat::Text);
    print!("{}", output.render(format));
    if format == ViewFormat::Json {
        println!();
    }
    Ok(())
}
