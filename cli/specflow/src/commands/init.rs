//! `specflow init`: workspace scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::manifest::{SpecflowManifest, MANIFEST_FILE};

/// Create a new workspace directory `name` relative to cwd.
pub fn run(name: &str) -> Result<()> {
    create_workspace(Path::new(name), name)
}

pub(crate) fn create_workspace(dir: &Path, name: &str) -> Result<()> {
    if dir.exists() {
        bail!("directory '{}' already exists", dir.display());
    }

    fs::create_dir_all(dir.join("specs")).context("creating specs/ directory")?;
    fs::write(dir.join(MANIFEST_FILE), SpecflowManifest::template(name))
        .context("writing specflow.toml")?;

    println!("Created workspace '{name}'");
    println!("  {name}/{MANIFEST_FILE}");
    println!("  {name}/specs/");
    println!();
    println!("Next: cd {name} && specflow new <id> <title>");

    Ok(())
}
