//! Locating the workspace and reading and writing `<id>.spf` files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use specflow_core::{ActorRef, SystemClock};
use specflow_lifecycle::{Spec, SpecFile, SpecLifecycle};

use crate::manifest::SpecflowManifest;

/// Extension of spec files in the specs directory.
pub const SPEC_EXTENSION: &str = "spf";

/// A loaded `specflow.toml` and the directory it lives in.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    manifest: SpecflowManifest,
}

impl Workspace {
    pub fn new(root: PathBuf, manifest: SpecflowManifest) -> Self {
        Self { root, manifest }
    }

    /// Find the workspace containing `cwd`.
    pub fn open(cwd: &Path) -> Result<Self> {
        match SpecflowManifest::find_and_load(cwd)? {
            Some((manifest, root)) => Ok(Self::new(root, manifest)),
            None => bail!("no specflow.toml found (run `specflow init` first)"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &SpecflowManifest {
        &self.manifest
    }

    pub fn actor(&self) -> ActorRef {
        self.manifest.actor()
    }

    pub fn specs_dir(&self) -> PathBuf {
        self.manifest.specs_dir(&self.root)
    }

    /// Path of the file for spec `id`.
    pub fn spec_path(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty()
            || id.starts_with('.')
            || id.contains(|c: char| c == '/' || c == '\\' || c.is_whitespace())
        {
            bail!("invalid spec id '{id}' (use letters, digits, '-' or '_')");
        }
        Ok(self.specs_dir().join(format!("{id}.{SPEC_EXTENSION}")))
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.spec_path(id)?.is_file())
    }

    /// Read and validate one spec file.
    pub fn load(&self, id: &str) -> Result<Spec> {
        let path = self.spec_path(id)?;
        if !path.is_file() {
            bail!("no spec '{id}' at {}", path.display());
        }
        read_spec(&path)
    }

    /// Every spec in the specs directory, in file-name order.
    pub fn load_all(&self) -> Result<Vec<Spec>> {
        let dir = self.specs_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(SPEC_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();
        paths.iter().map(|p| read_spec(p)).collect()
    }

    /// Write a spec to its file, creating the specs directory if needed.
    pub fn save(&self, spec: &Spec) -> Result<PathBuf> {
        let path = self.spec_path(spec.id())?;
        let dir = self.specs_dir();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        let bytes = SpecFile::new(spec.clone())
            .to_bytes()
            .with_context(|| format!("encoding spec '{}'", spec.id()))?;
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), "spec saved");
        Ok(path)
    }

    /// Load a spec and wrap it in an orchestrator acting as the configured
    /// identity under the configured snapshot policy.
    pub fn open_spec(&self, id: &str) -> Result<SpecLifecycle> {
        self.engine_for(self.load(id)?)
    }

    /// Wrap an in-memory spec the same way [`Workspace::open_spec`] does.
    pub fn engine_for(&self, spec: Spec) -> Result<SpecLifecycle> {
        Ok(self.configure(SpecLifecycle::new(spec)?))
    }

    /// Start a new spec. Fails if one with the same id exists.
    pub fn create_spec(&self, id: &str, title: &str) -> Result<SpecLifecycle> {
        if self.exists(id)? {
            bail!("spec '{id}' already exists");
        }
        let engine = SpecLifecycle::create(
            id,
            title,
            SystemClock,
            Some(self.actor()),
        );
        Ok(self.configure(engine))
    }

    fn configure(&self, engine: SpecLifecycle) -> SpecLifecycle {
        engine
            .with_policy(self.manifest.lifecycle.snapshot_policy)
            .with_actor(self.actor())
    }
}

fn read_spec(path: &Path) -> Result<Spec> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file =
        SpecFile::from_bytes(&data).with_context(|| format!("loading {}", path.display()))?;
    Ok(file.into_spec())
}
