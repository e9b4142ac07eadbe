//! `specflow.toml` parsing and workspace configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use specflow_core::ActorRef;
use specflow_lifecycle::SnapshotPolicy;

/// File name searched for when locating a workspace.
pub const MANIFEST_FILE: &str = "specflow.toml";

/// The top-level configuration for a Specflow workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecflowManifest {
    /// Workspace metadata (required).
    pub workspace: WorkspaceConfig,
    /// Who commands run as.
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Workspace metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Workspace name (required).
    pub name: String,
    /// Directory holding `<id>.spf` files, relative to the manifest.
    #[serde(default = "default_specs_dir")]
    pub specs_dir: String,
}

fn default_specs_dir() -> String {
    "specs".to_string()
}

/// Actor recorded on journal events, snapshots, and decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_id")]
    pub id: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            id: default_identity_id(),
            display_name: default_display_name(),
            avatar: None,
        }
    }
}

fn default_identity_id() -> String {
    "local".to_string()
}

fn default_display_name() -> String {
    "Local User".to_string()
}

/// Lifecycle policy section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub snapshot_policy: SnapshotPolicy,
}

/// Logging section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A tracing filter directive such as `info` or `specflow_lifecycle=debug`.
    #[serde(default)]
    pub level: Option<String>,
}

impl SpecflowManifest {
    /// Search upward from `start_dir` for a `specflow.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: SpecflowManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing specflow.toml")
    }

    /// The configured identity as an actor reference.
    pub fn actor(&self) -> ActorRef {
        let actor = ActorRef::new(&self.identity.id, &self.identity.display_name);
        match &self.identity.avatar {
            Some(avatar) => actor.with_avatar(avatar),
            None => actor,
        }
    }

    /// Absolute specs directory for a workspace rooted at `root`.
    pub fn specs_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.workspace.specs_dir)
    }

    /// Generate the default template for `specflow init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[workspace]
name = "{name}"
specs_dir = "specs"

[identity]
id = "local"
display_name = "Local User"

[lifecycle]
# "always" or "require-unlocked"
snapshot_policy = "always"

[logging]
level = "warn"
"#
        )
    }
}
