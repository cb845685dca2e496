//! Release context - assembled once at the CLI boundary, passed everywhere
//!
//! # Architecture
//!
//! ```text
//! main.rs:
//!   CLI flags + env fallbacks -> ReleaseSettings
//!   DeployConfig::load()      -> PackageGraph
//!   |
//!   v
//! ReleaseContext { settings, config, graph }
//!   |
//!   v
//! commands/release.rs, plan.rs:
//!   fn run(ctx: &ReleaseContext)
//! ```
//!
//! Nothing below this layer reads the process environment.

use crate::core::config::{DeployConfig, RegistryKind};
use crate::core::error::{DeployResult, ResultExt};
use crate::graph::PackageGraph;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default cap on captured output per stream
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 8 * 1024 * 1024;

/// Username + API key for one registry class
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
  pub user: String,
  pub key: String,
}

impl CredentialPair {
  pub fn new(user: impl Into<String>, key: impl Into<String>) -> Self {
    Self {
      user: user.into(),
      key: key.into(),
    }
  }
}

impl fmt::Debug for CredentialPair {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CredentialPair")
      .field("user", &self.user)
      .field("key", &"<redacted>")
      .finish()
  }
}

/// Both credential classes; at most one is on disk at a time
#[derive(Debug, Clone)]
pub struct RegistryCredentials {
  pub library: CredentialPair,
  pub generic: CredentialPair,
}

impl RegistryCredentials {
  /// Pick the pair for a registry class
  pub fn for_kind(&self, kind: RegistryKind) -> &CredentialPair {
    match kind {
      RegistryKind::Library => &self.library,
      RegistryKind::Generic => &self.generic,
    }
  }
}

/// Already-validated inputs for one release run
#[derive(Debug, Clone)]
pub struct ReleaseSettings {
  /// Raw `<package>/<version>` tag
  pub tag: String,

  pub credentials: RegistryCredentials,

  /// Directory that holds the credential file while a scope is open
  pub credentials_dir: PathBuf,

  /// Cap on retained output per stream of each command
  pub max_output_bytes: usize,
}

/// Everything a command needs, built once
pub struct ReleaseContext {
  pub workspace_root: PathBuf,
  pub config: DeployConfig,
  pub graph: PackageGraph,
}

impl ReleaseContext {
  /// Build the context from a loaded config
  pub fn new(workspace_root: &Path, config: DeployConfig) -> DeployResult<Self> {
    let graph = PackageGraph::from_config(&config).context("Invalid package graph in deploy.toml")?;
    Ok(Self {
      workspace_root: workspace_root.to_path_buf(),
      config,
      graph,
    })
  }

  /// Load deploy.toml (explicit path or search) and build the context
  pub fn load(workspace_root: &Path, config_path: Option<&Path>) -> DeployResult<Self> {
    let config = match config_path {
      Some(path) => DeployConfig::load_from(path)?,
      None => DeployConfig::load(workspace_root)?,
    };
    Self::new(workspace_root, config)
  }

  /// Absolute build location of a package
  pub fn package_dir(&self, package: &Path) -> PathBuf {
    self.workspace_root.join(package)
  }
}
