use crate::core::error::{ConfigError, DeployError, DeployResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Package table for deploy-rail
/// Searched in order: deploy.toml, .deploy.toml, .config/deploy.toml
///
/// # Example
///
/// ```toml
/// tool = "sbt"
///
/// [[packages]]
/// name = "schema-ddl"
/// path = "0-common/schema-ddl"
/// registry = "library"
/// dependencies = ["scala-core"]
/// install = [
///   { args = ["+test", "--warn"], handler = "verbose" },
///   { args = ["+publishLocal"] },
/// ]
/// test = [{ args = ["+test", "--warn"], handler = "verbose" }]
/// publish = [{ args = ["+publish"] }]
/// sync = [{ args = ["+bintraySyncMavenCentral"] }]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
  /// Build tool invoked for every step (per-package override allowed)
  #[serde(default = "default_tool")]
  pub tool: String,

  /// Arguments that make the build tool report the declared version
  #[serde(default = "default_version_command")]
  pub version_command: Vec<String>,

  #[serde(default)]
  pub registry: RegistryConfig,

  #[serde(default)]
  pub packages: Vec<PackageConfig>,
}

fn default_tool() -> String {
  "sbt".to_string()
}

fn default_version_command() -> Vec<String> {
  vec!["version".to_string(), "-Dsbt.log.noformat=true".to_string()]
}

/// Fixed fields written into the credential artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
  #[serde(default = "default_realm")]
  pub realm: String,

  #[serde(default = "default_host")]
  pub host: String,
}

fn default_realm() -> String {
  "Bintray API Realm".to_string()
}

fn default_host() -> String {
  "api.bintray.com".to_string()
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      realm: default_realm(),
      host: default_host(),
    }
  }
}

/// Which credential class a package publishes with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
  /// Library (maven-style) registry
  #[default]
  Library,
  /// Generic/binary artifact registry
  Generic,
}

impl fmt::Display for RegistryKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RegistryKind::Library => write!(f, "library"),
      RegistryKind::Generic => write!(f, "generic"),
    }
  }
}

/// One package in the static dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
  /// Unique identifier, also the first half of a release tag
  pub name: String,

  /// Build location, relative to the workspace root
  pub path: PathBuf,

  #[serde(default)]
  pub registry: RegistryKind,

  /// Direct dependencies in declared order
  #[serde(default)]
  pub dependencies: Vec<String>,

  /// Overrides the top-level tool
  #[serde(default)]
  pub tool: Option<String>,

  /// Local build + install (run when this package is a dependency)
  #[serde(default)]
  pub install: Vec<Step>,

  #[serde(default)]
  pub test: Vec<Step>,

  #[serde(default)]
  pub publish: Vec<Step>,

  /// Registry sync after publish
  #[serde(default)]
  pub sync: Vec<Step>,
}

/// One build tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
  pub args: Vec<String>,

  #[serde(default)]
  pub handler: StepHandler,
}

/// How a step's outcome is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StepHandler {
  /// Silent on success, fatal on failure
  #[default]
  FailFast,
  /// Prints stdout on success, fatal on failure
  Verbose,
}

impl fmt::Display for StepHandler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepHandler::FailFast => write!(f, "fail-fast"),
      StepHandler::Verbose => write!(f, "verbose"),
    }
  }
}

impl DeployConfig {
  /// Find config file in search order: deploy.toml, .deploy.toml, .config/deploy.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("deploy.toml"),
      path.join(".deploy.toml"),
      path.join(".config").join("deploy.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the workspace root (searches multiple locations)
  pub fn load(workspace_root: &Path) -> DeployResult<Self> {
    let config_path = Self::find_config_path(workspace_root).ok_or_else(|| {
      DeployError::Config(ConfigError::NotFound {
        workspace_root: workspace_root.to_path_buf(),
      })
    })?;

    Self::load_from(&config_path)
  }

  /// Load config from an explicit file
  pub fn load_from(config_path: &Path) -> DeployResult<Self> {
    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

    Self::parse(&content).with_context(|| format!("Invalid configuration in {}", config_path.display()))
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> DeployResult<Self> {
    let config: DeployConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate the package table
  pub fn validate(&self) -> DeployResult<()> {
    let mut seen = HashSet::new();
    for package in &self.packages {
      if !seen.insert(package.name.as_str()) {
        return Err(ConfigError::DuplicatePackage {
          name: package.name.clone(),
        }
        .into());
      }
    }

    for package in &self.packages {
      if package.path.as_os_str().is_empty() {
        return Err(
          ConfigError::InvalidField {
            package: package.name.clone(),
            field: "path (empty)".to_string(),
          }
          .into(),
        );
      }

      for dependency in &package.dependencies {
        if !seen.contains(dependency.as_str()) {
          return Err(
            ConfigError::UnknownDependency {
              package: package.name.clone(),
              dependency: dependency.clone(),
            }
            .into(),
          );
        }
      }

      let steps = [
        ("install", &package.install),
        ("test", &package.test),
        ("publish", &package.publish),
        ("sync", &package.sync),
      ];
      for (section, list) in steps {
        if list.iter().any(|step| step.args.is_empty()) {
          return Err(
            ConfigError::InvalidField {
              package: package.name.clone(),
              field: format!("{} step (empty args)", section),
            }
            .into(),
          );
        }
      }
    }

    if self.version_command.is_empty() {
      return Err(DeployError::with_help(
        "version_command must not be empty",
        "Set version_command to the arguments that print the declared version, e.g. [\"version\"]",
      ));
    }

    Ok(())
  }

  /// Find a package by name
  pub fn package(&self, name: &str) -> Option<&PackageConfig> {
    self.packages.iter().find(|p| p.name == name)
  }
}

impl PackageConfig {
  /// Tool for this package, falling back to the top-level tool
  pub fn tool<'a>(&'a self, config: &'a DeployConfig) -> &'a str {
    self.tool.as_deref().unwrap_or(&config.tool)
  }
}
