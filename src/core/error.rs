//! Error types for deploy-rail with contextual messages and exit codes
//!
//! Every failure in a release is fatal: errors bubble up with `?` to `main`,
//! which prints them and exits non-zero. Nothing below `main` terminates the
//! process, so scoped resources (credentials) are always released first.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for deploy-rail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, malformed tag, unknown package)
  User = 1,
  /// System error (external command, I/O)
  System = 2,
  /// Validation failure (version gate, credential precondition)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for deploy-rail
#[derive(Debug)]
pub enum DeployError {
  /// deploy.toml errors
  Config(ConfigError),

  /// Invocation input errors (tag, package selection)
  Input(InputError),

  /// Dependency resolution errors
  Graph(GraphError),

  /// External command failures
  Command(CommandError),

  /// Version gate failures
  Version(VersionError),

  /// Credential scope precondition violations
  Credentials(CredentialError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl DeployError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    DeployError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    DeployError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Typed errors keep their category (and exit code); I/O errors are
  /// rewrapped as messages so the context is not lost.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      DeployError::Message { message, context, help } => DeployError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      DeployError::Io(err) => DeployError::Message {
        message: ctx_str,
        context: Some(format!("I/O error: {}", err)),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      DeployError::Config(_) => ExitCode::User,
      DeployError::Input(_) => ExitCode::User,
      DeployError::Graph(_) => ExitCode::User,
      DeployError::Command(_) => ExitCode::System,
      DeployError::Version(_) => ExitCode::Validation,
      DeployError::Credentials(_) => ExitCode::Validation,
      DeployError::Io(_) => ExitCode::System,
      DeployError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      DeployError::Config(e) => e.help_message(),
      DeployError::Input(e) => e.help_message(),
      DeployError::Graph(e) => e.help_message(),
      DeployError::Command(e) => e.help_message(),
      DeployError::Version(e) => e.help_message(),
      DeployError::Credentials(e) => e.help_message(),
      DeployError::Message { help, .. } => help.clone(),
      DeployError::Io(_) => None,
    }
  }
}

impl fmt::Display for DeployError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DeployError::Config(e) => write!(f, "{}", e),
      DeployError::Input(e) => write!(f, "{}", e),
      DeployError::Graph(e) => write!(f, "{}", e),
      DeployError::Command(e) => write!(f, "{}", e),
      DeployError::Version(e) => write!(f, "{}", e),
      DeployError::Credentials(e) => write!(f, "{}", e),
      DeployError::Io(e) => write!(f, "I/O error: {}", e),
      DeployError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for DeployError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      DeployError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for DeployError {
  fn from(err: io::Error) -> Self {
    DeployError::Io(err)
  }
}

impl From<toml_edit::de::Error> for DeployError {
  fn from(err: toml_edit::de::Error) -> Self {
    DeployError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for DeployError {
  fn from(err: serde_json::Error) -> Self {
    DeployError::message(format!("JSON error: {}", err))
  }
}

impl From<ConfigError> for DeployError {
  fn from(err: ConfigError) -> Self {
    DeployError::Config(err)
  }
}

impl From<InputError> for DeployError {
  fn from(err: InputError) -> Self {
    DeployError::Input(err)
  }
}

impl From<GraphError> for DeployError {
  fn from(err: GraphError) -> Self {
    DeployError::Graph(err)
  }
}

impl From<CommandError> for DeployError {
  fn from(err: CommandError) -> Self {
    DeployError::Command(err)
  }
}

impl From<VersionError> for DeployError {
  fn from(err: VersionError) -> Self {
    DeployError::Version(err)
  }
}

impl From<CredentialError> for DeployError {
  fn from(err: CredentialError) -> Self {
    DeployError::Credentials(err)
  }
}

/// deploy.toml errors
#[derive(Debug)]
pub enum ConfigError {
  /// deploy.toml not found
  NotFound { workspace_root: PathBuf },

  /// Same package declared twice
  DuplicatePackage { name: String },

  /// Dependency names a package that is not declared
  UnknownDependency { package: String, dependency: String },

  /// Field present but unusable (empty path, empty step args)
  InvalidField { package: String, field: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Create deploy.toml in the workspace root or pass --config <path>.".to_string())
      }
      ConfigError::DuplicatePackage { .. } => Some("Package names must be unique in deploy.toml.".to_string()),
      ConfigError::UnknownDependency { dependency, .. } => Some(format!(
        "Add a [[packages]] entry for '{}' or remove it from the dependency list.",
        dependency
      )),
      ConfigError::InvalidField { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { workspace_root } => {
        write!(
          f,
          "No deploy-rail configuration found.\nExpected file: {}/deploy.toml",
          workspace_root.display()
        )
      }
      ConfigError::DuplicatePackage { name } => {
        write!(f, "Package '{}' is declared more than once", name)
      }
      ConfigError::UnknownDependency { package, dependency } => {
        write!(f, "Package '{}' depends on undeclared package '{}'", package, dependency)
      }
      ConfigError::InvalidField { package, field } => {
        write!(f, "Package '{}' has an invalid {}", package, field)
      }
    }
  }
}

/// Invocation input errors
#[derive(Debug)]
pub enum InputError {
  /// Tag is not `<package>/<version>`
  MalformedTag { tag: String },

  /// Tag names a package that is not in the graph
  UnknownPackage { name: String, available: Vec<String> },
}

impl InputError {
  fn help_message(&self) -> Option<String> {
    match self {
      InputError::MalformedTag { .. } => Some("Tags must have the form project-name/x.x.x".to_string()),
      InputError::UnknownPackage { available, .. } => Some(format!(
        "Known packages: {}. New packages must be added to deploy.toml.",
        available.join(", ")
      )),
    }
  }
}

impl fmt::Display for InputError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InputError::MalformedTag { tag } => write!(f, "Tag '{}' has unknown format", tag),
      InputError::UnknownPackage { name, .. } => write!(f, "'{}' is an unknown package", name),
    }
  }
}

/// Dependency resolution errors
#[derive(Debug)]
pub enum GraphError {
  /// Dependency lookup failed while expanding the closure
  UnknownDependency { package: String, dependency: String },

  /// Expansion went deeper than the graph has packages (cycle)
  RecursionLimit { limit: usize, trail: Vec<String> },
}

impl GraphError {
  fn help_message(&self) -> Option<String> {
    match self {
      GraphError::UnknownDependency { .. } => Some("The package table in deploy.toml is stale.".to_string()),
      GraphError::RecursionLimit { .. } => {
        Some("Run `deploy-rail graph` to list dependency cycles and break them in deploy.toml.".to_string())
      }
    }
  }
}

impl fmt::Display for GraphError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GraphError::UnknownDependency { package, dependency } => {
        write!(f, "Package '{}' depends on unknown package '{}'", package, dependency)
      }
      GraphError::RecursionLimit { limit, trail } => {
        write!(
          f,
          "Dependency expansion exceeded depth {} (cyclic graph?): {}",
          limit,
          trail.join(" -> ")
        )
      }
    }
  }
}

/// External command failures
#[derive(Debug)]
pub enum CommandError {
  /// Process ran and exited unsuccessfully
  Failed {
    command: String,
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// Process could not be started
  LaunchFailed { command: String, reason: String },
}

impl CommandError {
  fn help_message(&self) -> Option<String> {
    match self {
      CommandError::LaunchFailed { .. } => Some("Check that the build tool is installed and on PATH.".to_string()),
      CommandError::Failed { .. } => None,
    }
  }
}

impl fmt::Display for CommandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandError::Failed {
        command,
        exit_code,
        stdout,
        stderr,
      } => {
        match exit_code {
          Some(code) => write!(f, "Process has been failed: {} (exit code {})", command, code)?,
          None => write!(f, "Process has been failed: {} (terminated by signal)", command)?,
        }
        if !stdout.trim().is_empty() {
          write!(f, "\n{}", stdout.trim_end())?;
        }
        if !stderr.trim().is_empty() {
          write!(f, "\n{}", stderr.trim_end())?;
        }
        Ok(())
      }
      CommandError::LaunchFailed { command, reason } => {
        write!(f, "Failed to start {}: {}", command, reason)
      }
    }
  }
}

/// Version gate failures
#[derive(Debug)]
pub enum VersionError {
  /// Declared version differs from the tag
  Mismatch { tag_version: String, declared: String },

  /// No version line in the build tool output
  NotFound { output: String },
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::Mismatch { .. } => {
        Some("Bump the version in the build definition or re-tag with the declared version.".to_string())
      }
      VersionError::NotFound { .. } => None,
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::Mismatch { tag_version, declared } => write!(
        f,
        "Version extracted from tag [{}] doesn't conform declared in build [{}]",
        tag_version, declared
      ),
      VersionError::NotFound { output } => write!(f, "Cannot find version in build output:\n{}", output),
    }
  }
}

/// Credential scope errors
#[derive(Debug)]
pub enum CredentialError {
  /// Credentials (or their directory) left behind by an earlier run
  AlreadyPresent { path: PathBuf },
}

impl CredentialError {
  fn help_message(&self) -> Option<String> {
    match self {
      CredentialError::AlreadyPresent { path } => Some(format!(
        "A previous run did not clean up. Inspect {} and remove it manually if it is safe.",
        path.display()
      )),
    }
  }
}

impl fmt::Display for CredentialError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CredentialError::AlreadyPresent { path } => write!(
        f,
        "Registry credentials already exist at {}. They should be deleted after each use",
        path.display()
      ),
    }
  }
}

/// Result type alias for deploy-rail
pub type DeployResult<T> = Result<T, DeployError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> DeployResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> DeployResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<DeployError>,
{
  fn context(self, ctx: impl Into<String>) -> DeployResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> DeployResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &DeployError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
