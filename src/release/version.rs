//! Version gate: the tag must match what the build declares

use crate::core::error::{DeployResult, VersionError};
use crate::exec::{CommandLine, Executor, Runner};

/// Run the build tool's version command in the package directory and compare
/// the declared version with the tag's, by exact string equality.
///
/// Returns the declared version on success.
pub fn check_version<E: Executor>(runner: &Runner<E>, command: &CommandLine, expected: &str) -> DeployResult<String> {
  let declared = runner.declared_version(command)?;

  if declared != expected {
    return Err(
      VersionError::Mismatch {
        tag_version: expected.to_string(),
        declared,
      }
      .into(),
    );
  }

  tracing::info!(version = %declared, "Declared version matches tag");
  Ok(declared)
}
