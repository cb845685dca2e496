//! Release tag parsing (`<package>/<version>`)

use crate::core::error::{DeployError, InputError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Package + version selected for release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseTag {
  pub package: String,
  pub version: String,
}

impl ReleaseTag {
  /// Parse `<package>/<version>`; exactly one separator, both halves non-empty
  pub fn parse(tag: &str) -> Result<Self, DeployError> {
    let malformed = || DeployError::Input(InputError::MalformedTag { tag: tag.to_string() });

    let mut parts = tag.split('/');
    let (Some(package), Some(version), None) = (parts.next(), parts.next(), parts.next()) else {
      return Err(malformed());
    };

    if package.is_empty() || version.is_empty() {
      return Err(malformed());
    }

    Ok(Self {
      package: package.to_string(),
      version: version.to_string(),
    })
  }
}

impl FromStr for ReleaseTag {
  type Err = DeployError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl fmt::Display for ReleaseTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.package, self.version)
  }
}
