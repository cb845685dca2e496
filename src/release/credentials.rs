//! Scoped registry credentials
//!
//! Credentials exist on disk only while a `CredentialScope` is alive. The
//! scope refuses to open over leftovers from an earlier run and removes its
//! directory when closed or dropped, so every exit path (success, `?` error
//! propagation, panic unwinding) tears it down.

use crate::core::config::RegistryConfig;
use crate::core::context::CredentialPair;
use crate::core::error::{CredentialError, DeployResult, ResultExt};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name inside the credentials directory
pub const CREDENTIALS_FILE: &str = ".credentials";

/// Well-known credential location plus the fixed realm/host fields
#[derive(Debug, Clone)]
pub struct CredentialStore {
  dir: PathBuf,
  realm: String,
  host: String,
}

impl CredentialStore {
  pub fn new(dir: impl Into<PathBuf>, registry: &RegistryConfig) -> Self {
    Self {
      dir: dir.into(),
      realm: registry.realm.clone(),
      host: registry.host.clone(),
    }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn file(&self) -> PathBuf {
    self.dir.join(CREDENTIALS_FILE)
  }

  /// Write credentials and return the guard that removes them.
  ///
  /// # Errors
  /// `CredentialError::AlreadyPresent` if the directory or file exists;
  /// nothing on disk is touched in that case.
  pub fn open(&self, pair: &CredentialPair) -> DeployResult<CredentialScope> {
    if self.file().exists() {
      return Err(CredentialError::AlreadyPresent { path: self.file() }.into());
    }
    if fs::symlink_metadata(self.dir()).is_ok() {
      return Err(CredentialError::AlreadyPresent { path: self.dir().to_path_buf() }.into());
    }

    if let Some(parent) = self.dir.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    match fs::create_dir(&self.dir) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
        return Err(CredentialError::AlreadyPresent { path: self.dir.clone() }.into());
      }
      Err(e) => {
        return Err(e).with_context(|| format!("Failed to create {}", self.dir.display()));
      }
    }

    tracing::info!(path = %self.file().display(), user = %pair.user, "Creating registry credentials");

    // Guard first: a failed write still removes the directory
    let scope = CredentialScope {
      dir: self.dir.clone(),
      closed: false,
    };

    self
      .write_file(pair)
      .with_context(|| format!("Failed to write {}", self.file().display()))?;

    Ok(scope)
  }

  fn write_file(&self, pair: &CredentialPair) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
      use std::os::unix::fs::OpenOptionsExt;
      options.mode(0o600);
    }

    let mut file = options.open(self.file())?;
    write!(
      file,
      "realm = {}\nuser = {}\nhost = {}\npassword = {}\n",
      self.realm, pair.user, self.host, pair.key
    )?;
    file.sync_all()
  }
}

/// Live credentials; removed on `close()` or drop
#[derive(Debug)]
pub struct CredentialScope {
  dir: PathBuf,
  closed: bool,
}

impl CredentialScope {
  /// Remove the credentials, reporting failure
  pub fn close(mut self) -> DeployResult<()> {
    self.closed = true;
    remove_credentials(&self.dir).with_context(|| format!("Failed to delete credentials at {}", self.dir.display()))
  }
}

impl Drop for CredentialScope {
  fn drop(&mut self) {
    if self.closed {
      return;
    }
    if let Err(e) = remove_credentials(&self.dir) {
      tracing::warn!("Failed to delete credentials at {}: {}", self.dir.display(), e);
    }
  }
}

fn remove_credentials(dir: &Path) -> io::Result<()> {
  tracing::info!(path = %dir.display(), "Deleting registry credentials");
  match fs::remove_dir_all(dir) {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    other => other,
  }
}

/// Run `f` with credentials on disk; they are removed whatever `f` returns.
///
/// An error from `f` takes precedence over a teardown error.
pub fn with_credentials<T, F>(store: &CredentialStore, pair: &CredentialPair, f: F) -> DeployResult<T>
where
  F: FnOnce() -> DeployResult<T>,
{
  let scope = store.open(pair)?;
  let result = f();
  let closed = scope.close();

  match result {
    Ok(value) => closed.map(|()| value),
    Err(e) => Err(e),
  }
}
