//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Fake build tool: logs every call (with whether credentials exist), prints
/// `[info] <VERSION>` for `version`, and fails the command named in `fail-on`
const FAKE_TOOL: &str = r#"#!/bin/sh
if [ -f "__CREDENTIALS__" ]; then creds=with-credentials; else creds=no-credentials; fi
echo "$(basename "$PWD"): $* [$creds]" >> "__LOG__"
if [ "$1" = "version" ]; then
  echo "[info] Loading project definition"
  echo "[info] $(cat VERSION)"
  exit 0
fi
if [ -f fail-on ] && [ "$(cat fail-on)" = "$*" ]; then
  echo "[error] $* failed" >&2
  exit 1
fi
echo "[success] $*"
"#;

/// Iglu-shaped package table; `__TOOL__` is replaced with the fake tool path
const DEPLOY_TOML: &str = r#"
tool = '__TOOL__'

[[packages]]
name = "scala-core"
path = "0-common/scala-core"
install = [
  { args = ["+test"], handler = "verbose" },
  { args = ["+publishLocal"] },
]
test = [{ args = ["+test"], handler = "verbose" }]
publish = [{ args = ["+publish"] }]

[[packages]]
name = "schema-ddl"
path = "0-common/schema-ddl"
dependencies = ["scala-core"]
install = [
  { args = ["+test"], handler = "verbose" },
  { args = ["+publishLocal"] },
]
test = [{ args = ["+test"], handler = "verbose" }]
publish = [{ args = ["+publish"] }]
sync = [{ args = ["+bintraySyncMavenCentral"] }]

[[packages]]
name = "igluctl"
path = "0-common/igluctl"
registry = "generic"
dependencies = ["scala-core", "schema-ddl"]
test = [{ args = ["test"], handler = "verbose" }]
publish = [{ args = ["universal:publish"] }]
"#;

pub const PACKAGES: [&str; 3] = ["scala-core", "schema-ddl", "igluctl"];

/// A throwaway workspace with three packages and a fake build tool
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create the workspace with every package declaring `version`
  pub fn new(version: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    for package in PACKAGES {
      let dir = path.join("0-common").join(package);
      std::fs::create_dir_all(&dir)?;
      std::fs::write(dir.join("VERSION"), version)?;
    }

    let ws = Self { _root: root, path };
    let tool = ws.install_fake_tool()?;
    ws.write_config(&DEPLOY_TOML.replace("__TOOL__", &tool.display().to_string()))?;

    Ok(ws)
  }

  /// Replace deploy.toml
  pub fn write_config(&self, content: &str) -> Result<()> {
    std::fs::write(self.path.join("deploy.toml"), content)?;
    Ok(())
  }

  fn install_fake_tool(&self) -> Result<PathBuf> {
    let tool = self.path.join("bin").join("fake-sbt");
    std::fs::create_dir_all(self.path.join("bin"))?;

    let script = FAKE_TOOL
      .replace("__CREDENTIALS__", &self.credentials_file().display().to_string())
      .replace("__LOG__", &self.log_file().display().to_string());
    std::fs::write(&tool, script)?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755))?;
    }

    Ok(tool)
  }

  pub fn credentials_dir(&self) -> PathBuf {
    self.path.join("home").join(".bintray")
  }

  pub fn credentials_file(&self) -> PathBuf {
    self.credentials_dir().join(".credentials")
  }

  pub fn log_file(&self) -> PathBuf {
    self.path.join("invocations.log")
  }

  /// Set the version a package's build declares
  pub fn set_version(&self, package: &str, version: &str) -> Result<()> {
    std::fs::write(self.package_dir(package).join("VERSION"), version)?;
    Ok(())
  }

  /// Make the fake tool fail `args` (space-joined) in `package`
  pub fn fail_on(&self, package: &str, args: &str) -> Result<()> {
    std::fs::write(self.package_dir(package).join("fail-on"), args)?;
    Ok(())
  }

  pub fn package_dir(&self, package: &str) -> PathBuf {
    self.path.join("0-common").join(package)
  }

  /// Every fake tool invocation so far, as `package: args [credential state]`
  pub fn invocations(&self) -> Result<Vec<String>> {
    if !self.log_file().exists() {
      return Ok(Vec::new());
    }
    let log = std::fs::read_to_string(self.log_file())?;
    Ok(log.lines().map(String::from).collect())
  }

  /// Run `deploy-rail release` for `tag` with test credentials
  pub fn release(&self, tag: &str) -> Result<Output> {
    let credentials_dir = self.credentials_dir().display().to_string();
    run_deploy_rail_raw(
      &self.path,
      &[
        "release",
        "--tag",
        tag,
        "--library-user",
        "maven-user",
        "--library-key",
        "maven-key",
        "--generic-user",
        "generic-user",
        "--generic-key",
        "generic-key",
        "--credentials-dir",
        &credentials_dir,
      ],
    )
  }
}

/// Run deploy-rail in `cwd`, returning its output whatever the exit status
pub fn run_deploy_rail_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let deploy_rail_bin = env!("CARGO_BIN_EXE_deploy-rail");

  Command::new(deploy_rail_bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("TRAVIS_TAG")
    .env_remove("TRAVIS_BUILD_DIR")
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run deploy-rail")
}

/// Run deploy-rail in `cwd`, failing unless it exits 0
pub fn run_deploy_rail(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_deploy_rail_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "deploy-rail command failed: deploy-rail {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
