//! Integration tests for `deploy-rail release`

use crate::helpers::TestWorkspace;
use anyhow::Result;

#[test]
fn test_release_builds_dependencies_then_publishes() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;

  let output = ws.release("igluctl/0.5.0")?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(
    output.status.success(),
    "release failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );

  assert_eq!(
    ws.invocations()?,
    vec![
      "scala-core: +test [no-credentials]",
      "scala-core: +publishLocal [no-credentials]",
      "schema-ddl: +test [no-credentials]",
      "schema-ddl: +publishLocal [no-credentials]",
      "igluctl: version -Dsbt.log.noformat=true [no-credentials]",
      "igluctl: test [with-credentials]",
      "igluctl: universal:publish [with-credentials]",
    ]
  );
  assert!(!ws.credentials_dir().exists());

  // Verbose steps echo the tool's stdout
  assert!(stdout.contains("[success] +test"));
  assert!(stdout.contains("Released igluctl 0.5.0"));

  Ok(())
}

#[test]
fn test_dependency_failure_never_publishes() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;
  ws.fail_on("schema-ddl", "+publishLocal")?;

  let output = ws.release("igluctl/0.5.0")?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr.contains("+publishLocal failed"), "stderr: {}", stderr);

  let invocations = ws.invocations()?;
  assert_eq!(invocations.last().map(String::as_str), Some("schema-ddl: +publishLocal [no-credentials]"));
  assert!(invocations.iter().all(|line| !line.starts_with("igluctl")));
  assert!(!ws.credentials_dir().exists());

  Ok(())
}

#[test]
fn test_version_mismatch_stops_before_credentials() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;
  ws.set_version("igluctl", "0.4.0")?;

  let output = ws.release("igluctl/0.5.0")?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr.contains("[0.5.0]"), "stderr: {}", stderr);
  assert!(stderr.contains("[0.4.0]"), "stderr: {}", stderr);

  let invocations = ws.invocations()?;
  assert!(invocations.iter().all(|line| line.ends_with("[no-credentials]")));
  assert!(!invocations.iter().any(|line| line.contains("universal:publish")));
  assert!(!ws.credentials_dir().exists());

  Ok(())
}

#[test]
fn test_publish_failure_removes_credentials() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;
  ws.fail_on("igluctl", "universal:publish")?;

  let output = ws.release("igluctl/0.5.0")?;

  assert_eq!(output.status.code(), Some(2));
  let invocations = ws.invocations()?;
  assert_eq!(
    invocations.last().map(String::as_str),
    Some("igluctl: universal:publish [with-credentials]")
  );
  assert!(!ws.credentials_dir().exists());

  Ok(())
}

#[test]
fn test_library_release_syncs_under_credentials() -> Result<()> {
  let ws = TestWorkspace::new("0.9.0")?;

  let output = ws.release("schema-ddl/0.9.0")?;
  assert!(output.status.success());

  let invocations = ws.invocations()?;
  assert_eq!(
    &invocations[invocations.len() - 3..],
    &[
      "schema-ddl: +test [with-credentials]",
      "schema-ddl: +publish [with-credentials]",
      "schema-ddl: +bintraySyncMavenCentral [with-credentials]",
    ]
  );
  assert!(invocations.iter().all(|line| !line.starts_with("igluctl")));

  Ok(())
}

#[test]
fn test_stale_credentials_abort_and_are_kept() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;
  std::fs::create_dir_all(ws.credentials_dir())?;
  std::fs::write(ws.credentials_file(), "user = from-a-crashed-run\n")?;

  let output = ws.release("igluctl/0.5.0")?;

  assert_eq!(output.status.code(), Some(3));
  assert_eq!(
    std::fs::read_to_string(ws.credentials_file())?,
    "user = from-a-crashed-run\n"
  );
  assert!(!ws.invocations()?.iter().any(|line| line.contains("universal:publish")));

  Ok(())
}

#[test]
fn test_malformed_tag_runs_nothing() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;

  let output = ws.release("igluctl")?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("igluctl"), "stderr: {}", stderr);
  assert!(ws.invocations()?.is_empty());

  Ok(())
}

#[test]
fn test_unknown_package_runs_nothing() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;

  let output = ws.release("referer-parser/1.0.0")?;

  assert_eq!(output.status.code(), Some(1));
  assert!(ws.invocations()?.is_empty());

  Ok(())
}
