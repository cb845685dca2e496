//! Integration tests for `deploy-rail plan`

use crate::helpers::{TestWorkspace, run_deploy_rail, run_deploy_rail_raw};
use anyhow::Result;

#[test]
fn test_plan_lists_build_order() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;

  let output = run_deploy_rail(&ws.path, &["plan", "igluctl/0.5.0"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  let core = stdout.find("1. scala-core").expect("scala-core listed");
  let ddl = stdout.find("2. schema-ddl").expect("schema-ddl listed");
  assert!(core < ddl);
  assert!(stdout.contains("Target: igluctl (generic registry)"));
  assert!(stdout.contains("universal:publish  [fail-fast]"));
  assert!(stdout.contains(" test  [verbose]"));

  // Planning never runs the build tool
  assert!(ws.invocations()?.is_empty());

  Ok(())
}

#[test]
fn test_plan_json_output() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;

  let output = run_deploy_rail(&ws.path, &["plan", "igluctl/0.5.0", "--json"])?;
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(plan["tag"]["package"], "igluctl");
  assert_eq!(plan["tag"]["version"], "0.5.0");
  let names: Vec<&str> = plan["dependencies"]
    .as_array()
    .expect("dependencies array")
    .iter()
    .filter_map(|d| d["name"].as_str())
    .collect();
  assert_eq!(names, vec!["scala-core", "schema-ddl"]);
  assert_eq!(plan["target"]["registry"], "generic");
  assert_eq!(plan["target"]["test"][0]["handler"], "verbose");

  Ok(())
}

#[test]
fn test_plan_rejects_malformed_tag() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;

  let output = run_deploy_rail_raw(&ws.path, &["plan", "a/b/c"])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}

#[test]
fn test_missing_config_is_reported() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;
  std::fs::remove_file(ws.path.join("deploy.toml"))?;

  let output = run_deploy_rail_raw(&ws.path, &["plan", "igluctl/0.5.0"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("deploy.toml"), "stderr: {}", stderr);

  Ok(())
}
