//! Integration tests for `deploy-rail graph`

use crate::helpers::{TestWorkspace, run_deploy_rail, run_deploy_rail_raw};
use anyhow::Result;

#[test]
fn test_graph_shows_build_order() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;

  let output = run_deploy_rail(&ws.path, &["graph"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Build order (3 packages)"));
  assert!(stdout.contains("igluctl -> scala-core, schema-ddl"));

  Ok(())
}

#[test]
fn test_graph_json_output() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;

  let output = run_deploy_rail(&ws.path, &["graph", "--json"])?;
  let graph: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(graph["order"][0], "scala-core");
  assert_eq!(graph["order"][2], "igluctl");
  assert!(graph["cycles"].as_array().expect("cycles array").is_empty());

  Ok(())
}

#[test]
fn test_graph_reports_cycles() -> Result<()> {
  let ws = TestWorkspace::new("0.5.0")?;
  ws.write_config(
    r#"
[[packages]]
name = "a"
path = "a"
dependencies = ["b"]

[[packages]]
name = "b"
path = "b"
dependencies = ["a"]
"#,
  )?;

  let output = run_deploy_rail_raw(&ws.path, &["graph"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(output.status.code(), Some(1));
  assert!(stdout.contains("a <-> b"), "stdout: {}", stdout);

  Ok(())
}
