//! `deploy-rail graph` - show the package graph and report cycles

use crate::core::context::ReleaseContext;
use crate::core::error::{DeployError, DeployResult};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct GraphEntry<'a> {
  name: &'a str,
  dependencies: &'a [String],
}

#[derive(Debug, Serialize)]
struct GraphReport<'a> {
  /// Build order; empty when cycles exist
  order: Vec<String>,
  packages: Vec<GraphEntry<'a>>,
  cycles: Vec<Vec<String>>,
}

/// Print every package with its direct dependencies, in build order.
///
/// Fails when the graph has a cycle, after listing the cycles.
pub fn run_graph(ctx: &ReleaseContext, json: bool) -> DeployResult<()> {
  let graph = &ctx.graph;
  let cycles = graph.find_cycles();
  let order = if cycles.is_empty() {
    graph.topological_order()?
  } else {
    Vec::new()
  };

  let packages = graph
    .packages()
    .iter()
    .map(|name| {
      Ok(GraphEntry {
        name,
        dependencies: graph.direct_dependencies(name)?,
      })
    })
    .collect::<DeployResult<Vec<_>>>()?;

  let report = GraphReport {
    order,
    packages,
    cycles,
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_graph(&report);
  }

  if !report.cycles.is_empty() {
    return Err(DeployError::with_help(
      format!("Package graph has {} dependency cycle(s)", report.cycles.len()),
      "Edit the dependencies lists in deploy.toml so no package depends on itself",
    ));
  }

  Ok(())
}

fn print_graph(report: &GraphReport<'_>) {
  if report.cycles.is_empty() {
    println!("📊 Build order ({} packages):", report.order.len());
    for name in &report.order {
      let deps = report
        .packages
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.dependencies)
        .unwrap_or_default();
      if deps.is_empty() {
        println!("  {}", name);
      } else {
        println!("  {} -> {}", name, deps.join(", "));
      }
    }
  } else {
    println!("❌ Dependency cycles:");
    for cycle in &report.cycles {
      println!("  {}", cycle.join(" <-> "));
    }
  }
}
