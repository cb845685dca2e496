//! Static package dependency graph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: Packages declared in deploy.toml
//! - **Declared order**: Each package keeps its dependency list in the order the
//!   operator wrote it; closure expansion follows that order
//! - **Algorithms**: Closure expansion (build order), toposort, SCC

use crate::core::config::DeployConfig;
use crate::core::error::{ConfigError, DeployError, DeployResult, GraphError, InputError};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Package dependency graph.
///
/// Read-only once built. Resolution uses the declared dependency lists;
/// the petgraph copy backs whole-graph queries (toposort, cycles).
pub struct PackageGraph {
  /// Edges: dependent → dependency
  graph: DiGraph<String, ()>,

  /// Index: package name → node index
  name_to_node: HashMap<String, NodeIndex>,

  /// Direct dependencies in declared order
  dependencies: HashMap<String, Vec<String>>,

  /// Package names in declaration order
  names: Vec<String>,
}

impl PackageGraph {
  /// Build from `(package, direct dependencies)` entries.
  ///
  /// Dependencies that name undeclared packages are kept in the declared list
  /// (resolution reports them) but get no edge.
  pub fn new<I, S>(entries: I) -> DeployResult<Self>
  where
    I: IntoIterator<Item = (S, Vec<S>)>,
    S: Into<String>,
  {
    let mut graph = DiGraph::new();
    let mut name_to_node = HashMap::new();
    let mut dependencies = HashMap::new();
    let mut names = Vec::new();

    for (name, deps) in entries {
      let name = name.into();
      if name_to_node.contains_key(&name) {
        return Err(ConfigError::DuplicatePackage { name }.into());
      }

      let idx = graph.add_node(name.clone());
      name_to_node.insert(name.clone(), idx);
      dependencies.insert(name.clone(), deps.into_iter().map(Into::into).collect::<Vec<String>>());
      names.push(name);
    }

    for name in &names {
      let from = name_to_node[name];
      for dep in &dependencies[name] {
        if let Some(&to) = name_to_node.get(dep) {
          graph.add_edge(from, to, ());
        }
      }
    }

    Ok(Self {
      graph,
      name_to_node,
      dependencies,
      names,
    })
  }

  /// Build from the `[[packages]]` table
  pub fn from_config(config: &DeployConfig) -> DeployResult<Self> {
    Self::new(
      config
        .packages
        .iter()
        .map(|p| (p.name.clone(), p.dependencies.clone())),
    )
  }

  /// Package names in declaration order
  pub fn packages(&self) -> &[String] {
    &self.names
  }

  /// Check if a package is declared
  pub fn contains(&self, name: &str) -> bool {
    self.name_to_node.contains_key(name)
  }

  /// Direct dependencies of a package, in declared order
  pub fn direct_dependencies(&self, name: &str) -> DeployResult<&[String]> {
    self
      .dependencies
      .get(name)
      .map(Vec::as_slice)
      .ok_or_else(|| self.unknown_package(name))
  }

  /// Dependency-first build order for `target`, excluding `target` itself.
  ///
  /// For each direct dependency `d` (declared order) the closure is
  /// `resolve(d)` followed by `d`; duplicates keep their first position.
  /// A dependency that was already emitted has had its whole closure emitted
  /// before it, so it is not expanded again.
  ///
  /// # Errors
  /// - unknown `target`
  /// - a dependency missing from the graph
  /// - expansion deeper than the number of packages (only possible with a cycle)
  pub fn resolve(&self, target: &str) -> DeployResult<Vec<String>> {
    if !self.contains(target) {
      return Err(self.unknown_package(target));
    }

    let mut order = Vec::new();
    let mut emitted = HashSet::new();
    let mut trail = vec![target.to_string()];
    self.expand(target, &mut trail, &mut emitted, &mut order)?;
    Ok(order)
  }

  fn expand(
    &self,
    package: &str,
    trail: &mut Vec<String>,
    emitted: &mut HashSet<String>,
    order: &mut Vec<String>,
  ) -> DeployResult<()> {
    let deps = self.dependencies.get(package).ok_or_else(|| GraphError::UnknownDependency {
      package: trail
        .iter()
        .rev()
        .nth(1)
        .cloned()
        .unwrap_or_else(|| package.to_string()),
      dependency: package.to_string(),
    })?;

    for dep in deps {
      if emitted.contains(dep) {
        continue;
      }

      // An acyclic path visits each package at most once
      if trail.len() > self.names.len() {
        return Err(
          GraphError::RecursionLimit {
            limit: self.names.len(),
            trail: trail.clone(),
          }
          .into(),
        );
      }

      trail.push(dep.clone());
      self.expand(dep, trail, emitted, order)?;
      trail.pop();

      if emitted.insert(dep.clone()) {
        order.push(dep.clone());
      }
    }

    Ok(())
  }

  /// Topological order of every package (dependencies first).
  ///
  /// # Errors
  /// Returns error if the graph contains a cycle.
  pub fn topological_order(&self) -> DeployResult<Vec<String>> {
    let sorted = algo::toposort(&self.graph, None).map_err(|cycle| {
      let name = &self.graph[cycle.node_id()];
      DeployError::with_help(
        format!("Dependency cycle detected involving package '{}'", name),
        "Run `deploy-rail graph` to list all cycles.",
      )
    })?;

    // Edges point dependent → dependency, so reverse for dependencies first
    Ok(sorted.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
  }

  /// Detect dependency cycles using Tarjan's SCC algorithm.
  ///
  /// Returns components with more than one package, plus self-dependencies.
  pub fn find_cycles(&self) -> Vec<Vec<String>> {
    algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| {
        component.len() > 1 || component.iter().any(|&idx| self.graph.contains_edge(idx, idx))
      })
      .map(|component| {
        let mut names: Vec<String> = component.into_iter().map(|idx| self.graph[idx].clone()).collect();
        names.sort();
        names
      })
      .collect()
  }

  fn unknown_package(&self, name: &str) -> DeployError {
    InputError::UnknownPackage {
      name: name.to_string(),
      available: self.names.clone(),
    }
    .into()
  }
}
