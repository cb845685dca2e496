//! Package dependency graph
//!
//! The graph is operator-maintained data (deploy.toml), never discovered.

pub mod package_graph;

pub use package_graph::PackageGraph;
