//! CLI commands for deploy-rail
//!
//! - **release**: run the full pipeline for a tag
//! - **plan**: show what a release would run, without running it
//! - **graph**: show the package graph in build order and report cycles
//!
//! All commands accept `&ReleaseContext` so deploy.toml is loaded once.

pub mod graph;
pub mod plan;
pub mod release;

pub use graph::run_graph;
pub use plan::run_plan;
pub use release::run_release;
