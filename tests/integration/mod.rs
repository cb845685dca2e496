//! Integration tests for deploy-rail
//!
//! Each test builds a throwaway workspace with a deploy.toml and a fake build
//! tool, then runs the real binary against it.

mod helpers;
mod test_graph;
mod test_plan;
#[cfg(unix)]
mod test_release;
