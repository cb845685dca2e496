//! Core building blocks shared by every command
//!
//! - **config**: deploy.toml parsing and validation
//! - **context**: run settings and the release context built once in `main`
//! - **error**: error types with contextual help messages and exit codes

pub mod config;
pub mod context;
pub mod error;
