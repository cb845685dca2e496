//! External command runner
//!
//! - **command**: command lines, outcomes, and the `Executor` boundary
//! - **handler**: outcome handlers (fail-fast, verbose, version extraction)

pub mod command;
pub mod handler;

pub use command::{CommandLine, Executor, SystemExecutor};
pub use handler::{OutcomeHandler, Runner};
