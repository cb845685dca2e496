//! Release pipeline
//!
//! - **tag**: `<package>/<version>` parsing
//! - **plan**: the ordered commands of one release
//! - **version**: gate comparing the tag with the build's declared version
//! - **credentials**: registry credentials that exist only while publishing
//! - **orchestrator**: runs a plan end to end

pub mod credentials;
pub mod orchestrator;
pub mod plan;
pub mod tag;
pub mod version;

pub use orchestrator::{Orchestrator, ReleaseReport};
pub use plan::{PlannedStep, ReleasePlan};
pub use tag::ReleaseTag;
