//! `deploy-rail release` - build dependencies, gate the version, publish

use crate::core::context::{ReleaseContext, ReleaseSettings};
use crate::core::error::DeployResult;
use crate::exec::SystemExecutor;
use crate::release::{Orchestrator, ReleaseReport};

/// Run the release for `settings.tag` against the real build tool
pub fn run_release(ctx: &ReleaseContext, settings: &ReleaseSettings) -> DeployResult<()> {
  let executor = SystemExecutor::new(settings.max_output_bytes);
  let report = Orchestrator::new(ctx, settings, executor).run()?;
  print_report(&report);
  Ok(())
}

fn print_report(report: &ReleaseReport) {
  println!();
  println!("✅ Released {} {}", report.tag.package, report.tag.version);
  if report.dependencies.is_empty() {
    println!("   No local dependencies");
  } else {
    println!("   Installed locally: {}", report.dependencies.join(", "));
  }
  println!("   Registry: {}", report.registry);
  println!("   Commands run: {}", report.commands_run);
}
