//! `deploy-rail plan` - print the commands a release would run

use crate::core::context::ReleaseContext;
use crate::core::error::DeployResult;
use crate::release::{PlannedStep, ReleasePlan, ReleaseTag};

/// Print the release plan for `tag` without executing anything
pub fn run_plan(ctx: &ReleaseContext, tag: &str, json: bool) -> DeployResult<()> {
  let tag = ReleaseTag::parse(tag)?;
  let plan = ReleasePlan::build(ctx, &tag)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&plan)?);
  } else {
    print_plan(&plan);
  }

  Ok(())
}

fn print_plan(plan: &ReleasePlan) {
  println!("📦 Release plan for {}", plan.tag);
  println!();

  if plan.dependencies.is_empty() {
    println!("  No dependencies to install locally");
  } else {
    println!("  Local install ({} packages):", plan.dependencies.len());
    for (i, dependency) in plan.dependencies.iter().enumerate() {
      println!("    {}. {}", i + 1, dependency.name);
      for step in &dependency.steps {
        print_step(step);
      }
    }
  }
  println!();

  let target = &plan.target;
  println!("  Target: {} ({} registry)", target.name, target.registry);
  println!("    🔍 {}  (expects {})", target.version_check, plan.tag.version);
  println!("    🔑 credentials open");
  for step in target.scoped_steps() {
    print_step(step);
  }
  println!("    🔒 credentials closed");
  println!();
  println!("  {} commands total", plan.command_count());
}

fn print_step(step: &PlannedStep) {
  println!("       $ {}  [{}]", step.command, step.handler);
}
