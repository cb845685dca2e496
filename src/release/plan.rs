//! Release plan: every command a release will run, in order
//!
//! Built from the tag, the resolved dependency order and the package tables.
//! The orchestrator executes exactly this plan; `deploy-rail plan` prints it.

use crate::core::config::{PackageConfig, RegistryKind, Step, StepHandler};
use crate::core::context::ReleaseContext;
use crate::core::error::{DeployResult, InputError};
use crate::exec::CommandLine;
use crate::release::tag::ReleaseTag;
use serde::Serialize;

/// One command plus how its outcome is handled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
  pub command: CommandLine,
  pub handler: StepHandler,
}

/// Local build + install of one dependency
#[derive(Debug, Clone, Serialize)]
pub struct PackageSteps {
  pub name: String,
  pub steps: Vec<PlannedStep>,
}

/// Gate and publish sequence of the tagged package
#[derive(Debug, Clone, Serialize)]
pub struct TargetSteps {
  pub name: String,
  pub registry: RegistryKind,
  pub version_check: CommandLine,
  pub test: Vec<PlannedStep>,
  pub publish: Vec<PlannedStep>,
  pub sync: Vec<PlannedStep>,
}

impl TargetSteps {
  /// Steps that run while credentials are on disk: test, publish, then sync
  pub fn scoped_steps(&self) -> impl Iterator<Item = &PlannedStep> {
    self.test.iter().chain(&self.publish).chain(&self.sync)
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
  pub tag: ReleaseTag,
  /// Dependencies in build order (target excluded)
  pub dependencies: Vec<PackageSteps>,
  pub target: TargetSteps,
}

impl ReleasePlan {
  /// Resolve the tag's package and lay out every command.
  ///
  /// Fails before anything runs when the package is unknown or its
  /// dependency table is broken.
  pub fn build(ctx: &ReleaseContext, tag: &ReleaseTag) -> DeployResult<Self> {
    let order = ctx.graph.resolve(&tag.package)?;

    let dependencies = order
      .iter()
      .map(|name| {
        let package = lookup(ctx, name)?;
        Ok(PackageSteps {
          name: package.name.clone(),
          steps: planned(ctx, package, &package.install),
        })
      })
      .collect::<DeployResult<Vec<_>>>()?;

    let package = lookup(ctx, &tag.package)?;
    let target = TargetSteps {
      name: package.name.clone(),
      registry: package.registry,
      version_check: command(ctx, package, &ctx.config.version_command),
      test: planned(ctx, package, &package.test),
      publish: planned(ctx, package, &package.publish),
      sync: planned(ctx, package, &package.sync),
    };

    Ok(Self {
      tag: tag.clone(),
      dependencies,
      target,
    })
  }

  /// Names of the dependencies in build order
  pub fn dependency_order(&self) -> Vec<&str> {
    self.dependencies.iter().map(|d| d.name.as_str()).collect()
  }

  /// Total number of commands, version check included
  pub fn command_count(&self) -> usize {
    let local: usize = self.dependencies.iter().map(|d| d.steps.len()).sum();
    local + 1 + self.target.scoped_steps().count()
  }
}

fn lookup<'a>(ctx: &'a ReleaseContext, name: &str) -> DeployResult<&'a PackageConfig> {
  ctx.config.package(name).ok_or_else(|| {
    InputError::UnknownPackage {
      name: name.to_string(),
      available: ctx.graph.packages().to_vec(),
    }
    .into()
  })
}

fn command(ctx: &ReleaseContext, package: &PackageConfig, args: &[String]) -> CommandLine {
  CommandLine::new(package.tool(&ctx.config), ctx.package_dir(&package.path)).args(args.iter().cloned())
}

fn planned(ctx: &ReleaseContext, package: &PackageConfig, steps: &[Step]) -> Vec<PlannedStep> {
  steps
    .iter()
    .map(|step| PlannedStep {
      command: command(ctx, package, &step.args),
      handler: step.handler,
    })
    .collect()
}
