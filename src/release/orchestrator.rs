//! Release orchestrator
//!
//! Drives one release from tag to published artifact:
//!
//! ```text
//! parse tag -> resolve deps -> install each dep locally -> version gate
//!   -> [credentials open] test -> publish -> sync [credentials closed]
//! ```
//!
//! Any failure is returned as `Err` and aborts the remaining sequence. No
//! step is retried and nothing is skipped on a rerun.

use crate::core::config::RegistryKind;
use crate::core::context::{ReleaseContext, ReleaseSettings};
use crate::core::error::DeployResult;
use crate::exec::{Executor, OutcomeHandler, Runner};
use crate::release::credentials::{CredentialStore, with_credentials};
use crate::release::plan::{PlannedStep, ReleasePlan};
use crate::release::tag::ReleaseTag;
use crate::release::version::check_version;

/// What a successful release did
#[derive(Debug, Clone)]
pub struct ReleaseReport {
  pub tag: ReleaseTag,
  /// Dependencies installed locally, in build order
  pub dependencies: Vec<String>,
  pub registry: RegistryKind,
  /// Commands executed, version check included
  pub commands_run: usize,
}

pub struct Orchestrator<'a, E> {
  ctx: &'a ReleaseContext,
  settings: &'a ReleaseSettings,
  runner: Runner<E>,
  store: CredentialStore,
}

impl<'a, E: Executor> Orchestrator<'a, E> {
  pub fn new(ctx: &'a ReleaseContext, settings: &'a ReleaseSettings, executor: E) -> Self {
    let store = CredentialStore::new(&settings.credentials_dir, &ctx.config.registry);
    Self {
      ctx,
      settings,
      runner: Runner::new(executor),
      store,
    }
  }

  /// Run the whole release for the configured tag
  pub fn run(&self) -> DeployResult<ReleaseReport> {
    let tag = ReleaseTag::parse(&self.settings.tag)?;
    tracing::info!(package = %tag.package, version = %tag.version, "Starting release");

    let plan = ReleasePlan::build(self.ctx, &tag)?;
    self.execute(&plan)
  }

  /// Execute a prepared plan
  pub fn execute(&self, plan: &ReleasePlan) -> DeployResult<ReleaseReport> {
    let mut commands_run = 0;

    for dependency in &plan.dependencies {
      tracing::info!(package = %dependency.name, "Installing dependency locally");
      for step in &dependency.steps {
        self.run_step(step)?;
        commands_run += 1;
      }
    }

    let target = &plan.target;
    tracing::info!(package = %target.name, "Checking declared version");
    check_version(&self.runner, &target.version_check, &plan.tag.version)?;
    commands_run += 1;

    let pair = self.settings.credentials.for_kind(target.registry);
    commands_run += with_credentials(&self.store, pair, || {
      let mut count = 0;
      for step in target.scoped_steps() {
        self.run_step(step)?;
        count += 1;
      }
      Ok(count)
    })?;

    tracing::info!(package = %target.name, version = %plan.tag.version, "Release published");

    Ok(ReleaseReport {
      tag: plan.tag.clone(),
      dependencies: plan.dependency_order().into_iter().map(String::from).collect(),
      registry: target.registry,
      commands_run,
    })
  }

  fn run_step(&self, step: &PlannedStep) -> DeployResult<()> {
    self.runner.run(&step.command, OutcomeHandler::from(step.handler))?;
    Ok(())
  }
}
