//! Outcome handlers: what to do with a finished command
//!
//! A closed set selected per call site. Every handler treats a failed or
//! unlaunchable process as fatal; they differ in what they do on success.

use crate::core::config::StepHandler;
use crate::core::error::{CommandError, DeployResult, VersionError};
use crate::exec::command::{CommandLine, CommandOutcome, Executor};
use regex::Regex;
use std::sync::OnceLock;

/// Per-call-site handling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeHandler {
  /// Silent on success
  FailFast,
  /// Prints captured stdout on success
  Verbose,
  /// Returns the first `[info] x.y.z` version found in stdout
  ExtractVersion,
}

impl From<StepHandler> for OutcomeHandler {
  fn from(handler: StepHandler) -> Self {
    match handler {
      StepHandler::FailFast => OutcomeHandler::FailFast,
      StepHandler::Verbose => OutcomeHandler::Verbose,
    }
  }
}

/// Value produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
  Completed,
  Version(String),
}

impl OutcomeHandler {
  /// Apply this handler to a finished command
  pub fn handle(self, command: &CommandLine, outcome: CommandOutcome) -> DeployResult<Handled> {
    ensure_success(command, &outcome)?;

    match self {
      OutcomeHandler::FailFast => Ok(Handled::Completed),
      OutcomeHandler::Verbose => {
        if let Some(stdout) = verbose_output(&outcome.stdout) {
          println!("{}", stdout);
        }
        Ok(Handled::Completed)
      }
      OutcomeHandler::ExtractVersion => {
        if !outcome.stderr.trim().is_empty() {
          tracing::info!("{}", outcome.stderr.trim_end());
        }
        match extract_version(&outcome.stdout) {
          Some(version) => Ok(Handled::Version(version)),
          None => Err(VersionError::NotFound { output: outcome.stdout }.into()),
        }
      }
    }
  }
}

/// Stdout worth echoing for a verbose step; `None` when it is blank
fn verbose_output(stdout: &str) -> Option<&str> {
  let trimmed = stdout.trim_end();
  (!trimmed.trim_start().is_empty()).then_some(trimmed)
}

/// Launch failure and non-zero exit are fatal for every handler
fn ensure_success(command: &CommandLine, outcome: &CommandOutcome) -> DeployResult<()> {
  if !outcome.launched {
    return Err(
      CommandError::LaunchFailed {
        command: command.to_string(),
        reason: outcome.stderr.clone(),
      }
      .into(),
    );
  }

  if !outcome.success() {
    return Err(
      CommandError::Failed {
        command: command.to_string(),
        exit_code: outcome.exit_code,
        stdout: outcome.stdout.clone(),
        stderr: outcome.stderr.clone(),
      }
      .into(),
    );
  }

  Ok(())
}

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_re() -> &'static Regex {
  VERSION_RE.get_or_init(|| Regex::new(r"\[info\]\s*(\d+\.\d+\.\d+.*)$").expect("version pattern is valid"))
}

/// First version reported on an `[info]` line.
///
/// Everything after the dotted triple is part of the version
/// (`1.2.3-M1` stays `1.2.3-M1`); only trailing whitespace is dropped.
pub fn extract_version(stdout: &str) -> Option<String> {
  stdout.lines().find_map(|line| {
    version_re()
      .captures(line.trim_end())
      .and_then(|caps| caps.get(1))
      .map(|m| m.as_str().trim_end().to_string())
  })
}

/// Runs commands through an executor and dispatches to a handler
pub struct Runner<E> {
  executor: E,
}

impl<E: Executor> Runner<E> {
  pub fn new(executor: E) -> Self {
    Self { executor }
  }

  /// Run one command to completion and apply `handler`
  pub fn run(&self, command: &CommandLine, handler: OutcomeHandler) -> DeployResult<Handled> {
    tracing::info!("Executing [{}]", command);
    let outcome = self.executor.execute(command);
    tracing::debug!(
      exit_code = ?outcome.exit_code,
      stdout_bytes = outcome.stdout.len(),
      stderr_bytes = outcome.stderr.len(),
      truncated = outcome.truncated,
      "Finished [{}]",
      command
    );
    handler.handle(command, outcome)
  }

  /// Run the build tool's version command and return the declared version
  pub fn declared_version(&self, command: &CommandLine) -> DeployResult<String> {
    match self.run(command, OutcomeHandler::ExtractVersion)? {
      Handled::Version(version) => Ok(version),
      Handled::Completed => Err(VersionError::NotFound { output: String::new() }.into()),
    }
  }
}
