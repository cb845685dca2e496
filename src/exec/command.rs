//! External command execution
//!
//! Build and publish steps run as opaque system processes. The executor never
//! fails: a process that cannot be started still yields a `CommandOutcome`
//! (with `launched == false`) so the caller's handler decides what to do.

use serde::Serialize;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

/// Program, arguments and working directory of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLine {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
}

impl CommandLine {
  pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
    }
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }
}

impl fmt::Display for CommandLine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
  /// `None` when the process was never started or was killed by a signal
  pub exit_code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
  /// False when the process could not be started at all
  pub launched: bool,
  /// Output was cut to the capture limit (exit code is unaffected)
  pub truncated: bool,
}

impl CommandOutcome {
  /// Process ran and exited with `code`
  #[cfg(test)]
  pub fn exited(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
    Self {
      exit_code: Some(code),
      stdout: stdout.into(),
      stderr: stderr.into(),
      launched: true,
      truncated: false,
    }
  }

  /// Process could not be started
  pub fn launch_failure(reason: impl Into<String>) -> Self {
    Self {
      exit_code: None,
      stdout: String::new(),
      stderr: reason.into(),
      launched: false,
      truncated: false,
    }
  }

  pub fn success(&self) -> bool {
    self.launched && self.exit_code == Some(0)
  }
}

/// Runs external commands to completion
pub trait Executor {
  fn execute(&self, command: &CommandLine) -> CommandOutcome;
}

impl<E: Executor + ?Sized> Executor for &E {
  fn execute(&self, command: &CommandLine) -> CommandOutcome {
    (**self).execute(command)
  }
}

/// Executor backed by `std::process::Command`
///
/// stdout and stderr are drained on separate threads so neither pipe can fill
/// up and stall the child. At most `max_output_bytes` of each stream is kept
/// (the tail, where build tools print their errors).
pub struct SystemExecutor {
  max_output_bytes: usize,
}

impl SystemExecutor {
  pub fn new(max_output_bytes: usize) -> Self {
    Self { max_output_bytes }
  }

  fn spawn(&self, command: &CommandLine) -> io::Result<CommandOutcome> {
    let mut child = Command::new(&command.program)
      .args(&command.args)
      .current_dir(&command.cwd)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let limit = self.max_output_bytes;

    let (stdout, stderr) = thread::scope(|scope| {
      let out = scope.spawn(move || stdout.map(|r| capture_tail(r, limit)).unwrap_or_default());
      let err = scope.spawn(move || stderr.map(|r| capture_tail(r, limit)).unwrap_or_default());
      (
        out.join().unwrap_or_default(),
        err.join().unwrap_or_default(),
      )
    });

    let status = child.wait()?;

    Ok(CommandOutcome {
      exit_code: status.code(),
      truncated: stdout.discarded > 0 || stderr.discarded > 0,
      stdout: stdout.into_text(),
      stderr: stderr.into_text(),
      launched: true,
    })
  }
}

impl Executor for SystemExecutor {
  fn execute(&self, command: &CommandLine) -> CommandOutcome {
    if !command.cwd.is_dir() {
      return CommandOutcome::launch_failure(format!(
        "working directory {} does not exist",
        command.cwd.display()
      ));
    }

    match self.spawn(command) {
      Ok(outcome) => outcome,
      Err(err) => CommandOutcome::launch_failure(err.to_string()),
    }
  }
}

/// Tail of a stream plus how much was dropped from its front
#[derive(Debug, Default)]
struct Captured {
  bytes: Vec<u8>,
  discarded: usize,
}

impl Captured {
  fn into_text(self) -> String {
    let text = String::from_utf8_lossy(&self.bytes).into_owned();
    if self.discarded > 0 {
      format!("[... {} earlier bytes discarded ...]\n{}", self.discarded, text)
    } else {
      text
    }
  }
}

/// Read a stream to EOF, keeping only the last `limit` bytes
fn capture_tail<R: Read>(mut reader: R, limit: usize) -> Captured {
  let mut chunk = [0u8; 8192];
  let mut captured = Captured::default();
  // Trim in batches to keep drain cost amortized
  let high_water = limit.saturating_mul(2).max(chunk.len());

  loop {
    match reader.read(&mut chunk) {
      Ok(0) => break,
      Ok(n) => {
        captured.bytes.extend_from_slice(&chunk[..n]);
        if captured.bytes.len() > high_water {
          trim_front(&mut captured, limit);
        }
      }
      Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(e) => {
        tracing::warn!("Stopped reading command output: {}", e);
        break;
      }
    }
  }

  trim_front(&mut captured, limit);
  captured
}

fn trim_front(captured: &mut Captured, limit: usize) {
  if captured.bytes.len() > limit {
    let excess = captured.bytes.len() - limit;
    captured.bytes.drain(..excess);
    captured.discarded += excess;
  }
}
