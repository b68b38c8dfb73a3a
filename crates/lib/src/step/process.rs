//! Blocking process execution for tool steps.
//!
//! aapt and the image scaler are run to completion before the next step
//! starts, so there is no async runtime here.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use super::types::StepError;

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl ProcessOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Runs external tools with a fixed working directory.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
  cwd: std::path::PathBuf,
}

impl ProcessExecutor {
  pub fn new(cwd: impl Into<std::path::PathBuf>) -> Self {
    Self { cwd: cwd.into() }
  }

  /// Run `program` with `args`, returning whatever it produced.
  ///
  /// Only a failure to start the process is an error; a non-zero exit is
  /// reported through [`ProcessOutput::code`].
  pub fn execute(&self, program: &str, args: &[String]) -> Result<ProcessOutput, StepError> {
    let command = render_command(program, args);
    debug!(command = %command, cwd = ?self.cwd, "spawning process");

    let output = Command::new(program)
      .args(args)
      .current_dir(&self.cwd)
      .output()
      .map_err(|source| StepError::Spawn {
        command: command.clone(),
        source,
      })?;

    let result = ProcessOutput {
      code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if !result.stderr.is_empty() {
      debug!(stderr = %result.stderr, "command stderr");
    }
    if !result.stdout.is_empty() {
      debug!(stdout = %result.stdout, "command stdout");
    }

    Ok(result)
  }

  /// Run `program` and fail unless it exits with status 0.
  ///
  /// Returns the trimmed stdout on success.
  pub fn run_checked(&self, program: &str, args: &[String]) -> Result<String, StepError> {
    info!(command = %render_command(program, args), "executing command");
    let output = self.execute(program, args)?;
    if !output.success() {
      return Err(StepError::CmdFailed {
        command: render_command(program, args),
        code: output.code,
        stderr: output.stderr,
      });
    }
    Ok(output.stdout)
  }
}

/// Render a command line the way a shell user would type it.
pub fn render_command(program: &str, args: &[String]) -> String {
  std::iter::once(program)
    .chain(args.iter().map(String::as_str))
    .map(quote)
    .collect::<Vec<_>>()
    .join(" ")
}

/// Render a path for a step description.
pub(crate) fn display_path(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}

fn quote(arg: &str) -> String {
  if !arg.is_empty() && !arg.contains([' ', '\t', '"', '\'']) {
    arg.to_string()
  } else {
    format!("'{}'", arg.replace('\'', r"'\''"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{echo_msg, shell_cmd};
  use tempfile::TempDir;

  #[test]
  fn run_checked_returns_trimmed_stdout() {
    let temp = TempDir::new().unwrap();
    let executor = ProcessExecutor::new(temp.path());
    let (program, args) = echo_msg("hello");

    assert_eq!(executor.run_checked(program, &args).unwrap(), "hello");
  }

  #[test]
  #[cfg(unix)]
  fn run_checked_reports_exit_code_and_stderr() {
    let temp = TempDir::new().unwrap();
    let executor = ProcessExecutor::new(temp.path());
    let (program, args) = shell_cmd("echo broken >&2; exit 4");

    let err = executor.run_checked(program, &args).unwrap_err();
    match err {
      StepError::CmdFailed { code, stderr, .. } => {
        assert_eq!(code, Some(4));
        assert_eq!(stderr, "broken");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn missing_program_is_a_spawn_error() {
    let temp = TempDir::new().unwrap();
    let executor = ProcessExecutor::new(temp.path());

    let err = executor.execute("respack-no-such-tool", &[]).unwrap_err();
    assert!(matches!(err, StepError::Spawn { .. }));
  }

  #[test]
  #[cfg(unix)]
  fn runs_in_the_configured_directory() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("marker"), "").unwrap();
    let executor = ProcessExecutor::new(temp.path());
    let (program, args) = shell_cmd("ls");

    assert_eq!(executor.run_checked(program, &args).unwrap(), "marker");
  }

  #[test]
  fn render_command_quotes_spaces() {
    let args = vec!["-S".to_string(), "my res".to_string()];
    assert_eq!(render_command("aapt", &args), "aapt -S 'my res'");
  }
}
