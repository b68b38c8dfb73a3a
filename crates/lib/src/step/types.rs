//! Error and result types for step execution.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Errors a single step can fail with.
#[derive(Debug, Error)]
pub enum StepError {
  /// A filesystem operation failed on a specific path.
  #[error("{op} failed for {}: {source}", path.display())]
  Fs {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// An external tool ran but exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {command}")]
  CmdFailed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },

  /// An external tool could not be started at all.
  #[error("failed to spawn {command}: {source}")]
  Spawn {
    command: String,
    #[source]
    source: io::Error,
  },

  /// A required capability (e.g. the image scaler) is not installed.
  #[error("{capability} is not available: {hint}")]
  CapabilityUnavailable { capability: String, hint: String },

  /// A step spawned by a deferred step failed; the whole invocation stops.
  #[error("Error running {description}")]
  Unrecoverable {
    description: String,
    #[source]
    source: Box<StepError>,
  },

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

impl StepError {
  /// Build a mapper that tags an `io::Error` with the operation and path.
  ///
  /// ```ignore
  /// fs::create_dir_all(&dir).map_err(StepError::fs("mkdir", &dir))?;
  /// ```
  pub fn fs<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> StepError + 'a {
    move |source| StepError::Fs {
      op,
      path: path.to_path_buf(),
      source,
    }
  }

  /// The process exit status this failure maps to.
  ///
  /// A tool's own non-zero exit code is passed through; everything else is 1.
  pub fn exit_code(&self) -> i32 {
    match self {
      StepError::CmdFailed { code: Some(code), .. } if *code != 0 => *code,
      StepError::Unrecoverable { source, .. } => source.exit_code(),
      _ => 1,
    }
  }
}

/// A step failed while running a pipeline.
#[derive(Debug, Error)]
#[error("{target}: step {index} ({short_name}) failed: {source}")]
pub struct PipelineError {
  /// Fully qualified build target that owns the pipeline.
  pub target: String,
  /// Zero-based position of the failing step.
  pub index: usize,
  pub short_name: String,
  pub description: String,
  #[source]
  pub source: StepError,
}

impl PipelineError {
  pub fn exit_code(&self) -> i32 {
    self.source.exit_code()
  }
}

/// Summary of a successful pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
  /// Short names of the steps that ran, in order.
  pub executed: Vec<String>,
  pub duration: Duration,
}
