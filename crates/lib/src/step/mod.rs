//! Build steps and the sequential step runner.
//!
//! A packaging invocation is an ordered list of [`Step`]s. Each step runs to
//! completion before the next one starts, since later steps read what earlier
//! steps wrote. The first failure stops the pipeline.
//!
//! Steps that can only be planned once earlier steps have produced their
//! outputs are expressed as [`Step::Deferred`]: a closure that computes the
//! concrete steps at execution time and runs them in place.

mod context;
mod process;
mod types;

pub use context::{ExecutionContext, Verbosity};
pub use process::{ProcessExecutor, ProcessOutput, render_command};
pub use types::{PipelineError, RunReport, StepError};

pub(crate) use process::display_path;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::package::aapt::AaptStep;
use crate::package::strings::CompileStringsStep;
use crate::resources::FilterResourcesStep;
use crate::target::BuildTarget;

/// Produces the steps of a [`DeferredStep`] once it runs.
pub type StepProducer = Box<dyn Fn(&ExecutionContext) -> Result<Vec<Step>, StepError> + Send + Sync>;

/// One unit of work in a pipeline.
#[derive(Debug)]
pub enum Step {
  /// `mkdir -p`
  Mkdir(PathBuf),
  /// Delete the directory if present, then recreate it empty.
  MakeCleanDirectory(PathBuf),
  /// Create `target`'s parent and symlink `source` at `target`.
  MkdirAndSymlinkFile { source: PathBuf, target: PathBuf },
  /// Copy a file, or with `recursive` the contents of a directory.
  Copy {
    source: PathBuf,
    destination: PathBuf,
    recursive: bool,
  },
  /// Copy a directory's contents if the directory exists, otherwise do nothing.
  CopyDirectoryIfPresent { source: PathBuf, destination: PathBuf },
  CompileStrings(CompileStringsStep),
  FilterResources(Box<FilterResourcesStep>),
  Aapt(AaptStep),
  Deferred(DeferredStep),
}

impl Step {
  pub fn short_name(&self) -> &str {
    match self {
      Step::Mkdir(_) => "mkdir",
      Step::MakeCleanDirectory(_) => "rm_&&_mkdir",
      Step::MkdirAndSymlinkFile { .. } => "mkdir_and_symlink_file",
      Step::Copy { .. } => "cp",
      Step::CopyDirectoryIfPresent { .. } => "cp_if_present",
      Step::CompileStrings(_) => "compile_strings",
      Step::FilterResources(_) => "filter_resources",
      Step::Aapt(_) => "aapt_package",
      Step::Deferred(step) => step.short_name,
    }
  }

  /// A shell-like rendering of what the step does.
  pub fn description(&self, ctx: &ExecutionContext) -> String {
    match self {
      Step::Mkdir(path) => format!("mkdir -p {}", display_path(path)),
      Step::MakeCleanDirectory(path) => {
        format!("rm -r -f {0} && mkdir -p {0}", display_path(path))
      }
      Step::MkdirAndSymlinkFile { source, target } => format!(
        "mkdir -p {} && ln -f -s {} {}",
        target.parent().map(display_path).unwrap_or_default(),
        display_path(source),
        display_path(target)
      ),
      Step::Copy {
        source,
        destination,
        recursive: true,
      } => format!("cp -R {}/. {}", display_path(source), display_path(destination)),
      Step::Copy { source, destination, .. } => {
        format!("cp {} {}", display_path(source), display_path(destination))
      }
      Step::CopyDirectoryIfPresent { source, destination } => format!(
        "[ -d {0} ] && mkdir -p {1} && cp -R {0}/. {1}",
        display_path(source),
        display_path(destination)
      ),
      Step::CompileStrings(step) => step.description(),
      Step::FilterResources(step) => step.description(),
      Step::Aapt(step) => step.description(ctx),
      Step::Deferred(step) => step.short_name.to_string(),
    }
  }

  pub fn execute(&self, ctx: &ExecutionContext) -> Result<(), StepError> {
    let fs = ctx.filesystem();
    match self {
      Step::Mkdir(path) => fs.mkdirs(path).map_err(StepError::fs("mkdir", path)),
      Step::MakeCleanDirectory(path) => fs.make_clean_dir(path).map_err(StepError::fs("clean directory", path)),
      Step::MkdirAndSymlinkFile { source, target } => {
        fs.symlink_file(source, target).map_err(StepError::fs("symlink", target))
      }
      Step::Copy {
        source,
        destination,
        recursive,
      } => {
        if *recursive {
          let copied = fs
            .copy_dir_contents(source, destination)
            .map_err(StepError::fs("copy", source))?;
          debug!(source = ?source, destination = ?destination, copied, "copied directory contents");
        } else {
          fs.copy_file(source, destination).map_err(StepError::fs("copy", source))?;
        }
        Ok(())
      }
      Step::CopyDirectoryIfPresent { source, destination } => {
        if !fs.is_dir(source) {
          debug!(source = ?source, "skipping copy of missing directory");
          return Ok(());
        }
        fs.copy_dir_contents(source, destination)
          .map_err(StepError::fs("copy", source))?;
        Ok(())
      }
      Step::CompileStrings(step) => step.execute(ctx),
      Step::FilterResources(step) => step.execute(ctx),
      Step::Aapt(step) => step.execute(ctx),
      Step::Deferred(step) => step.execute(ctx),
    }
  }

  pub fn mkdir(path: impl Into<PathBuf>) -> Self {
    Step::Mkdir(path.into())
  }

  pub fn make_clean_directory(path: impl Into<PathBuf>) -> Self {
    Step::MakeCleanDirectory(path.into())
  }

  pub fn mkdir_and_symlink_file(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
    Step::MkdirAndSymlinkFile {
      source: source.into(),
      target: target.into(),
    }
  }

  pub fn copy(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, recursive: bool) -> Self {
    Step::Copy {
      source: source.into(),
      destination: destination.into(),
      recursive,
    }
  }
}

/// A step whose concrete work is computed when it executes.
///
/// The producer runs against the filesystem as earlier steps left it. If it
/// fails, the error is logged with the owning target and the step fails with
/// exit code 1. If one of the produced steps fails, the failure is
/// unrecoverable and names that step.
pub struct DeferredStep {
  short_name: &'static str,
  owner: BuildTarget,
  produce: StepProducer,
}

impl DeferredStep {
  pub fn new(short_name: &'static str, owner: BuildTarget, produce: StepProducer) -> Self {
    Self {
      short_name,
      owner,
      produce,
    }
  }

  /// Compute the steps without running them.
  pub fn plan(&self, ctx: &ExecutionContext) -> Result<Vec<Step>, StepError> {
    (self.produce)(ctx)
  }

  fn execute(&self, ctx: &ExecutionContext) -> Result<(), StepError> {
    let steps = self.plan(ctx).inspect_err(|e| {
      error!(build_target = %self.owner, step = self.short_name, error = %e, "failed to plan deferred step");
    })?;

    debug!(step = self.short_name, count = steps.len(), "running deferred steps");
    for step in &steps {
      if let Err(e) = step.execute(ctx) {
        return Err(StepError::Unrecoverable {
          description: step.description(ctx),
          source: Box::new(e),
        });
      }
    }
    Ok(())
  }
}

impl fmt::Debug for DeferredStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DeferredStep")
      .field("short_name", &self.short_name)
      .field("owner", &self.owner)
      .finish_non_exhaustive()
  }
}

/// A planned step as shown to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDescription {
  pub short_name: String,
  pub description: String,
}

/// Describe every step without executing anything.
pub fn describe_steps(steps: &[Step], ctx: &ExecutionContext) -> Vec<StepDescription> {
  steps
    .iter()
    .map(|step| StepDescription {
      short_name: step.short_name().to_string(),
      description: step.description(ctx),
    })
    .collect()
}

/// Run `steps` in order on behalf of `target`, stopping at the first failure.
pub fn run_steps(steps: &[Step], ctx: &ExecutionContext, target: &BuildTarget) -> Result<RunReport, PipelineError> {
  let start = Instant::now();
  let mut report = RunReport::default();

  info!(build_target = %target, steps = steps.len(), "running steps");

  for (index, step) in steps.iter().enumerate() {
    if ctx.verbosity().should_print_command() {
      info!(step = step.short_name(), "{}", step.description(ctx));
    } else {
      debug!(step = step.short_name(), index, "running step");
    }

    if let Err(source) = step.execute(ctx) {
      let description = step.description(ctx);
      error!(build_target = %target, index, step = step.short_name(), error = %source, "step failed");
      return Err(PipelineError {
        target: target.to_string(),
        index,
        short_name: step.short_name().to_string(),
        description,
        source,
      });
    }
    report.executed.push(step.short_name().to_string());
  }

  report.duration = start.elapsed();
  info!(build_target = %target, duration = ?report.duration, "steps complete");
  Ok(report)
}

/// Fail if a path that a step requires is missing.
pub(crate) fn require_exists(ctx: &ExecutionContext, path: &Path) -> Result<(), StepError> {
  if ctx.filesystem().exists(path) {
    Ok(())
  } else {
    Err(StepError::Fs {
      op: "stat",
      path: path.to_path_buf(),
      source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
    })
  }
}
