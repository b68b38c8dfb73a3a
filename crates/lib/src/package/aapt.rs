//! The aapt invocation that compiles the resource archive.

use std::path::PathBuf;

use crate::step::{ExecutionContext, StepError, Verbosity, render_command, require_exists};

/// Location of the Android tools aapt needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aapt {
  pub aapt: PathBuf,
  pub android_jar: PathBuf,
}

/// Inputs of one `aapt package` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AaptParams {
  pub manifest: PathBuf,
  pub resource_directories: Vec<PathBuf>,
  pub assets_directory: Option<PathBuf>,
  pub output: PathBuf,
  pub crunch_png: bool,
}

impl Aapt {
  pub fn new(aapt: impl Into<PathBuf>, android_jar: impl Into<PathBuf>) -> Self {
    Self {
      aapt: aapt.into(),
      android_jar: android_jar.into(),
    }
  }

  pub fn program(&self) -> String {
    self.aapt.to_string_lossy().into_owned()
  }

  /// Arguments for `aapt package`.
  pub fn args(&self, params: &AaptParams, verbosity: Verbosity) -> Vec<String> {
    let path = |p: &PathBuf| p.to_string_lossy().into_owned();
    let mut args = vec!["package".to_string()];

    if verbosity.should_use_verbosity_flag_if_available() {
      args.push("-v".to_string());
    }
    // Overwrite an existing archive.
    args.push("-f".to_string());
    if !params.crunch_png {
      args.push("--no-crunch".to_string());
    }

    args.push("-M".to_string());
    args.push(path(&params.manifest));
    // Resources may only exist in an overlay directory.
    args.push("--auto-add-overlay".to_string());
    for res in &params.resource_directories {
      args.push("-S".to_string());
      args.push(path(res));
    }
    if let Some(assets) = &params.assets_directory {
      args.push("-A".to_string());
      args.push(path(assets));
    }
    args.push("-I".to_string());
    args.push(path(&self.android_jar));
    args.push("-F".to_string());
    args.push(path(&params.output));
    args
  }
}

#[derive(Debug, Clone)]
pub struct AaptStep {
  pub aapt: Aapt,
  pub params: AaptParams,
}

impl AaptStep {
  pub fn new(aapt: Aapt, params: AaptParams) -> Self {
    Self { aapt, params }
  }

  pub fn description(&self, ctx: &ExecutionContext) -> String {
    render_command(&self.aapt.program(), &self.aapt.args(&self.params, ctx.verbosity()))
  }

  pub fn execute(&self, ctx: &ExecutionContext) -> Result<(), StepError> {
    require_exists(ctx, &self.params.manifest)?;
    let args = self.aapt.args(&self.params, ctx.verbosity());
    ctx.executor().run_checked(&self.aapt.program(), &args)?;
    Ok(())
  }
}
