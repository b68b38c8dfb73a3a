//! The execution context every step receives.

use std::path::Path;

use crate::filesystem::ProjectFilesystem;

use super::process::ProcessExecutor;

/// How much a step should report about what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
  #[default]
  Standard,
  /// Print each command before it runs.
  Commands,
  /// Also ask tools for their own verbose output.
  All,
}

impl Verbosity {
  /// Map a `-v` count to a level: 0 is standard, 1 prints commands, 2+ is everything.
  pub fn from_level(level: u8) -> Self {
    match level {
      0 => Verbosity::Standard,
      1 => Verbosity::Commands,
      _ => Verbosity::All,
    }
  }

  pub fn should_print_command(self) -> bool {
    self >= Verbosity::Commands
  }

  pub fn should_use_verbosity_flag_if_available(self) -> bool {
    self == Verbosity::All
  }
}

/// Capabilities a step may use: a project-rooted filesystem, a process
/// runner and the verbosity level. Steps borrow it and never own it.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
  filesystem: ProjectFilesystem,
  executor: ProcessExecutor,
  verbosity: Verbosity,
}

impl ExecutionContext {
  pub fn new(root: &Path) -> Self {
    Self {
      filesystem: ProjectFilesystem::new(root),
      executor: ProcessExecutor::new(root),
      verbosity: Verbosity::default(),
    }
  }

  pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
    self.verbosity = verbosity;
    self
  }

  pub fn filesystem(&self) -> &ProjectFilesystem {
    &self.filesystem
  }

  pub fn executor(&self) -> &ProcessExecutor {
    &self.executor
  }

  pub fn verbosity(&self) -> Verbosity {
    self.verbosity
  }
}
