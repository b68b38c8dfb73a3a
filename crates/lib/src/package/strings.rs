//! Compiling non-English string resources into a per-locale bundle.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::filesystem::ProjectFilesystem;
use crate::resources::strings::locale_of;
use crate::step::{ExecutionContext, StepError, display_path};

/// Turns the non-English string resources of some resource directories into
/// a bundle that can be shipped as assets.
pub trait StringBundleCompiler: Send + Sync {
  /// Write the bundle below `destination`, returning the number of files in it.
  fn compile(&self, fs: &ProjectFilesystem, res_dirs: &[PathBuf], destination: &Path) -> Result<usize, StepError>;
}

const STRINGS_XML: &str = "strings.xml";

/// Groups `strings.xml` files by locale: `<destination>/<locale>/<n>/strings.xml`,
/// where `n` is the index of the resource directory the file came from.
///
/// Whitelisted directories keep their translations in the resources and are
/// left out of the bundle.
#[derive(Debug, Clone, Default)]
pub struct LocaleBundleCompiler {
  whitelisted_dirs: BTreeSet<PathBuf>,
}

impl LocaleBundleCompiler {
  pub fn new(whitelisted_dirs: BTreeSet<PathBuf>) -> Self {
    Self { whitelisted_dirs }
  }
}

impl StringBundleCompiler for LocaleBundleCompiler {
  fn compile(&self, fs: &ProjectFilesystem, res_dirs: &[PathBuf], destination: &Path) -> Result<usize, StepError> {
    let mut count = 0;
    for (index, dir) in res_dirs.iter().enumerate() {
      if self.whitelisted_dirs.contains(dir) {
        debug!(dir = ?dir, "strings whitelisted, not bundling");
        continue;
      }
      if !fs.is_dir(dir) {
        debug!(dir = ?dir, "skipping missing resource directory");
        continue;
      }
      for file in fs.walk(dir) {
        let file = file.map_err(StepError::fs("walk", dir))?;
        if file.relative.file_name().is_none_or(|name| name != STRINGS_XML) {
          continue;
        }
        // Classify relative to the resource root so the directory's own name doesn't matter.
        let Some(locale) = locale_of(&Path::new("res").join(&file.relative)) else {
          continue;
        };
        let target = destination
          .join(locale.to_string())
          .join(index.to_string())
          .join(STRINGS_XML);
        fs.copy_file(&file.path, &target).map_err(StepError::fs("copy", &file.path))?;
        count += 1;
      }
    }
    Ok(count)
  }
}

pub struct CompileStringsStep {
  res_dirs: Vec<PathBuf>,
  destination: PathBuf,
  compiler: Box<dyn StringBundleCompiler>,
}

impl CompileStringsStep {
  pub fn new(res_dirs: Vec<PathBuf>, destination: impl Into<PathBuf>) -> Self {
    Self {
      res_dirs,
      destination: destination.into(),
      compiler: Box::new(LocaleBundleCompiler::default()),
    }
  }

  pub fn with_compiler(mut self, compiler: impl StringBundleCompiler + 'static) -> Self {
    self.compiler = Box::new(compiler);
    self
  }

  pub fn destination(&self) -> &Path {
    &self.destination
  }

  pub fn description(&self) -> String {
    format!(
      "compile_strings {} dir(s) -> {}",
      self.res_dirs.len(),
      display_path(&self.destination)
    )
  }

  pub fn execute(&self, ctx: &ExecutionContext) -> Result<(), StepError> {
    let count = self.compiler.compile(ctx.filesystem(), &self.res_dirs, &self.destination)?;
    info!(destination = ?self.destination, files = count, "compiled string bundle");
    Ok(())
  }
}

impl fmt::Debug for CompileStringsStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CompileStringsStep")
      .field("res_dirs", &self.res_dirs)
      .field("destination", &self.destination)
      .finish_non_exhaustive()
  }
}
