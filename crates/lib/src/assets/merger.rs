//! Merging asset directories into one tree of symlinks.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::filesystem::ProjectFilesystem;
use crate::step::Step;

/// Map every relative asset path to the file that provides it.
///
/// Directories are walked in order. When two directories provide the same
/// relative path, the later one wins.
pub fn collect_assets(fs: &ProjectFilesystem, dirs: &[PathBuf]) -> io::Result<BTreeMap<PathBuf, PathBuf>> {
  let mut assets = BTreeMap::new();
  for dir in dirs {
    for file in fs.walk(dir) {
      let file = file?;
      if let Some(previous) = assets.insert(file.relative.clone(), file.path.clone()) {
        debug!(
          relative = ?file.relative,
          previous = ?previous,
          winner = ?file.path,
          "asset provided by more than one directory"
        );
      }
    }
  }
  Ok(assets)
}

/// Plan the steps that build `destination` as the union of `dirs`.
///
/// Returns `None` when there are no asset directories. Otherwise the steps
/// clean `destination` and symlink each merged file into it.
pub fn create_all_assets_directory(
  fs: &ProjectFilesystem,
  dirs: &[PathBuf],
  destination: &Path,
) -> io::Result<Option<Vec<Step>>> {
  if dirs.is_empty() {
    return Ok(None);
  }

  let assets = collect_assets(fs, dirs)?;
  let mut steps = Vec::with_capacity(assets.len() + 1);
  steps.push(Step::make_clean_directory(destination));
  for (relative, source) in assets {
    steps.push(Step::mkdir_and_symlink_file(source, destination.join(relative)));
  }
  Ok(Some(steps))
}
