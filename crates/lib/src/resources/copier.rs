//! Predicate-filtered copying of mapped resource directories.

use std::path::Path;

use tracing::debug;

use crate::filesystem::ProjectFilesystem;
use crate::step::StepError;

use super::mapping::ResourceDirectoryMapping;

/// Counts from one copy run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
  pub copied: usize,
  pub skipped: usize,
}

/// Copies each mapped input directory to its output, keeping only files the
/// predicate accepts.
///
/// The predicate sees each file as its input directory joined with its path
/// relative to that directory.
pub trait FilteredDirectoryCopier {
  fn copy_dirs(
    &self,
    fs: &ProjectFilesystem,
    mapping: &ResourceDirectoryMapping,
    keep: &dyn Fn(&Path) -> bool,
  ) -> Result<CopyStats, StepError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilteredDirectoryCopier;

impl FilteredDirectoryCopier for DefaultFilteredDirectoryCopier {
  fn copy_dirs(
    &self,
    fs: &ProjectFilesystem,
    mapping: &ResourceDirectoryMapping,
    keep: &dyn Fn(&Path) -> bool,
  ) -> Result<CopyStats, StepError> {
    let mut stats = CopyStats::default();
    for (input, output) in mapping.iter() {
      fs.mkdirs(output).map_err(StepError::fs("mkdir", output))?;
      for file in fs.walk(input) {
        let file = file.map_err(StepError::fs("walk", input))?;
        if !keep(&file.path) {
          stats.skipped += 1;
          continue;
        }
        let destination = output.join(&file.relative);
        fs.copy_file(&file.absolute, &destination)
          .map_err(StepError::fs("copy", &file.path))?;
        stats.copied += 1;
      }
      debug!(input = ?input, output = ?output, "copied filtered resource directory");
    }
    Ok(stats)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::hash::hash_directory;
  use std::path::PathBuf;
  use tempfile::TempDir;

  fn setup() -> (TempDir, ProjectFilesystem, ResourceDirectoryMapping) {
    let temp = TempDir::new().unwrap();
    for (path, content) in [
      ("a/res/values/strings.xml", "<resources/>"),
      ("a/res/values-es/strings.xml", "<resources>es</resources>"),
      ("b/res/drawable-mdpi/icon.png", "png"),
    ] {
      let full = temp.path().join(path);
      std::fs::create_dir_all(full.parent().unwrap()).unwrap();
      std::fs::write(full, content).unwrap();
    }
    let fs = ProjectFilesystem::new(temp.path());
    let mapping =
      ResourceDirectoryMapping::for_destination(&[PathBuf::from("a/res"), PathBuf::from("b/res")], Path::new("out"))
        .unwrap();
    (temp, fs, mapping)
  }

  #[test]
  fn copies_only_kept_files() {
    let (temp, fs, mapping) = setup();

    let stats = DefaultFilteredDirectoryCopier
      .copy_dirs(&fs, &mapping, &|path| !path.starts_with("a/res/values-es"))
      .unwrap();

    assert_eq!(stats, CopyStats { copied: 2, skipped: 1 });
    assert!(temp.path().join("out/0/values/strings.xml").exists());
    assert!(!temp.path().join("out/0/values-es").exists());
    assert!(temp.path().join("out/1/drawable-mdpi/icon.png").exists());
  }

  #[test]
  fn copying_twice_is_idempotent() {
    let (temp, fs, mapping) = setup();
    let keep_all = |_: &Path| true;

    DefaultFilteredDirectoryCopier.copy_dirs(&fs, &mapping, &keep_all).unwrap();
    let first = hash_directory(&temp.path().join("out"), &[]).unwrap();
    DefaultFilteredDirectoryCopier.copy_dirs(&fs, &mapping, &keep_all).unwrap();
    let second = hash_directory(&temp.path().join("out"), &[]).unwrap();

    assert_eq!(first, second);
  }

  #[test]
  fn missing_input_aborts_the_copy() {
    let temp = TempDir::new().unwrap();
    let fs = ProjectFilesystem::new(temp.path());
    let mapping = ResourceDirectoryMapping::for_destination(&[PathBuf::from("missing/res")], Path::new("out")).unwrap();

    let err = DefaultFilteredDirectoryCopier
      .copy_dirs(&fs, &mapping, &|_| true)
      .unwrap_err();
    assert!(matches!(err, StepError::Fs { op: "walk", .. }));
  }
}
