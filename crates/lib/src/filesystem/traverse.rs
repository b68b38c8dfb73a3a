use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A regular file found below a traversal root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversedFile {
  /// The file as seen from the caller: the traversal root as given, joined with `relative`.
  pub path: PathBuf,
  /// The resolved location on disk.
  pub absolute: PathBuf,
  /// Path relative to the traversal root.
  pub relative: PathBuf,
}

/// Lazy, sorted walk over the regular files below a directory.
///
/// Symlinks are followed, so linked files are reported as files. Each call to
/// [`ProjectFilesystem::walk`](super::ProjectFilesystem::walk) starts a fresh walk.
pub struct Traversal {
  base: PathBuf,
  root: PathBuf,
  inner: walkdir::IntoIter,
}

impl Traversal {
  pub(crate) fn new(base: &Path, root: PathBuf) -> Self {
    let inner = WalkDir::new(&root).follow_links(true).sort_by_file_name().into_iter();
    Self {
      base: base.to_path_buf(),
      root,
      inner,
    }
  }
}

impl Iterator for Traversal {
  type Item = io::Result<TraversedFile>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      let entry = match self.inner.next()? {
        Ok(entry) => entry,
        Err(e) => return Some(Err(e.into())),
      };

      if !entry.file_type().is_file() {
        continue;
      }

      let Ok(relative) = entry.path().strip_prefix(&self.root) else {
        continue;
      };
      let relative = relative.to_path_buf();

      return Some(Ok(TraversedFile {
        path: self.base.join(&relative),
        absolute: entry.path().to_path_buf(),
        relative,
      }));
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::filesystem::ProjectFilesystem;
  use std::path::{Path, PathBuf};
  use tempfile::TempDir;

  #[test]
  fn yields_files_with_relative_paths_in_order() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("res/drawable-hdpi")).unwrap();
    std::fs::write(temp.path().join("res/drawable-hdpi/icon.png"), "png").unwrap();
    std::fs::write(temp.path().join("res/a.txt"), "a").unwrap();

    let fs = ProjectFilesystem::new(temp.path());
    let files: Vec<_> = fs.walk(Path::new("res")).map(|f| f.unwrap()).collect();

    let relative: Vec<_> = files.iter().map(|f| f.relative.clone()).collect();
    assert_eq!(
      relative,
      vec![PathBuf::from("a.txt"), PathBuf::from("drawable-hdpi/icon.png")]
    );
    assert_eq!(files[1].path, PathBuf::from("res/drawable-hdpi/icon.png"));
    assert_eq!(files[1].absolute, temp.path().join("res/drawable-hdpi/icon.png"));
  }

  #[test]
  fn missing_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    let fs = ProjectFilesystem::new(temp.path());
    let first = fs.walk(Path::new("does-not-exist")).next().unwrap();
    assert!(first.is_err());
  }

  #[test]
  fn walks_are_restartable() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("one"), "1").unwrap();
    let fs = ProjectFilesystem::new(temp.path());

    assert_eq!(fs.walk(Path::new("")).count(), 1);
    assert_eq!(fs.walk(Path::new("")).count(), 1);
  }
}
