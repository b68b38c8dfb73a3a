//! Project-rooted filesystem view.
//!
//! Steps describe paths relative to the project root (absolute paths are
//! passed through untouched). [`ProjectFilesystem`] resolves them and performs
//! the handful of operations the packaging steps need.

mod traverse;

pub use traverse::{Traversal, TraversedFile};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::platform::link::link_file;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFilesystem {
  root: PathBuf,
}

impl ProjectFilesystem {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Resolve a project-relative path against the root.
  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }

  pub fn exists(&self, path: &Path) -> bool {
    self.resolve(path).exists()
  }

  pub fn is_dir(&self, path: &Path) -> bool {
    self.resolve(path).is_dir()
  }

  pub fn mkdirs(&self, path: &Path) -> io::Result<()> {
    fs::create_dir_all(self.resolve(path))
  }

  pub fn create_parent_dirs(&self, path: &Path) -> io::Result<()> {
    match self.resolve(path).parent() {
      Some(parent) => fs::create_dir_all(parent),
      None => Ok(()),
    }
  }

  /// Delete `path` (and everything below it) if present, then recreate it empty.
  pub fn make_clean_dir(&self, path: &Path) -> io::Result<()> {
    let resolved = self.resolve(path);
    match fs::symlink_metadata(&resolved) {
      Ok(meta) if meta.is_dir() => fs::remove_dir_all(&resolved)?,
      Ok(_) => fs::remove_file(&resolved)?,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(e),
    }
    fs::create_dir_all(&resolved)
  }

  pub fn delete_file(&self, path: &Path) -> io::Result<()> {
    fs::remove_file(self.resolve(path))
  }

  /// Remove an empty directory. Fails if the directory still has entries.
  pub fn delete_empty_dir(&self, path: &Path) -> io::Result<()> {
    fs::remove_dir(self.resolve(path))
  }

  /// List the direct children of a directory, sorted by name.
  pub fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(self.resolve(dir))?
      .map(|entry| entry.map(|e| e.path()))
      .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
  }

  /// Copy a single file, creating the destination's parent directories.
  pub fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<u64> {
    let destination = self.resolve(destination);
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent)?;
    }
    trace!(source = ?source, destination = ?destination, "copying file");
    fs::copy(self.resolve(source), destination)
  }

  /// Copy every file below `source` to the same relative path below `destination`.
  ///
  /// Returns the number of files copied.
  pub fn copy_dir_contents(&self, source: &Path, destination: &Path) -> io::Result<usize> {
    self.mkdirs(destination)?;
    let mut copied = 0;
    for file in self.walk(source) {
      let file = file?;
      self.copy_file(&file.absolute, &destination.join(&file.relative))?;
      copied += 1;
    }
    Ok(copied)
  }

  /// Symlink `target` at `link`, creating the link's parent directories.
  pub fn symlink_file(&self, target: &Path, link: &Path) -> io::Result<()> {
    self.create_parent_dirs(link)?;
    link_file(&self.resolve(target), &self.resolve(link))
  }

  /// Lazily walk every regular file below `dir`, sorted by path.
  pub fn walk(&self, dir: &Path) -> Traversal {
    Traversal::new(dir, self.resolve(dir))
  }
}
