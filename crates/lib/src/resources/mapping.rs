//! Input to output resource directory mapping.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
  #[error("resource directory mapped twice: {}", .0.display())]
  DuplicateInput(PathBuf),

  #[error("output directory used twice: {}", .0.display())]
  DuplicateOutput(PathBuf),

  #[error("output directories must share one parent, {} is not under {}", output.display(), base.display())]
  MixedParents { output: PathBuf, base: PathBuf },

  #[error("output directory has no parent: {}", .0.display())]
  NoParent(PathBuf),
}

/// A one-to-one mapping from input resource directories to output directories
/// that are all direct children of one root.
///
/// Entries keep the order they were given in, which is the order aapt sees the
/// filtered directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDirectoryMapping {
  entries: Vec<(PathBuf, PathBuf)>,
}

impl ResourceDirectoryMapping {
  pub fn new(pairs: impl IntoIterator<Item = (PathBuf, PathBuf)>) -> Result<Self, MappingError> {
    let entries: Vec<(PathBuf, PathBuf)> = pairs.into_iter().collect();
    Self::validate(&entries)?;
    Ok(Self { entries })
  }

  fn validate(entries: &[(PathBuf, PathBuf)]) -> Result<(), MappingError> {
    let mut inputs = BTreeSet::new();
    let mut outputs = BTreeSet::new();
    let mut base: Option<&Path> = None;
    for (input, output) in entries {
      if !inputs.insert(input) {
        return Err(MappingError::DuplicateInput(input.clone()));
      }
      if !outputs.insert(output) {
        return Err(MappingError::DuplicateOutput(output.clone()));
      }
      let parent = output.parent().ok_or_else(|| MappingError::NoParent(output.clone()))?;
      match base {
        None => base = Some(parent),
        Some(base) if base != parent => {
          return Err(MappingError::MixedParents {
            output: output.clone(),
            base: base.to_path_buf(),
          });
        }
        Some(_) => {}
      }
    }
    Ok(())
  }

  /// Map each input to `base/<index>`.
  pub fn for_destination(inputs: &[PathBuf], base: &Path) -> Result<Self, MappingError> {
    Self::new(
      inputs
        .iter()
        .enumerate()
        .map(|(index, input)| (input.clone(), base.join(index.to_string()))),
    )
  }

  pub fn inputs(&self) -> Vec<&Path> {
    self.entries.iter().map(|(input, _)| input.as_path()).collect()
  }

  pub fn outputs(&self) -> Vec<&Path> {
    self.entries.iter().map(|(_, output)| output.as_path()).collect()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
    self.entries.iter().map(|(input, output)| (input.as_path(), output.as_path()))
  }

  pub fn output_for(&self, input: &Path) -> Option<&Path> {
    self
      .entries
      .iter()
      .find(|(candidate, _)| candidate == input)
      .map(|(_, output)| output.as_path())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
