//! Cacheable outputs.
//!
//! A pipeline declares each output that must survive into a cache entry through
//! an [`ArtifactRecorder`]. [`RecordedArtifacts`] is the in-memory recorder; its
//! contents can be written out as an [`ArtifactManifest`] (`artifacts.json`)
//! for the enclosing cache to pick up.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::filesystem::ProjectFilesystem;
use crate::rulekey::RuleKey;
use crate::util::hash::{ContentHash, DirHashError, hash_directory, hash_file};

/// Current version of the artifact manifest format.
pub const ARTIFACT_MANIFEST_VERSION: u32 = 1;

/// Accepts declared outputs and marks them for cache storage.
pub trait ArtifactRecorder {
  fn record_artifact(&mut self, path: &Path);
}

/// Recorded artifact paths, each held exactly once, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedArtifacts {
  paths: BTreeSet<PathBuf>,
}

impl RecordedArtifacts {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn paths(&self) -> impl Iterator<Item = &Path> {
    self.paths.iter().map(PathBuf::as_path)
  }

  pub fn contains(&self, path: &Path) -> bool {
    self.paths.contains(path)
  }

  pub fn len(&self) -> usize {
    self.paths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.paths.is_empty()
  }
}

impl ArtifactRecorder for RecordedArtifacts {
  fn record_artifact(&mut self, path: &Path) {
    if !self.paths.insert(path.to_path_buf()) {
      warn!(path = ?path, "artifact recorded more than once");
    }
  }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("failed to hash artifact: {0}")]
  Hash(#[from] DirHashError),

  #[error("recorded artifact does not exist: {}", .0.display())]
  Missing(PathBuf),

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize artifact manifest: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to parse artifact manifest: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("unsupported artifact manifest version: {0}")]
  UnsupportedVersion(u32),
}

/// One recorded output and the hash of its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
  /// Project-relative path as recorded.
  pub path: PathBuf,
  /// SHA-256 of the file, or of the directory tree for directories.
  pub sha256: ContentHash,
}

/// What the cache needs to store one packaging invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
  pub version: u32,
  pub build_target: String,
  pub rule_key: RuleKey,
  pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactManifest {
  /// Hash every recorded artifact as it exists now.
  pub fn collect(
    fs: &ProjectFilesystem,
    build_target: &str,
    rule_key: RuleKey,
    recorded: &RecordedArtifacts,
  ) -> Result<Self, ArtifactError> {
    let mut artifacts = Vec::with_capacity(recorded.len());
    for path in recorded.paths() {
      let resolved = fs.resolve(path);
      let sha256 = if resolved.is_dir() {
        hash_directory(&resolved, &[])?
      } else if resolved.exists() {
        hash_file(&resolved)?
      } else {
        return Err(ArtifactError::Missing(path.to_path_buf()));
      };
      debug!(path = ?path, hash = %sha256, "hashed artifact");
      artifacts.push(ArtifactEntry {
        path: path.to_path_buf(),
        sha256,
      });
    }

    Ok(Self {
      version: ARTIFACT_MANIFEST_VERSION,
      build_target: build_target.to_string(),
      rule_key,
      artifacts,
    })
  }

  /// Write the manifest as pretty JSON, atomically.
  pub fn write(&self, path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|source| ArtifactError::Write {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    let content = serde_json::to_string_pretty(self).map_err(ArtifactError::Serialize)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &content).map_err(|source| ArtifactError::Write {
      path: temp_path.clone(),
      source,
    })?;
    fs::rename(&temp_path, path).map_err(|source| ArtifactError::Write {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(())
  }

  pub fn load(path: &Path) -> Result<Self, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let manifest: Self = serde_json::from_str(&content).map_err(ArtifactError::Parse)?;
    if manifest.version != ARTIFACT_MANIFEST_VERSION {
      return Err(ArtifactError::UnsupportedVersion(manifest.version));
    }
    Ok(manifest)
  }
}
