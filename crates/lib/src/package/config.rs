//! Validated configuration of one resource packaging invocation.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::deps::{GraphError, TransitiveDependencies};
use crate::filesystem::ProjectFilesystem;
use crate::platform::TargetCpuType;
use crate::resources::{FilterOptionsError, MappingError};
use crate::target::{BuildTarget, TargetParseError};
use crate::util::hash::{DirHashError, hash_file};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid build target: {0}")]
  Target(#[from] TargetParseError),

  #[error("invalid dependency graph: {0}")]
  Graph(#[from] GraphError),

  #[error("invalid resource filter: {0}")]
  Filter(#[from] FilterOptionsError),

  #[error("invalid resource directory mapping: {0}")]
  Mapping(#[from] MappingError),

  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("unknown package type: {0} (expected debug, instrumented or release)")]
  UnknownPackageType(String),
}

/// Flavor of the package being built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
  #[default]
  Debug,
  Instrumented,
  Release,
}

impl PackageType {
  pub fn as_str(&self) -> &'static str {
    match self {
      PackageType::Debug => "debug",
      PackageType::Instrumented => "instrumented",
      PackageType::Release => "release",
    }
  }

  /// PNG crunching is slow, so only release packages pay for it.
  pub fn is_crunch_png_files(&self) -> bool {
    matches!(self, PackageType::Release)
  }
}

impl fmt::Display for PackageType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for PackageType {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "debug" => Ok(PackageType::Debug),
      "instrumented" => Ok(PackageType::Instrumented),
      "release" => Ok(PackageType::Release),
      _ => Err(ConfigError::UnknownPackageType(s.to_string())),
    }
  }
}

/// A file given either directly or as the output of another target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourcePath {
  Path(PathBuf),
  Target { target: BuildTarget, output: PathBuf },
}

impl SourcePath {
  /// Where the file is on disk.
  pub fn path(&self) -> &Path {
    match self {
      SourcePath::Path(path) => path,
      SourcePath::Target { output, .. } => output,
    }
  }

  /// The rule-key form of this source.
  ///
  /// A plain file is identified by its path and content hash. A target output
  /// is identified by the target, whose own rule key covers the content.
  pub fn as_reference(&self, fs: &ProjectFilesystem) -> Result<String, DirHashError> {
    match self {
      SourcePath::Path(path) => {
        let hash = hash_file(&fs.resolve(path))?;
        Ok(format!("{}:{}", path.to_string_lossy().replace('\\', "/"), hash))
      }
      SourcePath::Target { target, .. } => Ok(target.to_string()),
    }
  }
}

/// Everything a packaging invocation needs. Built by [`PackageConfig::new`],
/// which fails if a required field is absent.
#[derive(Debug, Clone)]
pub struct PackageConfig {
  pub target: BuildTarget,
  pub manifest: SourcePath,
  pub package_type: PackageType,
  pub cpu_filters: BTreeSet<TargetCpuType>,
  /// Resource directories handed to aapt, usually the filtered ones.
  pub resource_directories: Vec<PathBuf>,
  /// The unfiltered dependency closure.
  pub transitive: TransitiveDependencies,
  pub store_strings_as_assets: bool,
}

/// Fields of a [`PackageConfig`], each optional until validated.
#[derive(Debug, Clone, Default)]
pub struct PackageConfigFields {
  pub target: Option<BuildTarget>,
  pub manifest: Option<SourcePath>,
  pub package_type: Option<PackageType>,
  pub cpu_filters: BTreeSet<TargetCpuType>,
  /// Defaults to the unfiltered closure's resource directories.
  pub resource_directories: Option<Vec<PathBuf>>,
  pub transitive: TransitiveDependencies,
  pub store_strings_as_assets: bool,
}

impl PackageConfig {
  pub fn new(fields: PackageConfigFields) -> Result<Self, ConfigError> {
    let target = fields.target.ok_or(ConfigError::MissingField("target"))?;
    let manifest = fields.manifest.ok_or(ConfigError::MissingField("manifest"))?;
    let package_type = fields.package_type.ok_or(ConfigError::MissingField("package_type"))?;
    let resource_directories = fields
      .resource_directories
      .unwrap_or_else(|| fields.transitive.resource_directories.clone());

    Ok(Self {
      target,
      manifest,
      package_type,
      cpu_filters: fields.cpu_filters,
      resource_directories,
      transitive: fields.transitive,
      store_strings_as_assets: fields.store_strings_as_assets,
    })
  }
}
