//! Asset directories gathered from the dependency closure.
//!
//! aapt accepts a single assets directory, so the asset directories of every
//! dependency are merged into one tree ([`merger`]), with native libraries
//! copied below `lib/` ([`native`]).

pub mod merger;
pub mod native;

pub use merger::{collect_assets, create_all_assets_directory};
pub use native::copy_native_library;

use std::path::{Path, PathBuf};

use crate::target::BuildTarget;

/// A directory contributed by one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSource {
  pub dir: PathBuf,
  pub origin: BuildTarget,
}

impl AssetSource {
  pub fn new(dir: impl Into<PathBuf>, origin: BuildTarget) -> Self {
    Self { dir: dir.into(), origin }
  }
}

/// Asset and native-library asset directories of a dependency closure, in
/// merge order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetsClosure {
  pub assets_directories: Vec<AssetSource>,
  pub native_lib_assets_directories: Vec<AssetSource>,
}

impl AssetsClosure {
  pub fn asset_dirs(&self) -> Vec<PathBuf> {
    self.assets_directories.iter().map(|source| source.dir.clone()).collect()
  }

  /// Where the unified assets directory will be, if there is anything to put in it.
  ///
  /// With no assets, no native libraries and strings not stored as assets,
  /// aapt is run without `-A`.
  pub fn unified_assets_dir(&self, store_strings_as_assets: bool, destination: &Path) -> Option<PathBuf> {
    if self.assets_directories.is_empty() && self.native_lib_assets_directories.is_empty() && !store_strings_as_assets {
      None
    } else {
      Some(destination.to_path_buf())
    }
  }
}
