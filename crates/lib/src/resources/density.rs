//! Screen density buckets and drawable qualifier parsing.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dots per inch of the baseline (MDPI) bucket.
const BASELINE_DPI: u32 = 160;

/// Display density buckets, ordered by scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
  Ldpi,
  Mdpi,
  Hdpi,
  Xhdpi,
  Xxhdpi,
  Xxxhdpi,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown density: {0} (expected one of ldpi, mdpi, hdpi, xhdpi, xxhdpi, xxxhdpi)")]
pub struct UnknownDensity(pub String);

impl Density {
  pub const ALL: [Density; 6] = [
    Self::Ldpi,
    Self::Mdpi,
    Self::Hdpi,
    Self::Xhdpi,
    Self::Xxhdpi,
    Self::Xxxhdpi,
  ];

  /// The qualifier as it appears in a directory name.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Ldpi => "ldpi",
      Self::Mdpi => "mdpi",
      Self::Hdpi => "hdpi",
      Self::Xhdpi => "xhdpi",
      Self::Xxhdpi => "xxhdpi",
      Self::Xxxhdpi => "xxxhdpi",
    }
  }

  pub fn dpi(&self) -> u32 {
    match self {
      Self::Ldpi => 120,
      Self::Mdpi => 160,
      Self::Hdpi => 240,
      Self::Xhdpi => 320,
      Self::Xxhdpi => 480,
      Self::Xxxhdpi => 640,
    }
  }

  /// Scale factor relative to MDPI.
  pub fn scale(&self) -> f64 {
    f64::from(self.dpi()) / f64::from(BASELINE_DPI)
  }
}

impl FromStr for Density {
  type Err = UnknownDensity;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|density| density.as_str() == s)
      .ok_or_else(|| UnknownDensity(s.to_string()))
  }
}

impl fmt::Display for Density {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Qualifiers of a drawable, read from its parent directory name.
///
/// `res/drawable-en-hdpi-v11/icon.png` has density `hdpi` and the remaining
/// qualifiers `en-v11`. A directory without a recognizable density (including
/// plain `drawable/`) has `density: None`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawableQualifiers {
  pub density: Option<Density>,
  /// Every other qualifier, in directory-name order, joined with `-`.
  pub others: String,
}

impl DrawableQualifiers {
  pub fn from_path(path: &Path) -> Self {
    let dir_name = path
      .parent()
      .and_then(Path::file_name)
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();

    let mut density = None;
    let mut others = Vec::new();
    // The first segment is the resource type.
    for segment in dir_name.split('-').skip(1) {
      match segment.parse::<Density>() {
        Ok(parsed) if density.is_none() => density = Some(parsed),
        _ => others.push(segment),
      }
    }

    Self {
      density,
      others: others.join("-"),
    }
  }
}

/// Rewrite the density qualifier in a drawable's parent directory name.
///
/// Returns `None` when the path has no density qualifier to replace.
pub fn with_density(path: &Path, density: Density) -> Option<PathBuf> {
  let parent = path.parent()?;
  let dir_name = parent.file_name()?.to_string_lossy().into_owned();
  let file_name = path.file_name()?;

  let mut replaced = false;
  let segments: Vec<&str> = dir_name
    .split('-')
    .enumerate()
    .map(|(i, segment)| {
      if i > 0 && !replaced && segment.parse::<Density>().is_ok() {
        replaced = true;
        density.as_str()
      } else {
        segment
      }
    })
    .collect();

  if !replaced {
    return None;
  }
  Some(parent.with_file_name(segments.join("-")).join(file_name))
}
