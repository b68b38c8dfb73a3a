//! Locale classification of string resources.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Matches a file below `res/values-<ll>[-r<RR>]/`, where `res` starts the path
/// or follows a `/`.
static NON_ENGLISH_STRING_PATH: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?:^|/)res/values-([a-z]{2})(?:-r([A-Z]{2}))?/").expect("valid regex"));

/// A language with an optional region, e.g. `es` or `es_US`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Locale {
  pub language: String,
  pub region: Option<String>,
}

impl fmt::Display for Locale {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.region {
      Some(region) => write!(f, "{}_{}", self.language, region),
      None => write!(f, "{}", self.language),
    }
  }
}

fn normalized(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}

/// Whether `path` is a string resource for a locale other than the default.
pub fn is_non_english_string_path(path: &Path) -> bool {
  NON_ENGLISH_STRING_PATH.is_match(&normalized(path))
}

/// The locale qualifier of a string resource path, if it has one.
pub fn locale_of(path: &Path) -> Option<Locale> {
  let normalized = normalized(path);
  let captures = NON_ENGLISH_STRING_PATH.captures(&normalized)?;
  Some(Locale {
    language: captures.get(1)?.as_str().to_string(),
    region: captures.get(2).map(|m| m.as_str().to_string()),
  })
}

/// A string resource file and its locale (`None` for the default locale).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringResourceEntry {
  pub path: PathBuf,
  pub locale: Option<Locale>,
}

impl StringResourceEntry {
  pub fn classify(path: &Path) -> Self {
    Self {
      path: path.to_path_buf(),
      locale: locale_of(path),
    }
  }
}

/// Drops non-English string resources outside whitelisted resource directories.
#[derive(Debug, Clone, Default)]
pub struct StringResourceFilter {
  enabled: bool,
  whitelisted_dirs: BTreeSet<PathBuf>,
}

impl StringResourceFilter {
  pub fn new(enabled: bool, whitelisted_dirs: BTreeSet<PathBuf>) -> Self {
    Self {
      enabled,
      whitelisted_dirs,
    }
  }

  pub fn keep(&self, path: &Path) -> bool {
    if !self.enabled {
      return true;
    }
    if self.whitelisted_dirs.iter().any(|dir| path.starts_with(dir)) {
      return true;
    }
    StringResourceEntry::classify(path).locale.is_none()
  }
}
