//! Build target identity.
//!
//! A build target is written `//base/path:short_name`. Every per-target output
//! path is derived from it, which keeps the output trees of different targets
//! disjoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetParseError {
  #[error("build target must start with '//': {0}")]
  MissingPrefix(String),

  #[error("build target must contain exactly one ':': {0}")]
  MissingShortName(String),

  #[error("build target has an empty short name: {0}")]
  EmptyShortName(String),

  #[error("invalid character in build target {target}: {reason}")]
  Invalid { target: String, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuildTarget {
  base_path: String,
  short_name: String,
}

impl BuildTarget {
  pub fn parse(s: &str) -> Result<Self, TargetParseError> {
    let rest = s
      .strip_prefix("//")
      .ok_or_else(|| TargetParseError::MissingPrefix(s.to_string()))?;

    let (base_path, short_name) = match rest.split_once(':') {
      Some((base, short)) if !short.contains(':') => (base, short),
      _ => return Err(TargetParseError::MissingShortName(s.to_string())),
    };

    if short_name.is_empty() {
      return Err(TargetParseError::EmptyShortName(s.to_string()));
    }
    if short_name.contains('/') {
      return Err(TargetParseError::Invalid {
        target: s.to_string(),
        reason: "short name cannot contain '/'",
      });
    }
    if base_path.ends_with('/') || base_path.contains("//") {
      return Err(TargetParseError::Invalid {
        target: s.to_string(),
        reason: "base path cannot contain empty segments",
      });
    }
    if base_path.split('/').any(|segment| segment == "..") {
      return Err(TargetParseError::Invalid {
        target: s.to_string(),
        reason: "base path cannot contain '..'",
      });
    }

    Ok(Self {
      base_path: base_path.to_string(),
      short_name: short_name.to_string(),
    })
  }

  pub fn base_path(&self) -> &str {
    &self.base_path
  }

  /// The base path followed by a slash, or the empty string for root targets.
  pub fn base_path_with_slash(&self) -> String {
    if self.base_path.is_empty() {
      String::new()
    } else {
      format!("{}/", self.base_path)
    }
  }

  pub fn short_name(&self) -> &str {
    &self.short_name
  }

  pub fn fully_qualified_name(&self) -> String {
    format!("//{}:{}", self.base_path, self.short_name)
  }
}

impl FromStr for BuildTarget {
  type Err = TargetParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl TryFrom<String> for BuildTarget {
  type Error = TargetParseError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::parse(&value)
  }
}

impl From<BuildTarget> for String {
  fn from(target: BuildTarget) -> Self {
    target.fully_qualified_name()
  }
}

impl fmt::Display for BuildTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "//{}:{}", self.base_path, self.short_name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_base_path_and_short_name() {
    let target = BuildTarget::parse("//apps/sample:app").unwrap();
    assert_eq!(target.base_path(), "apps/sample");
    assert_eq!(target.base_path_with_slash(), "apps/sample/");
    assert_eq!(target.short_name(), "app");
    assert_eq!(target.to_string(), "//apps/sample:app");
  }

  #[test]
  fn root_target_has_empty_base_path() {
    let target = BuildTarget::parse("//:app").unwrap();
    assert_eq!(target.base_path_with_slash(), "");
    assert_eq!(target.fully_qualified_name(), "//:app");
  }

  #[test]
  fn rejects_malformed_targets() {
    assert!(matches!(
      BuildTarget::parse("apps:app"),
      Err(TargetParseError::MissingPrefix(_))
    ));
    assert!(matches!(
      BuildTarget::parse("//apps/app"),
      Err(TargetParseError::MissingShortName(_))
    ));
    assert!(matches!(
      BuildTarget::parse("//apps:"),
      Err(TargetParseError::EmptyShortName(_))
    ));
    assert!(matches!(
      BuildTarget::parse("//apps/:app"),
      Err(TargetParseError::Invalid { .. })
    ));
    assert!(matches!(
      BuildTarget::parse("//apps/../etc:app"),
      Err(TargetParseError::Invalid { .. })
    ));
  }

  #[test]
  fn deserializes_from_string() {
    let target: BuildTarget = serde_json::from_str(r#""//lib/res:strings""#).unwrap();
    assert_eq!(target.short_name(), "strings");
    assert!(serde_json::from_str::<BuildTarget>(r#""lib:strings""#).is_err());
  }
}
