//! Rule keys: hashes over the declared inputs of a build rule.
//!
//! Fields are folded into a SHA-256 in the order they are set. Each key and
//! value is length-prefixed, so `("ab", "c")` and `("a", "bc")` hash
//! differently. Collections must be rendered deterministically before they are
//! set; [`sorted_set_string`] does that for sets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleKeyError {
  #[error("rule key field set twice: {0}")]
  DuplicateField(String),

  #[error("rule key field name cannot be empty")]
  EmptyField,
}

/// A finished rule key, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleKey(pub String);

impl fmt::Display for RuleKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Accumulates named fields into a [`RuleKey`].
#[derive(Clone)]
pub struct RuleKeyBuilder {
  hasher: Sha256,
  seen: BTreeSet<String>,
}

impl RuleKeyBuilder {
  /// Start a key for a rule of the given type, e.g. `aapt_package`.
  pub fn new(rule_type: &str) -> Self {
    let mut builder = Self {
      hasher: Sha256::new(),
      seen: BTreeSet::new(),
    };
    builder.update(b".rule_type");
    builder.update(rule_type.as_bytes());
    builder
  }

  pub fn set(mut self, key: &str, value: impl AsRef<str>) -> Result<Self, RuleKeyError> {
    if key.is_empty() {
      return Err(RuleKeyError::EmptyField);
    }
    if !self.seen.insert(key.to_string()) {
      return Err(RuleKeyError::DuplicateField(key.to_string()));
    }
    self.update(key.as_bytes());
    self.update(value.as_ref().as_bytes());
    Ok(self)
  }

  pub fn build(self) -> RuleKey {
    RuleKey(hex::encode(self.hasher.finalize()))
  }

  fn update(&mut self, bytes: &[u8]) {
    self.hasher.update((bytes.len() as u64).to_le_bytes());
    self.hasher.update(bytes);
  }
}

impl fmt::Debug for RuleKeyBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RuleKeyBuilder").field("fields", &self.seen).finish()
  }
}

/// Render a set as `[a, b, c]` in sorted order, whatever order it arrives in.
pub fn sorted_set_string<T: Ord + fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
  let sorted: BTreeSet<T> = items.into_iter().collect();
  let rendered: Vec<String> = sorted.iter().map(ToString::to_string).collect();
  format!("[{}]", rendered.join(", "))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::TargetCpuType;

  fn key(manifest: &str, package_type: &str, cpus: &str) -> RuleKey {
    RuleKeyBuilder::new("aapt_package")
      .set("manifest", manifest)
      .unwrap()
      .set("packageType", package_type)
      .unwrap()
      .set("cpuFilters", cpus)
      .unwrap()
      .build()
  }

  #[test]
  fn identical_inputs_give_identical_keys() {
    let a = key("AndroidManifest.xml:abc", "debug", "[arm, x86]");
    let b = key("AndroidManifest.xml:abc", "debug", "[arm, x86]");
    assert_eq!(a, b);
    assert_eq!(a.0.len(), 64);
  }

  #[test]
  fn every_field_changes_the_key() {
    let base = key("m:1", "debug", "[]");
    assert_ne!(base, key("m:2", "debug", "[]"));
    assert_ne!(base, key("m:1", "release", "[]"));
    assert_ne!(base, key("m:1", "debug", "[arm]"));
  }

  #[test]
  fn fields_are_length_prefixed() {
    let a = RuleKeyBuilder::new("t").set("ab", "c").unwrap().build();
    let b = RuleKeyBuilder::new("t").set("a", "bc").unwrap().build();
    assert_ne!(a, b);
  }

  #[test]
  fn cpu_filter_order_does_not_matter() {
    let forward = [TargetCpuType::X86, TargetCpuType::Arm64, TargetCpuType::Arm, TargetCpuType::Armv7];
    let backward = [TargetCpuType::Armv7, TargetCpuType::Arm, TargetCpuType::Arm64, TargetCpuType::X86];
    let forward = sorted_set_string(forward.iter().map(|cpu| cpu.as_str()));
    let backward = sorted_set_string(backward.iter().map(|cpu| cpu.as_str()));
    assert_eq!(forward, backward);
    assert_eq!(forward, "[arm, arm64, armv7, x86]");
    assert_eq!(sorted_set_string(Vec::<&str>::new()), "[]");
  }

  #[test]
  fn rejects_duplicate_and_empty_fields() {
    let err = RuleKeyBuilder::new("t").set("a", "1").unwrap().set("a", "2").unwrap_err();
    assert_eq!(err, RuleKeyError::DuplicateField("a".to_string()));
    assert_eq!(RuleKeyBuilder::new("t").set("", "1").unwrap_err(), RuleKeyError::EmptyField);
  }
}
