use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// CPU architectures an Android package can carry native libraries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCpuType {
  Arm,
  Armv7,
  Arm64,
  X86,
  X86_64,
  Mips,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown cpu type: {0} (expected one of arm, armv7, arm64, x86, x86_64, mips)")]
pub struct UnknownCpuType(pub String);

impl TargetCpuType {
  pub const ALL: [TargetCpuType; 6] = [
    Self::Arm,
    Self::Armv7,
    Self::Arm64,
    Self::X86,
    Self::X86_64,
    Self::Mips,
  ];

  /// Returns the lowercase string identifier for this cpu type
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Arm => "arm",
      Self::Armv7 => "armv7",
      Self::Arm64 => "arm64",
      Self::X86 => "x86",
      Self::X86_64 => "x86_64",
      Self::Mips => "mips",
    }
  }

  /// Name of the ABI subdirectory native libraries for this cpu live in.
  pub fn abi_directory(&self) -> &'static str {
    match self {
      Self::Arm => "armeabi",
      Self::Armv7 => "armeabi-v7a",
      Self::Arm64 => "arm64-v8a",
      Self::X86 => "x86",
      Self::X86_64 => "x86_64",
      Self::Mips => "mips",
    }
  }
}

impl FromStr for TargetCpuType {
  type Err = UnknownCpuType;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|cpu| cpu.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| UnknownCpuType(s.to_string()))
  }
}

impl fmt::Display for TargetCpuType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
