//! Output locations and tool paths.
//!
//! Everything respack writes lives under one output root, relative to the
//! project root unless `RESPACK_OUT` points somewhere absolute. Tool locations
//! can be overridden through `RESPACK_AAPT`, `RESPACK_ANDROID_JAR` and
//! `RESPACK_IMAGE_SCALER`.

use std::path::PathBuf;

use crate::consts::DEFAULT_OUT_DIR;
use crate::resources::scaler::DEFAULT_IMAGE_SCALER;

/// A non-empty environment variable.
fn env_override(var: &str) -> Option<String> {
  match std::env::var(var) {
    Ok(value) if !value.is_empty() => Some(value),
    _ => None,
  }
}

/// Returns the output root (`respack-out` unless overridden by `RESPACK_OUT`).
pub fn out_dir() -> PathBuf {
  env_override("RESPACK_OUT")
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
}

/// `aapt` binary from `RESPACK_AAPT`, if set.
pub fn aapt_override() -> Option<PathBuf> {
  env_override("RESPACK_AAPT").map(PathBuf::from)
}

/// `android.jar` from `RESPACK_ANDROID_JAR`, if set.
pub fn android_jar_override() -> Option<PathBuf> {
  env_override("RESPACK_ANDROID_JAR").map(PathBuf::from)
}

/// Image scaler binary, `convert` unless `RESPACK_IMAGE_SCALER` is set.
pub fn image_scaler() -> String {
  env_override("RESPACK_IMAGE_SCALER").unwrap_or_else(|| DEFAULT_IMAGE_SCALER.to_string())
}
