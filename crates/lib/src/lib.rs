//! respack-lib: Android resource packaging steps
//!
//! This crate plans and runs the steps that turn an Android target's
//! resources into an unsigned resource archive:
//! - `resources`: density and locale filtering of resource directories
//! - `assets`: merging asset and native library directories
//! - `package`: the aapt packaging pipeline and its configuration
//! - `step`: the step model and sequential runner
//! - `rulekey` / `artifact`: cache keys and recorded outputs

pub mod artifact;
pub mod assets;
pub mod consts;
pub mod deps;
pub mod filesystem;
pub mod package;
pub mod platform;
pub mod resources;
pub mod rulekey;
pub mod step;
pub mod target;
pub mod util;
