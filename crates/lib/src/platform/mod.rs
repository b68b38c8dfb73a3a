//! Host and target platform helpers.
//!
//! - [`cpu`] - Android target cpu types and their ABI directories
//! - [`link`] - Symlink creation
//! - [`paths`] - Output root locations

pub mod cpu;
pub mod link;
pub mod paths;

pub use cpu::TargetCpuType;
