//! Resource packaging: turning a target's resources, assets and manifest into
//! an unsigned resource archive with aapt.

pub mod aapt;
pub mod config;
pub mod pipeline;
pub mod request;
pub mod strings;

pub use aapt::{Aapt, AaptParams, AaptStep};
pub use config::{ConfigError, PackageConfig, PackageConfigFields, PackageType, SourcePath};
pub use pipeline::{AaptPackageResources, PackageError, PackageOutcome};
pub use request::{PackagePlan, PackageRequest};
pub use strings::{CompileStringsStep, LocaleBundleCompiler, StringBundleCompiler};
