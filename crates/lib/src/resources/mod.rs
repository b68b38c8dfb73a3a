//! Android resource filtering.
//!
//! - [`density`]: density buckets and drawable qualifiers
//! - [`drawable`]: drawable discovery and density selection
//! - [`strings`]: locale classification of string resources
//! - [`scaler`]: image downscaling
//! - [`copier`]: predicate-filtered directory copies
//! - [`mapping`]: input to output resource directory mapping
//! - [`filter`]: the step tying them together

pub mod copier;
pub mod density;
pub mod drawable;
pub mod filter;
pub mod mapping;
pub mod scaler;
pub mod strings;

pub use copier::{CopyStats, DefaultFilteredDirectoryCopier, FilteredDirectoryCopier};
pub use density::Density;
pub use drawable::{DefaultDrawableFinder, DensityFilter, DrawableFinder};
pub use filter::{FilterOptions, FilterOptionsError, FilterResourcesStep};
pub use mapping::{MappingError, ResourceDirectoryMapping};
pub use scaler::{ImageMagickScaler, ImageScaler};
pub use strings::StringResourceFilter;
