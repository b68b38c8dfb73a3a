mod filter;
mod package;
mod rule_key;
mod steps;

pub use filter::cmd_filter;
pub use package::cmd_package;
pub use rule_key::cmd_rule_key;
pub use steps::cmd_steps;

use std::path::Path;

use anyhow::{Context, Result};

use respack_lib::package::{PackagePlan, PackageRequest};
use respack_lib::platform::paths::out_dir;

/// Load a request file and plan it against the output root.
fn load_plan(request: &Path) -> Result<PackagePlan> {
  let request_file = request.display().to_string();
  PackageRequest::load(request)
    .with_context(|| format!("Failed to load package request: {}", request_file))?
    .into_plan(&out_dir())
    .with_context(|| format!("Invalid package request: {}", request_file))
}
