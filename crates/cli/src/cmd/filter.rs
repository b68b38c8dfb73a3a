//! Implementation of the `respack filter` command.

use std::path::Path;

use anyhow::{Context, Result};

use respack_lib::step::{ExecutionContext, Verbosity};

use crate::output::{self, OutputFormat, format_duration, print_info, print_json, print_stat, print_success};

pub fn cmd_filter(request: &Path, root: &Path, verbosity: Verbosity, format: OutputFormat) -> Result<()> {
  let plan = super::load_plan(request)?;
  let config = plan.packager().config();
  let build_target = config.target.to_string();
  let resource_directories = config.resource_directories.clone();
  let filtered = plan.has_filter();

  let ctx = ExecutionContext::new(root).with_verbosity(verbosity);
  let report = plan
    .run_filter(&ctx)
    .with_context(|| format!("Failed to filter resources of {}", build_target))?;

  if format.is_json() {
    let json_output = serde_json::json!({
      "build_target": build_target,
      "filtered": filtered,
      "resource_directories": resource_directories,
      "duration_ms": report.duration.as_millis(),
    });
    print_json(&json_output)?;
  } else if !filtered {
    print_info("No resource filtering requested");
  } else {
    print_success(&format!("Filtered resources of {}", build_target));
    for dir in &resource_directories {
      println!("  {} {}", output::symbols::INFO, dir.display());
    }
    print_stat("Duration", &format_duration(report.duration));
  }

  Ok(())
}
