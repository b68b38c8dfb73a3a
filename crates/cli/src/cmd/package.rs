//! Implementation of the `respack package` command.
//!
//! Filters the request's resource directories, packages them with aapt and
//! writes the artifact manifest next to the archive.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use respack_lib::step::{ExecutionContext, Verbosity};

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success, truncate_hash};

#[derive(Serialize)]
struct PackageSummary {
  build_target: String,
  rule_key: String,
  resource_apk: PathBuf,
  artifact_manifest: PathBuf,
  steps: Vec<String>,
  duration_ms: u128,
}

pub fn cmd_package(request: &Path, root: &Path, verbosity: Verbosity, format: OutputFormat) -> Result<()> {
  let plan = super::load_plan(request)?;
  let build_target = plan.packager().config().target.to_string();

  let ctx = ExecutionContext::new(root).with_verbosity(verbosity);
  let outcome = plan
    .run(&ctx)
    .with_context(|| format!("Failed to package {}", build_target))?;

  if format.is_json() {
    print_json(&PackageSummary {
      build_target,
      rule_key: outcome.rule_key.to_string(),
      resource_apk: outcome.resource_apk,
      artifact_manifest: outcome.artifact_manifest,
      steps: outcome.report.executed,
      duration_ms: outcome.report.duration.as_millis(),
    })?;
  } else {
    print_success(&format!("Packaged {}", build_target));
    print_stat("Archive", &outcome.resource_apk.display().to_string());
    print_stat("Artifacts", &outcome.artifact_manifest.display().to_string());
    print_stat("Rule key", truncate_hash(&outcome.rule_key.0));
    print_stat("Steps", &outcome.report.executed.len().to_string());
    print_stat("Duration", &format_duration(outcome.report.duration));
  }

  Ok(())
}
