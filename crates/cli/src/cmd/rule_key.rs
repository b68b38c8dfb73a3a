use std::path::Path;

use anyhow::{Context, Result};

use respack_lib::filesystem::ProjectFilesystem;

use crate::output::{OutputFormat, print_json};

pub fn cmd_rule_key(request: &Path, root: &Path, format: OutputFormat) -> Result<()> {
  let plan = super::load_plan(request)?;
  let build_target = plan.packager().config().target.to_string();
  let rule_key = plan
    .rule_key(&ProjectFilesystem::new(root))
    .with_context(|| format!("Failed to compute rule key of {}", build_target))?;

  if format.is_json() {
    print_json(&serde_json::json!({ "build_target": build_target, "rule_key": rule_key }))?;
  } else {
    println!("{}", rule_key);
  }

  Ok(())
}
