//! Implementation of the `respack steps` command.
//!
//! Prints the steps `respack package` would run, without running them. The
//! deferred asset step is shown by name only since its sub-steps depend on
//! what earlier steps produce.

use std::path::Path;

use anyhow::Result;

use respack_lib::artifact::RecordedArtifacts;
use respack_lib::step::{ExecutionContext, Verbosity, describe_steps};

use crate::output::{OutputFormat, print_json, print_step};

pub fn cmd_steps(request: &Path, root: &Path, verbosity: Verbosity, format: OutputFormat) -> Result<()> {
  let plan = super::load_plan(request)?;
  let ctx = ExecutionContext::new(root).with_verbosity(verbosity);
  let steps = plan.into_steps(&mut RecordedArtifacts::new());
  let described = describe_steps(&steps, &ctx);

  if format.is_json() {
    print_json(&described)?;
  } else {
    for (index, step) in described.iter().enumerate() {
      print_step(index + 1, &step.short_name, &step.description);
    }
  }

  Ok(())
}
