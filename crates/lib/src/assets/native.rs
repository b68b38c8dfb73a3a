//! Copying native libraries into the assets tree.

use std::collections::BTreeSet;
use std::path::Path;

use crate::platform::TargetCpuType;
use crate::step::Step;

/// Append the steps that copy the native libraries in `source` to `destination`.
///
/// With no CPU filters the whole directory is copied. Otherwise only the ABI
/// subdirectories of the allowed CPUs are copied, each only if it exists.
pub fn copy_native_library(
  source: &Path,
  destination: &Path,
  cpu_filters: &BTreeSet<TargetCpuType>,
  steps: &mut Vec<Step>,
) {
  if cpu_filters.is_empty() {
    steps.push(Step::copy(source, destination, true));
    return;
  }

  for cpu in cpu_filters {
    let abi = cpu.abi_directory();
    steps.push(Step::CopyDirectoryIfPresent {
      source: source.join(abi),
      destination: destination.join(abi),
    });
  }
}
