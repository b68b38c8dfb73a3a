//! JSON packaging requests.
//!
//! A request describes one target: its manifest, the Android library graph it
//! depends on, how to filter resources and where the Android tools are. It is
//! turned into a [`PackagePlan`] by [`PackageRequest::into_plan`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifact::{ArtifactRecorder, RecordedArtifacts};
use crate::deps::{DependencyGraph, LibraryNode};
use crate::filesystem::ProjectFilesystem;
use crate::platform::TargetCpuType;
use crate::platform::paths::{aapt_override, android_jar_override, image_scaler};
use crate::resources::{Density, FilterOptions, FilterResourcesStep, ImageMagickScaler, ResourceDirectoryMapping};
use crate::rulekey::RuleKey;
use crate::step::{ExecutionContext, PipelineError, RunReport, Step, run_steps};
use crate::target::BuildTarget;

use super::aapt::Aapt;
use super::config::{ConfigError, PackageConfig, PackageConfigFields, PackageType, SourcePath};
use super::pipeline::{AaptPackageResources, PackageError, PackageOutcome, filtered_res_directory};

const DEFAULT_AAPT: &str = "aapt";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRequest {
  /// Keep only drawables for these densities. Empty disables drawable filtering.
  pub densities: BTreeSet<Density>,
  /// Drop non-English strings outside whitelisted libraries.
  pub strings: bool,
  pub require_scaler: bool,
}

impl FilterRequest {
  pub fn is_enabled(&self) -> bool {
    !self.densities.is_empty() || self.strings
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AndroidPlatform {
  pub aapt: Option<PathBuf>,
  pub android_jar: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRequest {
  pub target: Option<BuildTarget>,
  pub manifest: Option<SourcePath>,
  pub package_type: Option<PackageType>,
  #[serde(default)]
  pub cpu_filters: BTreeSet<TargetCpuType>,
  /// Libraries the target depends on directly.
  #[serde(default)]
  pub deps: Vec<BuildTarget>,
  #[serde(default)]
  pub libraries: Vec<LibraryNode>,
  #[serde(default)]
  pub store_strings_as_assets: bool,
  #[serde(default)]
  pub filter: FilterRequest,
  #[serde(default)]
  pub android: AndroidPlatform,
}

impl PackageRequest {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Validate the request and plan it against `out_dir`.
  ///
  /// `RESPACK_AAPT`, `RESPACK_ANDROID_JAR` and `RESPACK_IMAGE_SCALER` take
  /// precedence over the request's own tool locations.
  pub fn into_plan(self, out_dir: &Path) -> Result<PackagePlan, ConfigError> {
    let target = self.target.ok_or(ConfigError::MissingField("target"))?;
    let graph = DependencyGraph::new(self.libraries)?;
    let transitive = graph.transitive(&self.deps)?;

    let mut filter = None;
    let mut resource_directories = None;
    if self.filter.is_enabled() && !transitive.resource_directories.is_empty() {
      let mapping = ResourceDirectoryMapping::for_destination(
        &transitive.resource_directories,
        &filtered_res_directory(out_dir, &target),
      )?;
      resource_directories = Some(mapping.outputs().into_iter().map(Path::to_path_buf).collect());
      let options = FilterOptions {
        filter_drawables: !self.filter.densities.is_empty(),
        filter_strings: self.filter.strings,
        whitelisted_string_dirs: transitive.whitelisted_string_dirs.clone(),
        target_densities: self.filter.densities,
        require_scaler: self.filter.require_scaler,
      };
      let step = FilterResourcesStep::new(mapping, options)?.with_scaler(ImageMagickScaler::new(image_scaler()));
      filter = Some(step);
    }

    let aapt = aapt_override()
      .or(self.android.aapt)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_AAPT));
    let android_jar = android_jar_override()
      .or(self.android.android_jar)
      .ok_or(ConfigError::MissingField("android.android_jar"))?;

    let config = PackageConfig::new(PackageConfigFields {
      target: Some(target),
      manifest: self.manifest,
      package_type: self.package_type,
      cpu_filters: self.cpu_filters,
      resource_directories,
      transitive,
      store_strings_as_assets: self.store_strings_as_assets,
    })?;
    debug!(
      build_target = %config.target,
      filtered = filter.is_some(),
      res = config.resource_directories.len(),
      "planned package request"
    );

    Ok(PackagePlan {
      filter,
      packager: AaptPackageResources::new(config, Aapt::new(aapt, android_jar), out_dir),
    })
  }
}

/// A validated request: optional resource filtering followed by packaging.
#[derive(Debug)]
pub struct PackagePlan {
  filter: Option<FilterResourcesStep>,
  packager: AaptPackageResources,
}

impl PackagePlan {
  pub fn packager(&self) -> &AaptPackageResources {
    &self.packager
  }

  pub fn has_filter(&self) -> bool {
    self.filter.is_some()
  }

  pub fn rule_key(&self, fs: &ProjectFilesystem) -> Result<RuleKey, PackageError> {
    self.packager.rule_key(fs)
  }

  /// Every step, filtering first. Filtered resource directories are recorded
  /// alongside the packager's outputs.
  pub fn into_steps(self, recorder: &mut dyn ArtifactRecorder) -> Vec<Step> {
    let mut steps = Vec::new();
    if let Some(filter) = self.filter {
      for output in filter.mapping().outputs() {
        recorder.record_artifact(output);
      }
      steps.push(Step::FilterResources(Box::new(filter)));
    }
    steps.extend(self.packager.build_steps(recorder));
    steps
  }

  /// Run only the resource filtering.
  pub fn run_filter(self, ctx: &ExecutionContext) -> Result<RunReport, PipelineError> {
    let target = self.packager.config().target.clone();
    let steps: Vec<Step> = self
      .filter
      .map(|filter| Step::FilterResources(Box::new(filter)))
      .into_iter()
      .collect();
    run_steps(&steps, ctx, &target)
  }

  /// Filter, package and write the artifact manifest.
  pub fn run(self, ctx: &ExecutionContext) -> Result<PackageOutcome, PackageError> {
    let rule_key = self.rule_key(ctx.filesystem())?;
    let packager = self.packager.clone();
    let mut recorded = RecordedArtifacts::new();
    let steps = self.into_steps(&mut recorded);
    packager.finish(ctx, rule_key, &steps, &recorded)
  }
}
