//! The aapt_package step pipeline.
//!
//! Lays out everything aapt needs under the per-target output directories and
//! then runs aapt once:
//!
//! ```text
//! bin/<base>/__manifest_<short>__/AndroidManifest.xml   symlink to the manifest
//! bin/<base>/__strings_<short>__/                       compiled string bundle
//! bin/<base>/__assets_<short>__/                        merged assets, lib/, strings/
//! gen/<base>/<short>.unsigned.ap_                       the resource archive
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::artifact::{ArtifactError, ArtifactManifest, ArtifactRecorder, RecordedArtifacts};
use crate::assets::{copy_native_library, create_all_assets_directory};
use crate::consts::{
  ANDROID_MANIFEST_XML, ARTIFACT_MANIFEST, BIN_DIR, GEN_DIR, NATIVE_LIBS_ASSETS_DIR, RESOURCE_APK_SUFFIX,
  STRING_ASSETS_DIR,
};
use crate::filesystem::ProjectFilesystem;
use crate::rulekey::{RuleKey, RuleKeyBuilder, RuleKeyError, sorted_set_string};
use crate::step::{DeferredStep, ExecutionContext, PipelineError, RunReport, Step, StepError, run_steps};
use crate::target::BuildTarget;
use crate::util::hash::DirHashError;

use super::aapt::{Aapt, AaptParams, AaptStep};
use super::config::PackageConfig;
use super::strings::{CompileStringsStep, LocaleBundleCompiler};

/// Rule type folded into every rule key of this pipeline.
pub const RULE_TYPE: &str = "aapt_package";

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("failed to hash the manifest: {0}")]
  Manifest(#[from] DirHashError),

  #[error(transparent)]
  RuleKey(#[from] RuleKeyError),

  #[error(transparent)]
  Pipeline(#[from] PipelineError),

  #[error("failed to write the artifact manifest: {0}")]
  Artifacts(#[from] ArtifactError),
}

impl PackageError {
  pub fn exit_code(&self) -> i32 {
    match self {
      PackageError::Pipeline(e) => e.exit_code(),
      _ => 1,
    }
  }
}

/// Result of a successful packaging run.
#[derive(Debug, Clone)]
pub struct PackageOutcome {
  pub rule_key: RuleKey,
  pub resource_apk: PathBuf,
  pub artifact_manifest: PathBuf,
  pub report: RunReport,
}

/// `<out>/<kind>/<base>/<name>` for a target.
fn target_path(out_dir: &Path, kind: &str, target: &BuildTarget, name: &str) -> PathBuf {
  out_dir
    .join(kind)
    .join(format!("{}{}", target.base_path_with_slash(), name))
}

/// Where the filtered copies of a target's resource directories go.
pub fn filtered_res_directory(out_dir: &Path, target: &BuildTarget) -> PathBuf {
  target_path(
    out_dir,
    BIN_DIR,
    target,
    &format!("__filtered_res_{}__", target.short_name()),
  )
}

/// Packages the resources and assets of one target into an unsigned archive.
#[derive(Debug, Clone)]
pub struct AaptPackageResources {
  config: PackageConfig,
  aapt: Aapt,
  out_dir: PathBuf,
}

impl AaptPackageResources {
  pub fn new(config: PackageConfig, aapt: Aapt, out_dir: impl Into<PathBuf>) -> Self {
    Self {
      config,
      aapt,
      out_dir: out_dir.into(),
    }
  }

  pub fn config(&self) -> &PackageConfig {
    &self.config
  }

  fn bin_path(&self, name: &str) -> PathBuf {
    target_path(&self.out_dir, BIN_DIR, &self.config.target, name)
  }

  fn gen_path(&self, name: &str) -> PathBuf {
    target_path(&self.out_dir, GEN_DIR, &self.config.target, name)
  }

  pub fn android_manifest(&self) -> PathBuf {
    self
      .bin_path(&format!("__manifest_{}__", self.config.target.short_name()))
      .join(ANDROID_MANIFEST_XML)
  }

  pub fn assets_directory(&self) -> PathBuf {
    self.bin_path(&format!("__assets_{}__", self.config.target.short_name()))
  }

  pub fn strings_directory(&self) -> PathBuf {
    self.bin_path(&format!("__strings_{}__", self.config.target.short_name()))
  }

  pub fn resource_apk(&self) -> PathBuf {
    self.gen_path(&format!("{}{}", self.config.target.short_name(), RESOURCE_APK_SUFFIX))
  }

  pub fn artifact_manifest(&self) -> PathBuf {
    self.gen_path(&format!("{}.{}", self.config.target.short_name(), ARTIFACT_MANIFEST))
  }

  /// Whether the compiled string bundle is produced and shipped.
  fn compiles_strings(&self) -> bool {
    self.config.store_strings_as_assets && !self.config.resource_directories.is_empty()
  }

  /// Plan the pipeline, recording the outputs a cache should keep.
  pub fn build_steps(&self, recorder: &mut dyn ArtifactRecorder) -> Vec<Step> {
    let config = &self.config;
    let mut steps = Vec::new();

    let manifest = self.android_manifest();
    steps.push(Step::mkdir_and_symlink_file(config.manifest.path(), &manifest));
    recorder.record_artifact(&manifest);

    let strings = self.strings_directory();
    if self.compiles_strings() {
      steps.push(Step::make_clean_directory(&strings));
      steps.push(Step::CompileStrings(
        CompileStringsStep::new(config.transitive.resource_directories.clone(), &strings).with_compiler(
          LocaleBundleCompiler::new(config.transitive.whitelisted_string_dirs.clone()),
        ),
      ));
    }

    let assets = config
      .transitive
      .assets
      .unified_assets_dir(config.store_strings_as_assets, &self.assets_directory());
    if let Some(assets) = &assets {
      let dirs = config.transitive.assets.asset_dirs();
      let destination = assets.clone();
      steps.push(Step::Deferred(DeferredStep::new(
        "symlink_assets",
        config.target.clone(),
        Box::new(move |ctx| {
          let planned = create_all_assets_directory(ctx.filesystem(), &dirs, &destination).map_err(StepError::Io)?;
          Ok(planned.unwrap_or_else(|| vec![Step::make_clean_directory(&destination)]))
        }),
      )));

      let native = &config.transitive.assets.native_lib_assets_directories;
      if !native.is_empty() {
        let lib = assets.join(NATIVE_LIBS_ASSETS_DIR);
        steps.push(Step::make_clean_directory(&lib));
        for source in native {
          copy_native_library(&source.dir, &lib, &config.cpu_filters, &mut steps);
        }
      }

      if config.store_strings_as_assets {
        let bundle = assets.join(STRING_ASSETS_DIR);
        steps.push(Step::make_clean_directory(&bundle));
        if self.compiles_strings() {
          steps.push(Step::copy(&strings, &bundle, true));
        }
      }
    }

    let resource_apk = self.resource_apk();
    if let Some(parent) = resource_apk.parent() {
      steps.push(Step::mkdir(parent));
    }

    steps.push(Step::Aapt(AaptStep::new(
      self.aapt.clone(),
      AaptParams {
        manifest,
        resource_directories: config.resource_directories.clone(),
        assets_directory: assets,
        output: resource_apk.clone(),
        crunch_png: config.package_type.is_crunch_png_files(),
      },
    )));
    recorder.record_artifact(&resource_apk);

    steps
  }

  /// Hash of the inputs that determine the archive.
  pub fn rule_key(&self, fs: &ProjectFilesystem) -> Result<RuleKey, PackageError> {
    let cpu_filters = sorted_set_string(self.config.cpu_filters.iter().map(|cpu| cpu.as_str()));
    let key = RuleKeyBuilder::new(RULE_TYPE)
      .set("manifest", self.config.manifest.as_reference(fs)?)?
      .set("packageType", self.config.package_type.as_str())?
      .set("cpuFilters", cpu_filters)?
      .build();
    Ok(key)
  }

  /// Hash the recorded outputs and write them next to the archive.
  pub fn write_artifacts(
    &self,
    fs: &ProjectFilesystem,
    rule_key: RuleKey,
    recorded: &RecordedArtifacts,
  ) -> Result<PathBuf, PackageError> {
    let manifest = ArtifactManifest::collect(fs, &self.config.target.to_string(), rule_key, recorded)?;
    let path = self.artifact_manifest();
    manifest.write(&fs.resolve(&path))?;
    Ok(path)
  }

  /// Run the pipeline on its own.
  pub fn package(&self, ctx: &ExecutionContext) -> Result<PackageOutcome, PackageError> {
    let rule_key = self.rule_key(ctx.filesystem())?;
    let mut recorded = RecordedArtifacts::new();
    let steps = self.build_steps(&mut recorded);
    self.finish(ctx, rule_key, &steps, &recorded)
  }

  /// Run already planned steps and write the artifact manifest.
  pub(crate) fn finish(
    &self,
    ctx: &ExecutionContext,
    rule_key: RuleKey,
    steps: &[Step],
    recorded: &RecordedArtifacts,
  ) -> Result<PackageOutcome, PackageError> {
    let report = run_steps(steps, ctx, &self.config.target)?;
    let artifact_manifest = self.write_artifacts(ctx.filesystem(), rule_key.clone(), recorded)?;
    info!(
      build_target = %self.config.target,
      rule_key = %rule_key,
      archive = ?self.resource_apk(),
      "packaged resources"
    );
    Ok(PackageOutcome {
      rule_key,
      resource_apk: self.resource_apk(),
      artifact_manifest,
      report,
    })
  }
}
