//! The filter_resources step.
//!
//! Copies each input resource directory to its filtered output directory,
//! dropping drawables for unwanted densities and non-English strings, then
//! downscales drawables that were kept only because their target density was
//! missing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::step::{ExecutionContext, StepError};

use super::copier::{DefaultFilteredDirectoryCopier, FilteredDirectoryCopier};
use super::density::Density;
use super::drawable::{
  DefaultDrawableFinder, DensityFilter, Downscale, DrawableFinder, is_nine_patch, select_densities,
};
use super::mapping::ResourceDirectoryMapping;
use super::scaler::{ImageMagickScaler, ImageScaler};
use super::strings::StringResourceFilter;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterOptionsError {
  #[error("drawable filtering needs at least one target density")]
  NoTargetDensities,
}

/// What to filter. Validated by [`FilterResourcesStep::new`].
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
  pub filter_drawables: bool,
  pub filter_strings: bool,
  /// Resource directories whose string resources are never filtered.
  pub whitelisted_string_dirs: BTreeSet<PathBuf>,
  pub target_densities: BTreeSet<Density>,
  /// Fail instead of shipping unscaled drawables when the scaler is missing.
  pub require_scaler: bool,
}

pub struct FilterResourcesStep {
  mapping: ResourceDirectoryMapping,
  options: FilterOptions,
  copier: Box<dyn FilteredDirectoryCopier>,
  finder: Box<dyn DrawableFinder>,
  scaler: Box<dyn ImageScaler>,
}

impl std::fmt::Debug for FilterResourcesStep {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FilterResourcesStep")
      .field("mapping", &self.mapping)
      .field("options", &self.options)
      .field("scaler", &self.scaler.name())
      .finish_non_exhaustive()
  }
}

impl FilterResourcesStep {
  pub fn new(mapping: ResourceDirectoryMapping, options: FilterOptions) -> Result<Self, FilterOptionsError> {
    if options.filter_drawables && options.target_densities.is_empty() {
      return Err(FilterOptionsError::NoTargetDensities);
    }
    Ok(Self {
      mapping,
      options,
      copier: Box::new(DefaultFilteredDirectoryCopier),
      finder: Box::new(DefaultDrawableFinder),
      scaler: Box::new(ImageMagickScaler::default()),
    })
  }

  pub fn with_copier(mut self, copier: impl FilteredDirectoryCopier + 'static) -> Self {
    self.copier = Box::new(copier);
    self
  }

  pub fn with_finder(mut self, finder: impl DrawableFinder + 'static) -> Self {
    self.finder = Box::new(finder);
    self
  }

  pub fn with_scaler(mut self, scaler: impl ImageScaler + 'static) -> Self {
    self.scaler = Box::new(scaler);
    self
  }

  pub fn mapping(&self) -> &ResourceDirectoryMapping {
    &self.mapping
  }

  pub fn description(&self) -> String {
    let densities: Vec<&str> = self.options.target_densities.iter().map(Density::as_str).collect();
    format!(
      "filter_resources {} dir(s), drawables: {}, strings: {}",
      self.mapping.len(),
      if self.options.filter_drawables {
        densities.join(",")
      } else {
        "all".to_string()
      },
      if self.options.filter_strings { "default locale" } else { "all" }
    )
  }

  pub fn execute(&self, ctx: &ExecutionContext) -> Result<(), StepError> {
    let fs = ctx.filesystem();

    let mut can_downscale = false;
    let density_filter = if self.options.filter_drawables {
      can_downscale = self.scaler.is_available(ctx);
      if !can_downscale {
        if self.options.require_scaler {
          return Err(StepError::CapabilityUnavailable {
            capability: self.scaler.name().to_string(),
            hint: "install it or disable require_scaler to ship unscaled drawables".to_string(),
          });
        }
        warn!(scaler = self.scaler.name(), "image scaler unavailable, drawables will not be downscaled");
      }
      let drawables = self
        .finder
        .find_drawables(fs, &self.mapping.inputs())
        .map_err(StepError::Io)?;
      DensityFilter::new(&drawables, &self.options.target_densities)
    } else {
      DensityFilter::disabled()
    };

    let string_filter =
      StringResourceFilter::new(self.options.filter_strings, self.options.whitelisted_string_dirs.clone());

    let stats = self.copier.copy_dirs(fs, &self.mapping, &|path| {
      density_filter.keep(path) && string_filter.keep(path)
    })?;
    info!(
      copied = stats.copied,
      skipped = stats.skipped,
      dropped_drawables = density_filter.removed().len(),
      "filtered resources"
    );

    if can_downscale {
      self.scale_unmatched_drawables(ctx)?;
    }
    Ok(())
  }

  /// Downscale drawables in the output directories into each missing target
  /// density, then delete every non-target source after its last use.
  fn scale_unmatched_drawables(&self, ctx: &ExecutionContext) -> Result<(), StepError> {
    let fs = ctx.filesystem();

    let drawables = self
      .finder
      .find_drawables(fs, &self.mapping.outputs())
      .map_err(StepError::Io)?;
    let downscales: Vec<Downscale> = select_densities(&drawables, &self.options.target_densities)
      .downscales
      .into_iter()
      .filter(|downscale| !is_nine_patch(&downscale.source))
      .collect();

    // Sources at a target density stay; the others go after their last use.
    let mut pending: BTreeMap<&Path, usize> = BTreeMap::new();
    for downscale in &downscales {
      if !self.options.target_densities.contains(&downscale.source_density) {
        *pending.entry(downscale.source.as_path()).or_default() += 1;
      }
    }

    for downscale in &downscales {
      let Downscale {
        source,
        destination,
        ratio,
        ..
      } = downscale;
      debug!(source = ?source, destination = ?destination, ratio, "downscaling drawable");
      fs.create_parent_dirs(destination)
        .map_err(StepError::fs("mkdir", destination))?;
      self.scaler.scale(*ratio, source, destination, ctx)?;

      let Some(uses) = pending.get_mut(source.as_path()) else {
        continue;
      };
      *uses -= 1;
      if *uses > 0 {
        continue;
      }
      fs.delete_file(source).map_err(StepError::fs("delete", source))?;
      if let Some(dir) = source.parent() {
        let remaining = fs.list_files(dir).map_err(StepError::fs("list", dir))?;
        if remaining.is_empty() {
          fs.delete_empty_dir(dir).map_err(StepError::fs("rmdir", dir))?;
        }
      }
    }
    Ok(())
  }
}
