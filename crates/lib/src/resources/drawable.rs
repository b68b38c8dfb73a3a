//! Finding drawables and deciding which densities to keep.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::filesystem::ProjectFilesystem;

use super::density::{Density, DrawableQualifiers, with_density};

const DRAWABLE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Enumerates drawable files below a set of resource directories.
pub trait DrawableFinder {
  /// Every drawable below `dirs`, as each directory joined with the file's relative path.
  fn find_drawables(&self, fs: &ProjectFilesystem, dirs: &[&Path]) -> io::Result<BTreeSet<PathBuf>>;
}

/// Walks the directories and keeps image files inside `drawable*` directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDrawableFinder;

impl DrawableFinder for DefaultDrawableFinder {
  fn find_drawables(&self, fs: &ProjectFilesystem, dirs: &[&Path]) -> io::Result<BTreeSet<PathBuf>> {
    let mut drawables = BTreeSet::new();
    for dir in dirs {
      if !fs.is_dir(dir) {
        trace!(dir = ?dir, "resource directory missing, no drawables");
        continue;
      }
      for file in fs.walk(dir) {
        let file = file?;
        if is_drawable(&file.path) {
          drawables.insert(file.path);
        }
      }
    }
    Ok(drawables)
  }
}

/// Whether `path` is an image inside a `drawable*` resource directory.
pub fn is_drawable(path: &Path) -> bool {
  let in_drawable_dir = path
    .parent()
    .and_then(Path::file_name)
    .is_some_and(|name| name.to_string_lossy().starts_with("drawable"));
  let is_image = path
    .extension()
    .is_some_and(|ext| DRAWABLE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)));
  in_drawable_dir && is_image
}

/// Nine-patch images carry stretch markers in their pixels and must never be scaled.
pub fn is_nine_patch(path: &Path) -> bool {
  path
    .file_name()
    .is_some_and(|name| name.to_string_lossy().ends_with(".9.png"))
}

/// A drawable and what its directory says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawableEntry {
  pub path: PathBuf,
  pub qualifiers: DrawableQualifiers,
}

impl DrawableEntry {
  pub fn classify(path: &Path) -> Self {
    Self {
      path: path.to_path_buf(),
      qualifiers: DrawableQualifiers::from_path(path),
    }
  }

  pub fn density(&self) -> Option<Density> {
    self.qualifiers.density
  }
}

/// Variants of one logical drawable: same resource directory, file name and
/// non-density qualifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DrawableGroup {
  res_dir: PathBuf,
  file_name: String,
  others: String,
}

impl DrawableGroup {
  fn of(entry: &DrawableEntry) -> Self {
    let res_dir = entry
      .path
      .parent()
      .and_then(Path::parent)
      .map(Path::to_path_buf)
      .unwrap_or_default();
    let file_name = entry
      .path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    Self {
      res_dir,
      file_name,
      others: entry.qualifiers.others.clone(),
    }
  }
}

/// One planned downscale: `source` is resized into `destination` at `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Downscale {
  pub source: PathBuf,
  pub source_density: Density,
  pub destination: PathBuf,
  pub target: Density,
  pub ratio: f64,
}

/// Outcome of [`select_densities`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DensitySelection {
  pub removed: BTreeSet<PathBuf>,
  pub downscales: Vec<Downscale>,
}

/// Decide which drawables to keep, drop and downscale for the target densities.
///
/// Per logical drawable:
/// - variants whose density is a target are kept;
/// - variants without a density are always kept, and stand in for MDPI;
/// - for every target that is missing, the nearest higher density is kept
///   and a downscale to that target is planned;
/// - everything else is dropped.
///
/// A missing target with no higher density available gets no substitute.
pub fn select_densities(drawables: &BTreeSet<PathBuf>, targets: &BTreeSet<Density>) -> DensitySelection {
  let mut selection = DensitySelection::default();
  if targets.is_empty() {
    return selection;
  }

  let mut groups: BTreeMap<DrawableGroup, Vec<DrawableEntry>> = BTreeMap::new();
  for path in drawables {
    let entry = DrawableEntry::classify(path);
    groups.entry(DrawableGroup::of(&entry)).or_default().push(entry);
  }

  for (group, entries) in groups {
    let mut available: BTreeMap<Density, &Path> = BTreeMap::new();
    let mut has_unqualified = false;
    for entry in &entries {
      match entry.density() {
        Some(density) => {
          available.insert(density, &entry.path);
        }
        None => has_unqualified = true,
      }
    }

    let provides = |density: Density| available.contains_key(&density) || (has_unqualified && density == Density::Mdpi);

    let mut keep: BTreeSet<Density> = available.keys().copied().filter(|d| targets.contains(d)).collect();
    for &target in targets {
      if provides(target) {
        continue;
      }
      let Some((&source_density, &source)) = available.range(target..).next() else {
        debug!(drawable = %group.file_name, density = %target, "no density to scale from");
        continue;
      };
      keep.insert(source_density);
      let Some(destination) = with_density(source, target) else {
        continue;
      };
      trace!(drawable = %group.file_name, source = %source_density, density = %target, "planning downscale");
      selection.downscales.push(Downscale {
        source: source.to_path_buf(),
        source_density,
        destination,
        target,
        ratio: target.scale() / source_density.scale(),
      });
    }

    for (density, path) in &available {
      if !keep.contains(density) {
        selection.removed.insert(path.to_path_buf());
      }
    }
  }

  selection
}

/// The drawables [`select_densities`] drops.
pub fn filter_by_density(drawables: &BTreeSet<PathBuf>, targets: &BTreeSet<Density>) -> BTreeSet<PathBuf> {
  select_densities(drawables, targets).removed
}

/// Keep-predicate over file paths built from [`filter_by_density`].
#[derive(Debug, Clone, Default)]
pub struct DensityFilter {
  enabled: bool,
  removed: BTreeSet<PathBuf>,
}

impl DensityFilter {
  /// A filter that keeps every file.
  pub fn disabled() -> Self {
    Self::default()
  }

  pub fn new(drawables: &BTreeSet<PathBuf>, targets: &BTreeSet<Density>) -> Self {
    Self {
      enabled: true,
      removed: filter_by_density(drawables, targets),
    }
  }

  pub fn keep(&self, path: &Path) -> bool {
    !self.enabled || !self.removed.contains(path)
  }

  pub fn removed(&self) -> &BTreeSet<PathBuf> {
    &self.removed
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn paths(items: &[&str]) -> BTreeSet<PathBuf> {
    items.iter().map(PathBuf::from).collect()
  }

  fn densities(items: &[Density]) -> BTreeSet<Density> {
    items.iter().copied().collect()
  }

  #[test]
  fn keeps_targets_and_drops_the_rest() {
    let drawables = paths(&[
      "a/res/drawable-mdpi/some.png",
      "a/res/drawable-hdpi/some.png",
      "a/res/drawable-xhdpi/some.png",
    ]);
    let removed = filter_by_density(&drawables, &densities(&[Density::Mdpi]));
    assert_eq!(
      removed,
      paths(&["a/res/drawable-hdpi/some.png", "a/res/drawable-xhdpi/some.png"])
    );
  }

  #[test]
  fn keeps_nearest_higher_density_when_target_missing() {
    let drawables = paths(&[
      "a/res/drawable-ldpi/other.png",
      "a/res/drawable-xhdpi/other.png",
      "a/res/drawable-xxhdpi/other.png",
    ]);
    let removed = filter_by_density(&drawables, &densities(&[Density::Mdpi]));
    assert_eq!(
      removed,
      paths(&["a/res/drawable-ldpi/other.png", "a/res/drawable-xxhdpi/other.png"])
    );
  }

  #[test]
  fn each_missing_target_gets_its_own_source() {
    let drawables = paths(&["a/res/drawable-hdpi/x.png", "a/res/drawable-xxhdpi/x.png"]);
    let selection = select_densities(&drawables, &densities(&[Density::Mdpi, Density::Xhdpi]));

    assert!(selection.removed.is_empty());
    let planned: Vec<(&Path, &Path, Density)> = selection
      .downscales
      .iter()
      .map(|d| (d.source.as_path(), d.destination.as_path(), d.target))
      .collect();
    assert_eq!(
      planned,
      vec![
        (
          Path::new("a/res/drawable-hdpi/x.png"),
          Path::new("a/res/drawable-mdpi/x.png"),
          Density::Mdpi
        ),
        (
          Path::new("a/res/drawable-xxhdpi/x.png"),
          Path::new("a/res/drawable-xhdpi/x.png"),
          Density::Xhdpi
        ),
      ]
    );
    assert!(selection.downscales.iter().all(|d| d.ratio < 1.0));
    assert_eq!(selection.downscales[0].source_density, Density::Hdpi);
  }

  #[test]
  fn one_source_can_serve_several_targets() {
    let drawables = paths(&["a/res/drawable-ldpi/y.png", "a/res/drawable-xhdpi/y.png"]);
    let selection = select_densities(&drawables, &densities(&[Density::Mdpi, Density::Hdpi]));

    assert_eq!(selection.removed, paths(&["a/res/drawable-ldpi/y.png"]));
    let targets: Vec<(Density, f64)> = selection.downscales.iter().map(|d| (d.target, d.ratio)).collect();
    assert_eq!(targets, vec![(Density::Mdpi, 0.5), (Density::Hdpi, 0.75)]);
    assert!(
      selection
        .downscales
        .iter()
        .all(|d| d.source == Path::new("a/res/drawable-xhdpi/y.png"))
    );
  }

  #[test]
  fn present_targets_are_never_scaled() {
    let drawables = paths(&["a/res/drawable-mdpi/z.png", "a/res/drawable-xxhdpi/z.png"]);
    let selection = select_densities(&drawables, &densities(&[Density::Mdpi, Density::Xhdpi]));

    assert!(selection.removed.is_empty());
    assert_eq!(selection.downscales.len(), 1);
    assert_eq!(selection.downscales[0].source, Path::new("a/res/drawable-xxhdpi/z.png"));
    assert_eq!(selection.downscales[0].target, Density::Xhdpi);
  }

  #[test]
  fn drops_lower_densities_with_nothing_to_scale_from() {
    let drawables = paths(&["a/res/drawable-ldpi/low.png"]);
    let removed = filter_by_density(&drawables, &densities(&[Density::Xhdpi]));
    assert_eq!(removed, drawables);
  }

  #[test]
  fn unqualified_drawables_are_kept_and_count_as_mdpi() {
    let drawables = paths(&["a/res/drawable/icon.png", "a/res/drawable-xhdpi/icon.png"]);
    let removed = filter_by_density(&drawables, &densities(&[Density::Mdpi]));
    assert_eq!(removed, paths(&["a/res/drawable-xhdpi/icon.png"]));
  }

  #[test]
  fn groups_by_resource_dir_and_other_qualifiers() {
    let drawables = paths(&[
      "a/res/drawable-hdpi/icon.png",
      "a/res/drawable-land-xhdpi/icon.png",
      "b/res/drawable-xhdpi/icon.png",
    ]);
    // Each variant is alone in its group, so each is the fallback for its group.
    let removed = filter_by_density(&drawables, &densities(&[Density::Mdpi]));
    assert!(removed.is_empty());
  }

  #[test]
  fn disabled_filter_keeps_everything() {
    let filter = DensityFilter::disabled();
    assert!(filter.keep(Path::new("a/res/drawable-xxxhdpi/x.png")));
  }

  #[test]
  fn filter_keeps_non_drawables() {
    let drawables = paths(&["a/res/drawable-hdpi/x.png", "a/res/drawable-mdpi/x.png"]);
    let filter = DensityFilter::new(&drawables, &densities(&[Density::Mdpi]));
    assert!(filter.keep(Path::new("a/res/values/strings.xml")));
    assert!(filter.keep(Path::new("a/res/drawable-mdpi/x.png")));
    assert!(!filter.keep(Path::new("a/res/drawable-hdpi/x.png")));
  }

  #[test]
  fn recognizes_drawables_and_nine_patches() {
    assert!(is_drawable(Path::new("res/drawable-hdpi/a.png")));
    assert!(is_drawable(Path::new("res/drawable/b.JPG")));
    assert!(!is_drawable(Path::new("res/values/strings.xml")));
    assert!(!is_drawable(Path::new("res/layout/a.png")));
    assert!(is_nine_patch(Path::new("res/drawable-hdpi/button.9.png")));
    assert!(!is_nine_patch(Path::new("res/drawable-hdpi/button.png")));
  }

  #[test]
  fn finder_walks_only_existing_dirs() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("res/drawable-hdpi")).unwrap();
    std::fs::create_dir_all(temp.path().join("res/values")).unwrap();
    std::fs::write(temp.path().join("res/drawable-hdpi/a.png"), "png").unwrap();
    std::fs::write(temp.path().join("res/values/strings.xml"), "<resources/>").unwrap();

    let fs = ProjectFilesystem::new(temp.path());
    let found = DefaultDrawableFinder
      .find_drawables(&fs, &[Path::new("res"), Path::new("missing")])
      .unwrap();
    assert_eq!(found, paths(&["res/drawable-hdpi/a.png"]));
  }
}
