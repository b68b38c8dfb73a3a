//! Image downscaling.

use std::path::Path;

use tracing::debug;

use crate::step::{ExecutionContext, StepError};

/// Default ImageMagick binary.
pub const DEFAULT_IMAGE_SCALER: &str = "convert";

/// Scales a single image by a ratio.
pub trait ImageScaler {
  /// Human readable name for error reports.
  fn name(&self) -> &str;

  fn is_available(&self, ctx: &ExecutionContext) -> bool;

  /// Write `source` scaled by `ratio` to `destination`.
  fn scale(&self, ratio: f64, source: &Path, destination: &Path, ctx: &ExecutionContext) -> Result<(), StepError>;
}

/// Scales with ImageMagick's `convert -adaptive-resize`.
#[derive(Debug, Clone)]
pub struct ImageMagickScaler {
  program: String,
}

impl ImageMagickScaler {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  pub fn program(&self) -> &str {
    &self.program
  }
}

impl Default for ImageMagickScaler {
  fn default() -> Self {
    Self::new(DEFAULT_IMAGE_SCALER)
  }
}

impl ImageScaler for ImageMagickScaler {
  fn name(&self) -> &str {
    "ImageMagick"
  }

  fn is_available(&self, ctx: &ExecutionContext) -> bool {
    match ctx.executor().execute(&self.program, &["-version".to_string()]) {
      Ok(output) => output.success(),
      Err(e) => {
        debug!(program = %self.program, error = %e, "image scaler unavailable");
        false
      }
    }
  }

  fn scale(&self, ratio: f64, source: &Path, destination: &Path, ctx: &ExecutionContext) -> Result<(), StepError> {
    let fs = ctx.filesystem();
    let args = vec![
      "-adaptive-resize".to_string(),
      resize_percent(ratio),
      fs.resolve(source).to_string_lossy().into_owned(),
      fs.resolve(destination).to_string_lossy().into_owned(),
    ];
    ctx.executor().run_checked(&self.program, &args)?;
    Ok(())
  }
}

/// `-adaptive-resize` geometry for `ratio`, rounded to the nearest percent.
fn resize_percent(ratio: f64) -> String {
  format!("{}%", (ratio * 100.0).round() as i64)
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::util::testutil::fake_tool;
  use tempfile::TempDir;

  #[test]
  fn resize_percent_rounds() {
    assert_eq!(resize_percent(0.5), "50%");
    assert_eq!(resize_percent(2.0 / 3.0), "67%");
    assert_eq!(resize_percent(1.0 / 3.0), "33%");
    assert_eq!(resize_percent(0.75), "75%");
  }

  #[test]
  fn missing_binary_is_unavailable() {
    let temp = TempDir::new().unwrap();
    let ctx = ExecutionContext::new(temp.path());
    assert!(!ImageMagickScaler::new("respack-no-such-convert").is_available(&ctx));
  }

  #[test]
  fn scale_passes_percentage_and_paths() {
    let temp = TempDir::new().unwrap();
    let tool = fake_tool(temp.path(), "convert", r#"echo "$@" > "$(dirname "$0")/args.txt""#);
    let ctx = ExecutionContext::new(temp.path());
    let scaler = ImageMagickScaler::new(tool.to_string_lossy());

    assert!(scaler.is_available(&ctx));
    scaler
      .scale(
        0.5,
        Path::new("res/drawable-xhdpi/a.png"),
        Path::new("res/drawable-mdpi/a.png"),
        &ctx,
      )
      .unwrap();

    let args = std::fs::read_to_string(temp.path().join("args.txt")).unwrap();
    assert_eq!(
      args.trim(),
      format!(
        "-adaptive-resize 50% {} {}",
        temp.path().join("res/drawable-xhdpi/a.png").display(),
        temp.path().join("res/drawable-mdpi/a.png").display()
      )
    );
  }

  #[test]
  fn failing_scaler_is_a_command_failure() {
    let temp = TempDir::new().unwrap();
    let tool = fake_tool(temp.path(), "convert", "exit 2");
    let ctx = ExecutionContext::new(temp.path());
    let scaler = ImageMagickScaler::new(tool.to_string_lossy());

    let err = scaler
      .scale(0.5, Path::new("a.png"), Path::new("b.png"), &ctx)
      .unwrap_err();
    assert_eq!(err.exit_code(), 2);
  }
}
