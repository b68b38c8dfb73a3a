//! CLI smoke tests for respack.
//!
//! These run the binary against small request files in a temporary project
//! and check its output and exit codes.

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

/// Get a Command for the respack binary with tool overrides cleared.
fn respack_cmd() -> Command {
  let mut cmd = cargo_bin_cmd!("respack");
  cmd
    .env_remove("RESPACK_OUT")
    .env_remove("RESPACK_AAPT")
    .env_remove("RESPACK_ANDROID_JAR")
    .env_remove("RESPACK_IMAGE_SCALER")
    .env_remove("RUST_LOG");
  cmd
}

fn write(root: &Path, path: &str, content: &str) {
  let full = root.join(path);
  std::fs::create_dir_all(full.parent().unwrap()).unwrap();
  std::fs::write(full, content).unwrap();
}

/// A project with one app and one library, plus `request.json` using `aapt`.
fn project(aapt: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  let root = temp.path();
  write(root, "app/AndroidManifest.xml", "<manifest package=\"com.example\"/>");
  write(root, "app/res/values/strings.xml", "<resources/>");
  write(root, "app/res/values-es/strings.xml", "<resources/>");
  write(root, "lib/res/values/strings.xml", "<resources/>");
  write(root, "lib/assets/data.txt", "data");

  let request = serde_json::json!({
    "target": "//app:app",
    "manifest": "app/AndroidManifest.xml",
    "package_type": "debug",
    "deps": ["//app:res"],
    "libraries": [
      { "target": "//app:res", "res": "app/res", "deps": ["//lib:lib"] },
      { "target": "//lib:lib", "res": "lib/res", "assets": "lib/assets" }
    ],
    "filter": { "strings": true },
    "android": { "aapt": aapt, "android_jar": "android.jar" }
  });
  write(root, "request.json", &serde_json::to_string_pretty(&request).unwrap());
  temp
}

#[cfg(unix)]
fn fake_aapt(root: &Path, body: &str) -> String {
  use std::os::unix::fs::PermissionsExt;

  let path = root.join("fake-aapt");
  std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path.display().to_string()
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  respack_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  respack_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("respack"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["package", "filter", "rule-key", "steps"] {
    respack_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// rule-key
// =============================================================================

#[test]
#[serial]
fn rule_key_is_stable() {
  let temp = project("aapt");
  let run = || {
    let output = respack_cmd()
      .arg("--root")
      .arg(temp.path())
      .arg("rule-key")
      .arg(temp.path().join("request.json"))
      .output()
      .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
  };

  let key = run();
  assert_eq!(key.len(), 64);
  assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
  assert_eq!(run(), key);
}

#[test]
#[serial]
fn rule_key_json() {
  let temp = project("aapt");

  respack_cmd()
    .arg("--root")
    .arg(temp.path())
    .args(["--output", "json", "rule-key"])
    .arg(temp.path().join("request.json"))
    .assert()
    .success()
    .stdout(predicate::str::contains("\"build_target\": \"//app:app\""));
}

// =============================================================================
// steps
// =============================================================================

#[test]
#[serial]
fn steps_lists_pipeline_without_running() {
  let temp = project("aapt");

  respack_cmd()
    .arg("--root")
    .arg(temp.path())
    .arg("steps")
    .arg(temp.path().join("request.json"))
    .assert()
    .success()
    .stdout(predicate::str::contains("filter_resources"))
    .stdout(predicate::str::contains("symlink_assets"))
    .stdout(predicate::str::contains("aapt package -f --no-crunch"));

  assert!(!temp.path().join("respack-out").exists());
}

// =============================================================================
// filter
// =============================================================================

#[test]
#[serial]
fn filter_drops_non_english_strings() {
  let temp = project("aapt");

  respack_cmd()
    .arg("--root")
    .arg(temp.path())
    .arg("filter")
    .arg(temp.path().join("request.json"))
    .assert()
    .success()
    .stdout(predicate::str::contains("Filtered resources of //app:app"));

  let filtered = temp.path().join("respack-out/bin/app/__filtered_res_app__");
  assert!(filtered.join("0/values/strings.xml").exists());
  assert!(!filtered.join("0/values-es").exists());
  assert!(filtered.join("1/values/strings.xml").exists());
}

// =============================================================================
// package
// =============================================================================

#[test]
#[serial]
#[cfg(unix)]
fn package_with_fake_aapt() {
  let temp = project("aapt");
  let aapt = fake_aapt(temp.path(), r#"for a in "$@"; do out="$a"; done; echo "$@" > "$out""#);

  respack_cmd()
    .arg("--root")
    .arg(temp.path())
    .arg("package")
    .arg(temp.path().join("request.json"))
    .env("RESPACK_AAPT", &aapt)
    .assert()
    .success()
    .stdout(predicate::str::contains("Packaged //app:app"));

  let gen_dir = temp.path().join("respack-out/gen/app");
  let archive = std::fs::read_to_string(gen_dir.join("app.unsigned.ap_")).unwrap();
  assert!(archive.contains("-S respack-out/bin/app/__filtered_res_app__/0"));
  assert!(archive.contains("-A respack-out/bin/app/__assets_app__"));
  let artifacts = std::fs::read_to_string(gen_dir.join("app.artifacts.json")).unwrap();
  assert!(artifacts.contains("__filtered_res_app__/0"));
  assert!(artifacts.contains("app.unsigned.ap_"));
  assert!(temp.path().join("respack-out/bin/app/__assets_app__/data.txt").exists());
}

#[test]
#[serial]
#[cfg(unix)]
fn package_propagates_aapt_exit_code() {
  let temp = project("aapt");
  let aapt = fake_aapt(temp.path(), "echo 'ERROR: resource not found' >&2; exit 3");

  respack_cmd()
    .arg("--root")
    .arg(temp.path())
    .arg("package")
    .arg(temp.path().join("request.json"))
    .env("RESPACK_AAPT", &aapt)
    .assert()
    .code(3)
    .stderr(predicate::str::contains("aapt_package"));
}

#[test]
#[serial]
fn package_missing_request_fails() {
  let temp = TempDir::new().unwrap();

  respack_cmd()
    .arg("--root")
    .arg(temp.path())
    .arg("package")
    .arg(temp.path().join("missing.json"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load package request"));
}

#[test]
#[serial]
fn package_without_android_jar_fails() {
  let temp = project("aapt");
  let path = temp.path().join("request.json");
  let mut request: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
  request["android"] = serde_json::json!({ "aapt": "aapt" });
  std::fs::write(&path, request.to_string()).unwrap();

  respack_cmd()
    .arg("--root")
    .arg(temp.path())
    .arg("package")
    .arg(&path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("android.android_jar"));
}
