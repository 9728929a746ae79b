//! Integration tests for `relkit version` commands

use crate::helpers::{TestPackage, run_relkit, run_relkit_raw};
use anyhow::Result;

#[test]
fn test_plan_suggests_minor_for_feature() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  pkg.write_file("lib.js", "module.exports = () => 42;\n")?;
  pkg.commit("feat: add answer function")?;

  let output = run_relkit(&pkg.path, &["version", "plan", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))?;

  assert_eq!(json["current_version"], "1.0.0");
  assert_eq!(json["proposed_version"], "1.1.0");
  assert_eq!(json["bump_type"], "minor");
  assert_eq!(json["has_changes"], true);

  Ok(())
}

#[test]
fn test_plan_suggests_major_for_breaking_change() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  pkg.write_file("lib.js", "module.exports = null;\n")?;
  pkg.commit("feat!: remove default export")?;

  let output = run_relkit(&pkg.path, &["version", "plan", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))?;

  assert_eq!(json["proposed_version"], "2.0.0");
  assert_eq!(json["bump_type"], "major");

  Ok(())
}

#[test]
fn test_apply_dry_run_mutates_nothing() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  pkg.write_file("lib.js", "module.exports = 1;\n")?;
  pkg.commit("fix: return a number")?;

  let manifest_before = pkg.read_file("package.json")?;
  let config_before = pkg.read_file("relkit.toml")?;
  let version_file_before = pkg.read_file("version.ts")?;

  let output = run_relkit(&pkg.path, &["version", "apply", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Dry-run"));

  assert_eq!(pkg.read_file("package.json")?, manifest_before);
  assert_eq!(pkg.read_file("relkit.toml")?, config_before);
  assert_eq!(pkg.read_file("version.ts")?, version_file_before);

  Ok(())
}

#[test]
fn test_apply_bumps_manifest_version_files_and_anchor() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  pkg.write_file("lib.js", "module.exports = 1;\n")?;
  let sha = pkg.commit("fix: return a number")?;

  run_relkit(&pkg.path, &["version", "apply"])?;

  assert_eq!(pkg.manifest_version()?, "1.0.1");
  assert!(pkg.read_file("version.ts")?.contains("1.0.1"));

  let config = pkg.read_file("relkit.toml")?;
  assert!(config.contains("last_version = \"1.0.1\""));
  assert!(config.contains(&format!("last_sha = \"{}\"", sha)));

  Ok(())
}

#[test]
fn test_apply_forced_bump_and_prerelease() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  run_relkit(&pkg.path, &["version", "apply", "--bump", "major", "--pre", "rc.1"])?;
  assert_eq!(pkg.manifest_version()?, "2.0.0-rc.1");

  Ok(())
}

#[test]
fn test_apply_rejects_unknown_bump_keyword() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  let output = run_relkit_raw(&pkg.path, &["version", "apply", "--bump", "huge"])?;
  assert!(!output.status.success());

  Ok(())
}

#[test]
fn test_apply_without_commits_is_a_noop() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  // Anchor points at HEAD, so there is nothing to release
  let output = run_relkit(&pkg.path, &["version", "apply"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("No commits"));
  assert_eq!(pkg.manifest_version()?, "1.0.0");

  Ok(())
}
