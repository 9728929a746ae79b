//! CLI surface tests: help output, exit codes, status

use crate::helpers::{TestPackage, run_relkit, run_relkit_raw};
use anyhow::Result;

#[test]
fn test_help_exits_zero() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  for args in [
    vec!["--help"],
    vec!["-h"],
    vec!["version", "--help"],
    vec!["changelog", "--help"],
    vec!["tag", "--help"],
    vec!["publish", "--help"],
    vec!["verify", "--help"],
    vec!["rollback", "--help"],
    vec!["monitor", "--help"],
    vec!["run", "--help"],
  ] {
    let output = run_relkit_raw(&pkg.path, &args)?;
    assert!(output.status.success(), "help failed for {:?}", args);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "no usage text for {:?}", args);
  }

  Ok(())
}

#[test]
fn test_unknown_subcommand_fails() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;
  let output = run_relkit_raw(&pkg.path, &["frobnicate"])?;
  assert!(!output.status.success());
  Ok(())
}

#[test]
fn test_status_json_shape() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  let output = run_relkit(&pkg.path, &["status", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))?;

  assert_eq!(json["package"], "demo-pkg");
  assert_eq!(json["manifest_version"], "1.0.0");
  assert_eq!(json["branch"], "main");
  assert_eq!(json["working_tree_clean"], true);
  assert_eq!(json["changelog_has_unreleased_content"], true);

  Ok(())
}

#[test]
fn test_commands_require_package_json() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  let output = run_relkit_raw(dir.path(), &["status"])?;

  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("package.json"), "unexpected stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_init_creates_config_and_changelog() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  std::fs::write(
    dir.path().join("package.json"),
    "{\"name\":\"fresh-pkg\",\"version\":\"0.1.0\"}\n",
  )?;

  run_relkit(dir.path(), &["init"])?;

  let config = std::fs::read_to_string(dir.path().join("relkit.toml"))?;
  assert!(config.contains("name = \"fresh-pkg\""));

  let changelog = std::fs::read_to_string(dir.path().join("CHANGELOG.md"))?;
  assert!(changelog.contains("## [Unreleased]"));

  // Second init without --force refuses
  let output = run_relkit_raw(dir.path(), &["init"])?;
  assert!(!output.status.success());

  Ok(())
}
