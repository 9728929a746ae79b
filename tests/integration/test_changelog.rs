//! Integration tests for `relkit changelog` commands

use crate::helpers::{TestPackage, run_relkit, run_relkit_raw};
use anyhow::Result;

#[test]
fn test_validate_passes_on_well_formed_changelog() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  let output = run_relkit(&pkg.path, &["changelog", "validate"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("valid"));

  Ok(())
}

#[test]
fn test_validate_rejects_missing_unreleased_section() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  pkg.write_file(
    "CHANGELOG.md",
    "# Changelog\n\n## [1.0.0] - 2025-01-15\n\n### Added\n\n- initial release\n",
  )?;

  let output = run_relkit_raw(&pkg.path, &["changelog", "validate"])?;
  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(3));

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Unreleased"), "unexpected stdout: {}", stdout);

  Ok(())
}

#[test]
fn test_validate_strict_fails_on_warnings() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  // Unknown category is only a warning
  pkg.write_file(
    "CHANGELOG.md",
    "# Changelog\n\n## [Unreleased]\n\n## [1.0.0] - 2025-01-15\n\n### Improvements\n\n- thing\n",
  )?;

  let lenient = run_relkit_raw(&pkg.path, &["changelog", "validate"])?;
  assert!(lenient.status.success());

  let strict = run_relkit_raw(&pkg.path, &["changelog", "validate", "--strict"])?;
  assert!(!strict.status.success());
  assert_eq!(strict.status.code(), Some(3));

  Ok(())
}

#[test]
fn test_validate_json_lists_findings() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  pkg.write_file("CHANGELOG.md", "# Changelog\n\n## [1.0.0] - 2025-01-15\n")?;

  let output = run_relkit_raw(&pkg.path, &["changelog", "validate", "--json"])?;
  let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))?;

  let findings = json.as_array().expect("findings array");
  assert!(findings.iter().any(|f| f["severity"] == "error"));

  Ok(())
}

#[test]
fn test_generate_promotes_unreleased() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  run_relkit(&pkg.path, &["changelog", "generate", "--release", "1.1.0"])?;

  let changelog = pkg.read_file("CHANGELOG.md")?;
  assert!(changelog.contains("## [1.1.0]"));

  // The pending entry moved under the new section, Unreleased is empty again
  let unreleased_idx = changelog.find("## [Unreleased]").unwrap();
  let new_section_idx = changelog.find("## [1.1.0]").unwrap();
  let entry_idx = changelog.find("- pending release notes").unwrap();
  assert!(unreleased_idx < new_section_idx);
  assert!(new_section_idx < entry_idx);

  // Still valid afterwards
  run_relkit(&pkg.path, &["changelog", "validate"])?;

  Ok(())
}

#[test]
fn test_generate_dry_run_does_not_write() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  let before = pkg.read_file("CHANGELOG.md")?;
  let output = run_relkit(&pkg.path, &["changelog", "generate", "--release", "1.1.0", "--dry-run"])?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("## [1.1.0]"));
  assert_eq!(pkg.read_file("CHANGELOG.md")?, before);

  Ok(())
}

#[test]
fn test_generate_rejects_existing_version() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  // 1.0.0 already has a section
  let output = run_relkit_raw(&pkg.path, &["changelog", "generate", "--release", "1.0.0"])?;
  assert!(!output.status.success());

  Ok(())
}

#[test]
fn test_generate_from_commits() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  pkg.write_file("lib.js", "module.exports = 1;\n")?;
  pkg.commit("feat(api): add answer endpoint")?;
  pkg.write_file("lib.js", "module.exports = 2;\n")?;
  pkg.commit("fix: off-by-one in answer")?;

  run_relkit(
    &pkg.path,
    &["changelog", "generate", "--release", "1.1.0", "--from-commits"],
  )?;

  let changelog = pkg.read_file("CHANGELOG.md")?;
  assert!(changelog.contains("## [1.1.0]"));
  assert!(changelog.contains("### Added"));
  assert!(changelog.contains("**api**: add answer endpoint"));
  assert!(changelog.contains("### Fixed"));
  assert!(changelog.contains("off-by-one in answer"));

  Ok(())
}
