//! Integration tests for `relkit rollback` and `relkit tag`
//!
//! Rollback tests stay on the git and docs scopes so no registry or GitHub
//! access is needed; target resolution comes from local release tags.

use crate::helpers::{TestPackage, run_relkit, run_relkit_raw};
use anyhow::Result;

/// A package that released 1.0.0 and then a bad 1.1.0
fn package_with_bad_release() -> Result<TestPackage> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  pkg.write_file("lib.js", "module.exports = () => { throw new Error('oops'); };\n")?;
  pkg.write_file(
    "package.json",
    "{\n  \"name\": \"demo-pkg\",\n  \"version\": \"1.1.0\",\n  \"license\": \"MIT\"\n}\n",
  )?;
  pkg.write_file("version.ts", "export const VERSION = \"1.1.0\";\n")?;
  pkg.write_file(
    "CHANGELOG.md",
    "# Changelog\n\n## [Unreleased]\n\n## [1.1.0] - 2025-02-01\n\n### Added\n\n- broken feature\n\n## [1.0.0] - 2025-01-15\n\n### Added\n\n- initial release\n",
  )?;
  pkg.commit("feat: broken feature")?;
  pkg.tag("v1.1.0")?;

  Ok(pkg)
}

#[test]
fn test_rollback_dry_run_shows_plan_and_mutates_nothing() -> Result<()> {
  let pkg = package_with_bad_release()?;

  let output = run_relkit(&pkg.path, &["rollback", "1.1.0", "--scope", "git,docs", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("1.1.0 → 1.0.0"));
  assert!(stdout.contains("Dry-run"));

  // Nothing happened: version intact, tag intact, no backups
  assert_eq!(pkg.manifest_version()?, "1.1.0");
  assert!(pkg.tags()?.contains(&"v1.1.0".to_string()));
  assert!(!pkg.path.join(".relkit/backups").exists());

  Ok(())
}

#[test]
fn test_rollback_restores_exact_target_version() -> Result<()> {
  let pkg = package_with_bad_release()?;

  run_relkit(&pkg.path, &["rollback", "1.1.0", "--scope", "git,docs", "--yes"])?;

  // package.json restored to exactly the pre-recorded target
  assert_eq!(pkg.manifest_version()?, "1.0.0");

  // git scope deleted the bad tag, kept the good one
  let tags = pkg.tags()?;
  assert!(!tags.contains(&"v1.1.0".to_string()));
  assert!(tags.contains(&"v1.0.0".to_string()));

  // docs scope yanked the bad section and rewrote the version file
  let changelog = pkg.read_file("CHANGELOG.md")?;
  assert!(changelog.contains("## [1.1.0] - 2025-02-01 [YANKED]"));
  assert!(pkg.read_file("version.ts")?.contains("1.0.0"));

  // Backup snapshot with manifest exists
  let backups: Vec<_> = std::fs::read_dir(pkg.path.join(".relkit/backups"))?.collect();
  assert_eq!(backups.len(), 1);
  let backup_dir = backups[0].as_ref().unwrap().path();
  assert!(backup_dir.join("manifest.json").exists());
  assert!(backup_dir.join("package.json").exists());

  // The backup preserves the bad state for disaster recovery
  let backed_up = std::fs::read_to_string(backup_dir.join("package.json"))?;
  assert!(backed_up.contains("1.1.0"));

  Ok(())
}

#[test]
fn test_rollback_explicit_target() -> Result<()> {
  let pkg = package_with_bad_release()?;

  run_relkit(
    &pkg.path,
    &["rollback", "1.1.0", "--to", "1.0.0", "--scope", "docs", "--yes"],
  )?;
  assert_eq!(pkg.manifest_version()?, "1.0.0");

  Ok(())
}

#[test]
fn test_rollback_rejects_loose_version_strings() -> Result<()> {
  let pkg = package_with_bad_release()?;

  for bad in ["v1.1.0", "1.1", "latest"] {
    let output = run_relkit_raw(&pkg.path, &["rollback", bad, "--scope", "docs", "--yes"])?;
    assert!(!output.status.success(), "'{}' should be rejected", bad);
    assert_eq!(output.status.code(), Some(3), "'{}' should exit with the validation code", bad);
  }

  // Nothing was touched by the rejected invocations
  assert_eq!(pkg.manifest_version()?, "1.1.0");

  Ok(())
}

#[test]
fn test_rollback_rejects_target_newer_than_bad_version() -> Result<()> {
  let pkg = package_with_bad_release()?;

  let output = run_relkit_raw(
    &pkg.path,
    &["rollback", "1.0.0", "--to", "1.1.0", "--scope", "docs", "--yes"],
  )?;
  assert!(!output.status.success());

  Ok(())
}

#[test]
fn test_tag_creates_annotated_tag_and_dry_run_does_not() -> Result<()> {
  let pkg = TestPackage::new("demo-pkg", "1.0.0")?;

  // Move to a version that has no tag yet
  pkg.write_file(
    "package.json",
    "{\n  \"name\": \"demo-pkg\",\n  \"version\": \"1.0.1\",\n  \"license\": \"MIT\"\n}\n",
  )?;
  pkg.write_file("version.ts", "export const VERSION = \"1.0.1\";\n")?;
  pkg.commit("fix: patch release")?;

  run_relkit(&pkg.path, &["tag", "--dry-run"])?;
  assert!(!pkg.tags()?.contains(&"v1.0.1".to_string()));

  run_relkit(&pkg.path, &["tag"])?;
  assert!(pkg.tags()?.contains(&"v1.0.1".to_string()));

  // Tagging the same version twice is a gate failure
  let output = run_relkit_raw(&pkg.path, &["tag"])?;
  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(3));

  Ok(())
}
