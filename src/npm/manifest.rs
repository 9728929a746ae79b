//! package.json reading and targeted version updates
//!
//! The manifest is the single source of truth for the package version.
//! Updates touch only the version field and preserve the rest of the
//! document through a parse → mutate → pretty-print cycle.

use crate::core::error::{ConfigError, RelError, RelResult, ResultExt};
use crate::utils::parse_version;
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};

/// An npm package manifest (package.json)
#[derive(Debug, Clone)]
pub struct PackageManifest {
  /// Path to package.json
  pub path: PathBuf,

  /// Parsed document
  raw: serde_json::Value,
}

impl PackageManifest {
  /// Load package.json from a package directory
  pub fn load(package_dir: &Path) -> RelResult<Self> {
    let path = package_dir.join("package.json");

    if !path.exists() {
      return Err(RelError::Config(ConfigError::ManifestNotFound {
        package_root: package_dir.to_path_buf(),
      }));
    }

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let raw: serde_json::Value =
      serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    if !raw.is_object() {
      return Err(RelError::message(format!(
        "{} is not a JSON object",
        path.display()
      )));
    }

    Ok(Self { path, raw })
  }

  /// Package name
  pub fn name(&self) -> RelResult<&str> {
    self
      .raw
      .get("name")
      .and_then(|v| v.as_str())
      .ok_or_else(|| RelError::message("package.json has no \"name\" field"))
  }

  /// Package version, validated as strict semver
  pub fn version(&self) -> RelResult<Version> {
    let raw = self
      .raw
      .get("version")
      .and_then(|v| v.as_str())
      .ok_or_else(|| RelError::message("package.json has no \"version\" field"))?;

    parse_version(raw)
  }

  /// Raw version string without semver validation (for diagnostics)
  pub fn version_str(&self) -> Option<&str> {
    self.raw.get("version").and_then(|v| v.as_str())
  }

  /// Set the version field in memory
  pub fn set_version(&mut self, version: &Version) -> RelResult<()> {
    let obj = self
      .raw
      .as_object_mut()
      .ok_or_else(|| RelError::message("package.json is not a JSON object"))?;

    obj.insert(
      "version".to_string(),
      serde_json::Value::String(version.to_string()),
    );
    Ok(())
  }

  /// Write the manifest back to disk (2-space indent and trailing newline, matching npm)
  pub fn save(&self) -> RelResult<()> {
    let mut content = serde_json::to_string_pretty(&self.raw)?;
    content.push('\n');
    fs::write(&self.path, content).with_context(|| format!("Failed to write {}", self.path.display()))?;
    Ok(())
  }

  /// Whether the package is marked private (must never be published)
  pub fn is_private(&self) -> bool {
    self.raw.get("private").and_then(|v| v.as_bool()).unwrap_or(false)
  }
}

/// Rewrite version strings in an auxiliary version file (e.g. src/version.ts)
///
/// Replaces every occurrence of the old version string. Returns the number
/// of replacements made; 0 means the file did not carry the old version.
pub fn rewrite_version_file(path: &Path, old: &Version, new: &Version) -> RelResult<usize> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

  let old_str = old.to_string();
  let count = content.matches(&old_str).count();

  if count > 0 {
    let updated = content.replace(&old_str, &new.to_string());
    fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
  }

  Ok(count)
}
