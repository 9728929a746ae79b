//! Version sync check: every configured version file carries the
//! package.json version

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::RelResult;
use crate::npm::PackageManifest;

/// Verifies version strings are propagated consistently
pub struct VersionSyncCheck;

impl Check for VersionSyncCheck {
  fn name(&self) -> &str {
    "version-sync"
  }

  fn description(&self) -> &str {
    "Verifies package.json and configured version files agree"
  }

  fn requires_config(&self) -> bool {
    true
  }

  fn run(&self, ctx: &CheckContext) -> RelResult<CheckResult> {
    let Some(config) = ctx.config.as_ref() else {
      return Ok(CheckResult::warning(
        self.name(),
        "No relkit.toml; skipping version sync validation",
        Some("Run `relkit init` first"),
      ));
    };
    let package_dir = ctx.package_root.join(&config.package.dir);

    let manifest = match PackageManifest::load(&package_dir) {
      Ok(m) => m,
      Err(e) => {
        return Ok(CheckResult::error(
          self.name(),
          format!("Cannot load package.json: {}", e),
          None::<&str>,
        ));
      }
    };

    let version = match manifest.version() {
      Ok(v) => v,
      Err(_) => {
        return Ok(CheckResult::error(
          self.name(),
          format!(
            "package.json version '{}' is not strict semver",
            manifest.version_str().unwrap_or("<missing>")
          ),
          Some("Fix the version field; relkit requires versions like 1.2.3"),
        ));
      }
    };

    if manifest.name()? != config.package.name {
      return Ok(CheckResult::error(
        self.name(),
        format!(
          "package.json name '{}' does not match relkit.toml package.name '{}'",
          manifest.name()?,
          config.package.name
        ),
        Some("Align the two names; relkit refuses to publish under a mismatched name"),
      ));
    }

    let mut stale = Vec::new();
    for file in &config.release.version_files {
      let path = package_dir.join(file);
      if !path.exists() {
        stale.push(format!("{} (missing)", file.display()));
        continue;
      }
      let content = std::fs::read_to_string(&path)?;
      if !content.contains(&version.to_string()) {
        stale.push(file.display().to_string());
      }
    }

    if !stale.is_empty() {
      return Ok(
        CheckResult::error(
          self.name(),
          format!("Version files out of sync with {}: {}", version, stale.join(", ")),
          Some("relkit version apply keeps these in sync; update them to match"),
        )
        .with_details(serde_json::json!({ "version": version.to_string(), "stale": stale })),
      );
    }

    Ok(CheckResult::pass(
      self.name(),
      format!("All version copies agree on {}", version),
    ))
  }
}
