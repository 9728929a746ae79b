//! Changelog structure check (doctor wrapper around release::changelog::validate)

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::RelResult;
use crate::release::changelog::{self, IssueSeverity};

/// Verifies the changelog exists and follows Keep a Changelog structure
pub struct ChangelogCheck;

impl Check for ChangelogCheck {
  fn name(&self) -> &str {
    "changelog"
  }

  fn description(&self) -> &str {
    "Verifies the changelog exists and has an Unreleased section"
  }

  fn requires_config(&self) -> bool {
    true
  }

  fn run(&self, ctx: &CheckContext) -> RelResult<CheckResult> {
    let Some(config) = ctx.config.as_ref() else {
      return Ok(CheckResult::warning(
        self.name(),
        "No relkit.toml; skipping changelog validation",
        Some("Run `relkit init` first"),
      ));
    };
    let path = ctx.package_root.join(&config.package.dir).join(&config.release.changelog);

    if !path.exists() {
      return Ok(CheckResult::error(
        self.name(),
        format!("Changelog not found at {}", path.display()),
        Some("Run `relkit init` to create a starter changelog"),
      ));
    }

    let content = std::fs::read_to_string(&path)?;
    let issues = changelog::validate(&content);

    let errors = issues.iter().filter(|i| i.severity == IssueSeverity::Error).count();
    let warnings = issues.len() - errors;

    if errors > 0 {
      let first = issues
        .iter()
        .find(|i| i.severity == IssueSeverity::Error)
        .map(|i| i.message.clone())
        .unwrap_or_default();
      return Ok(
        CheckResult::error(
          self.name(),
          format!("{} error(s), {} warning(s): {}", errors, warnings, first),
          Some("relkit changelog validate for the full list"),
        )
        .with_details(serde_json::to_value(&issues)?),
      );
    }

    if warnings > 0 {
      return Ok(
        CheckResult::warning(
          self.name(),
          format!("{} warning(s) in {}", warnings, config.release.changelog.display()),
          Some("relkit changelog validate for the full list"),
        )
        .with_details(serde_json::to_value(&issues)?),
      );
    }

    Ok(CheckResult::pass(self.name(), "Changelog structure looks good"))
  }
}
