//! Check runner for executing health checks

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::RelResult;
use std::sync::Arc;

/// Check runner that executes multiple checks
pub struct CheckRunner {
  checks: Vec<Arc<dyn Check>>,
}

impl CheckRunner {
  /// Create a new check runner
  pub fn new() -> Self {
    Self { checks: Vec::new() }
  }

  /// Add a check to the runner
  pub fn add_check(&mut self, check: Arc<dyn Check>) {
    self.checks.push(check);
  }

  /// Run all checks and collect results
  pub fn run_all(&self, ctx: &CheckContext) -> RelResult<Vec<CheckResult>> {
    let mut results = Vec::new();

    for check in &self.checks {
      // Skip expensive checks if not thorough mode
      if check.is_expensive() && !ctx.thorough {
        continue;
      }

      // Skip config-dependent checks when relkit.toml is missing
      if check.requires_config() && ctx.config.is_none() {
        continue;
      }

      match check.run(ctx) {
        Ok(result) => results.push(result),
        Err(err) => {
          // If a check itself fails to run, create an error result
          results.push(CheckResult::error(
            check.name(),
            format!("Check failed to run: {}", err),
            Some("Check the logs for more details"),
          ));
        }
      }
    }

    Ok(results)
  }

  /// Get all registered checks
  pub fn checks(&self) -> &[Arc<dyn Check>] {
    &self.checks
  }
}

impl Default for CheckRunner {
  fn default() -> Self {
    Self::new()
  }
}

/// Create a runner with all built-in checks (doctor)
pub fn create_default_runner() -> CheckRunner {
  let mut runner = CheckRunner::new();

  runner.add_check(Arc::new(super::tools::RequiredToolsCheck));
  runner.add_check(Arc::new(super::git_state::GitStateCheck));
  runner.add_check(Arc::new(super::gpg::GpgSigningCheck));
  runner.add_check(Arc::new(super::version_sync::VersionSyncCheck));
  runner.add_check(Arc::new(super::changelog::ChangelogCheck));
  runner.add_check(Arc::new(super::npm_auth::NpmAuthCheck));

  runner
}

/// Create a runner with only the checks that gate a publish
///
/// The publish gate is a subset of doctor: it always runs the expensive
/// auth check and skips signing diagnostics when tags are unsigned.
pub fn create_publish_gate_runner(sign_tags: bool) -> CheckRunner {
  let mut runner = CheckRunner::new();

  runner.add_check(Arc::new(super::tools::RequiredToolsCheck));
  runner.add_check(Arc::new(super::git_state::GitStateCheck));
  if sign_tags {
    runner.add_check(Arc::new(super::gpg::GpgSigningCheck));
  }
  runner.add_check(Arc::new(super::version_sync::VersionSyncCheck));
  runner.add_check(Arc::new(super::changelog::ChangelogCheck));
  runner.add_check(Arc::new(super::npm_auth::NpmAuthCheck));

  runner
}
