//! npm registry auth check (expensive: hits the network)

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::RelResult;
use crate::npm::NpmClient;

/// Verifies the registry accepts our credentials (`npm whoami`)
pub struct NpmAuthCheck;

impl Check for NpmAuthCheck {
  fn name(&self) -> &str {
    "npm-auth"
  }

  fn description(&self) -> &str {
    "Verifies npm registry authentication (npm whoami)"
  }

  fn is_expensive(&self) -> bool {
    true
  }

  fn run(&self, ctx: &CheckContext) -> RelResult<CheckResult> {
    let registry = ctx
      .config
      .as_ref()
      .map(|c| c.package.registry.clone())
      .unwrap_or_else(|| "https://registry.npmjs.org".to_string());

    let client = NpmClient::new(&ctx.package_root, &registry);

    match client.whoami() {
      Ok(user) => Ok(CheckResult::pass(
        self.name(),
        format!("Authenticated with {} as '{}'", registry, user),
      )),
      Err(_) => Ok(CheckResult::error(
        self.name(),
        format!("Not authenticated with {}", registry),
        Some("npm login (or export NPM_TOKEN) before publishing"),
      )),
    }
  }
}
