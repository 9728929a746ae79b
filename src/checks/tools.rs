//! Required-tools check: the wrapped CLIs must be on PATH

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::RelResult;
use std::process::Command;

/// Verifies git/npm (required) and gpg/gh (optional) are invocable
pub struct RequiredToolsCheck;

const REQUIRED: [&str; 2] = ["git", "npm"];
const OPTIONAL: [&str; 2] = ["gpg", "gh"];

fn tool_available(tool: &str) -> bool {
  Command::new(tool)
    .arg("--version")
    .output()
    .map(|o| o.status.success())
    .unwrap_or(false)
}

impl Check for RequiredToolsCheck {
  fn name(&self) -> &str {
    "required-tools"
  }

  fn description(&self) -> &str {
    "Verifies git, npm, gpg, and gh are available on PATH"
  }

  fn run(&self, _ctx: &CheckContext) -> RelResult<CheckResult> {
    let missing_required: Vec<&str> = REQUIRED.iter().copied().filter(|t| !tool_available(t)).collect();
    let missing_optional: Vec<&str> = OPTIONAL.iter().copied().filter(|t| !tool_available(t)).collect();

    let details = serde_json::json!({
      "missing_required": missing_required,
      "missing_optional": missing_optional,
    });

    if !missing_required.is_empty() {
      return Ok(
        CheckResult::error(
          self.name(),
          format!("Missing required tools: {}", missing_required.join(", ")),
          Some("Install the missing tools and make sure they are on PATH"),
        )
        .with_details(details),
      );
    }

    if !missing_optional.is_empty() {
      return Ok(
        CheckResult::warning(
          self.name(),
          format!(
            "Missing optional tools: {} (signing and GitHub operations will be unavailable)",
            missing_optional.join(", ")
          ),
          Some("Install gpg for signed tags and gh for GitHub release management"),
        )
        .with_details(details),
      );
    }

    Ok(CheckResult::pass(self.name(), "All wrapped tools are available"))
  }
}
