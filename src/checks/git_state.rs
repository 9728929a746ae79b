//! Git state check: repository present, clean tree, release branch

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::RelResult;
use crate::core::vcs::SystemGit;

/// Verifies the package lives in a releasable git repository
pub struct GitStateCheck;

impl Check for GitStateCheck {
  fn name(&self) -> &str {
    "git-state"
  }

  fn description(&self) -> &str {
    "Verifies git repository, clean working tree, and release branch"
  }

  fn run(&self, ctx: &CheckContext) -> RelResult<CheckResult> {
    let git = match SystemGit::open(&ctx.package_root) {
      Ok(git) => git,
      Err(_) => {
        return Ok(CheckResult::error(
          self.name(),
          format!("{} is not inside a git repository", ctx.package_root.display()),
          Some("Run `git init` or move the package into its repository"),
        ));
      }
    };

    if !git.is_clean()? {
      return Ok(CheckResult::error(
        self.name(),
        "Working tree has uncommitted changes",
        Some("Commit or stash changes before releasing"),
      ));
    }

    let branch = git.current_branch()?;
    if let Some(config) = &ctx.config
      && branch != config.release.branch
    {
      return Ok(
        CheckResult::warning(
          self.name(),
          format!(
            "On branch '{}' but releases are cut from '{}'",
            branch, config.release.branch
          ),
          Some(format!("git checkout {}", config.release.branch)),
        )
        .with_details(serde_json::json!({ "branch": branch })),
      );
    }

    Ok(CheckResult::pass(
      self.name(),
      format!("Clean working tree on branch '{}'", branch),
    ))
  }
}
