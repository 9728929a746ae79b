//! Status command: where does the release stand right now

use crate::core::context::ReleaseContext;
use crate::core::error::RelResult;
use crate::core::vcs::SystemGit;
use crate::release::ReleasePlan;
use crate::release::changelog::ChangelogDoc;
use serde::Serialize;

#[derive(Serialize)]
struct StatusReport {
  package: String,
  manifest_version: String,
  last_released_version: Option<String>,
  last_release_sha: Option<String>,
  last_release_date: Option<String>,
  branch: String,
  working_tree_clean: bool,
  pending_commits: usize,
  user_facing_commits: usize,
  suggested_bump: String,
  tag_exists: bool,
  changelog_has_unreleased_content: Option<bool>,
}

/// Run the status command
pub fn run_status(ctx: &ReleaseContext, json: bool) -> RelResult<()> {
  let config = ctx.require_config()?;
  let package_dir = ctx.package_dir();

  let version = ctx.manifest.version()?;
  let git = SystemGit::open(&package_dir)?;

  let plan = ReleasePlan::analyze(&package_dir, config, &version)?;
  let tag = config.tag_for(&version);
  let tag_exists = git.tag_exists(&tag)?;

  let changelog_has_unreleased_content = std::fs::read_to_string(ctx.changelog_path()?)
    .ok()
    .map(|content| {
      ChangelogDoc::parse(&content)
        .unreleased()
        .map(|s| s.has_content())
        .unwrap_or(false)
    });

  let report = StatusReport {
    package: config.package.name.clone(),
    manifest_version: version.to_string(),
    last_released_version: config.state.last_version.clone(),
    last_release_sha: config.state.last_sha.clone(),
    last_release_date: config.state.last_date.clone(),
    branch: git.current_branch()?,
    working_tree_clean: git.is_clean()?,
    pending_commits: plan.commits.len(),
    user_facing_commits: plan
      .commits
      .iter()
      .filter(|c| c.commit_type.is_user_facing())
      .count(),
    suggested_bump: format!("{:?}", plan.bump_type).to_lowercase(),
    tag_exists,
    changelog_has_unreleased_content,
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  println!("📦 {} v{}", report.package, report.manifest_version);
  println!();

  match (&report.last_released_version, &report.last_release_date) {
    (Some(version), Some(date)) => println!("   Last release:  {} ({})", version, date),
    (Some(version), None) => println!("   Last release:  {}", version),
    _ => println!("   Last release:  none (first release pending)"),
  }

  let tree = if report.working_tree_clean { "clean" } else { "dirty" };
  println!("   Branch:        {} ({})", report.branch, tree);
  println!(
    "   Pending:       {} commit(s) since anchor ({} user-facing) → suggested bump: {}",
    report.pending_commits, report.user_facing_commits, report.suggested_bump
  );
  println!(
    "   Tag {}:       {}",
    tag,
    if report.tag_exists { "exists" } else { "missing" }
  );

  match report.changelog_has_unreleased_content {
    Some(true) => println!("   Changelog:     Unreleased section has content"),
    Some(false) => println!("   Changelog:     Unreleased section is empty"),
    None => println!("   Changelog:     not found"),
  }

  println!();
  if report.pending_commits > 0 {
    println!("Next: relkit version plan");
  } else {
    println!("✅ Nothing pending since the last release");
  }

  Ok(())
}
