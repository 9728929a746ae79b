//! Rollback execution: run each scope independently, record outcomes
//!
//! Failure handling is deliberately "record and continue": scopes are
//! independent remote mutations with no cross-scope transaction, so a
//! failed npm deprecation must not stop the git tag deletion. The final
//! local restore always runs and sets package.json back to the
//! pre-recorded target version.

use crate::core::config::{RelkitConfig, RollbackScope};
use crate::core::error::{RelError, RelResult};
use crate::core::vcs::SystemGit;
use crate::npm::{NpmClient, PackageManifest, manifest};
use crate::release::changelog::ChangelogDoc;
use crate::rollback::backup::BackupSnapshot;
use crate::rollback::plan::RollbackPlan;
use crate::verify::report::{RunReport, StepStatus};
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Execute a rollback plan, recording one step per action into the report
///
/// Returns Ok even when scopes fail; the report carries the outcomes.
/// Only a failed local restore is escalated to an error.
pub fn execute(
  plan: &RollbackPlan,
  config: &RelkitConfig,
  package_dir: &Path,
  git: &SystemGit,
  npm: &NpmClient,
  backup: &BackupSnapshot,
  report: &mut RunReport,
) -> RelResult<()> {
  for scope in &plan.scopes {
    match scope {
      RollbackScope::Npm => run_npm_scope(plan, config, npm, report),
      RollbackScope::Git => run_git_scope(plan, git, report),
      RollbackScope::Github => run_github_scope(plan, package_dir, report),
      RollbackScope::Docs => run_docs_scope(plan, config, package_dir, report),
    }
  }

  restore_local(plan, package_dir, backup, report)
}

fn record(report: &mut RunReport, phase: &str, started: Instant, result: RelResult<String>) {
  match result {
    Ok(message) => {
      report.record(phase, StepStatus::Pass, message, started.elapsed());
    }
    Err(err) => {
      report.record(phase, StepStatus::Fail, err.to_string(), started.elapsed());
    }
  }
}

fn run_npm_scope(plan: &RollbackPlan, config: &RelkitConfig, npm: &NpmClient, report: &mut RunReport) {
  let started = Instant::now();
  let message = format!(
    "{} is broken, use {} instead",
    plan.bad_version, plan.target_version
  );
  record(
    report,
    "npm-deprecate",
    started,
    npm
      .deprecate(&plan.package, &plan.bad_version, &message)
      .map(|_| format!("Deprecated {}@{}", plan.package, plan.bad_version)),
  );

  let started = Instant::now();
  record(
    report,
    "npm-dist-tag",
    started,
    npm
      .dist_tag_add(&plan.package, &plan.target_version, &config.release.dist_tag)
      .map(|_| {
        format!(
          "dist-tag '{}' now points at {}",
          config.release.dist_tag, plan.target_version
        )
      }),
  );
}

fn run_git_scope(plan: &RollbackPlan, git: &SystemGit, report: &mut RunReport) {
  let started = Instant::now();
  let local = match git.tag_exists(&plan.bad_tag) {
    Ok(true) => git.delete_tag(&plan.bad_tag).map(|_| format!("Deleted local tag {}", plan.bad_tag)),
    Ok(false) => Ok(format!("Local tag {} does not exist", plan.bad_tag)),
    Err(e) => Err(e),
  };
  record(report, "git-tag-local", started, local);

  let started = Instant::now();
  let remote = match git.has_remote("origin") {
    Ok(true) => git
      .delete_remote_tag("origin", &plan.bad_tag)
      .map(|_| format!("Deleted tag {} on origin", plan.bad_tag)),
    Ok(false) => Ok("No origin remote configured; nothing to delete".to_string()),
    Err(e) => Err(e),
  };
  record(report, "git-tag-remote", started, remote);
}

fn run_github_scope(plan: &RollbackPlan, package_dir: &Path, report: &mut RunReport) {
  let started = Instant::now();

  let result = Command::new("gh")
    .current_dir(package_dir)
    .args(["release", "edit", &plan.bad_tag, "--prerelease"])
    .output();

  let outcome = match result {
    Ok(output) if output.status.success() => Ok(format!("GitHub release {} marked as prerelease", plan.bad_tag)),
    Ok(output) => Err(RelError::message(format!(
      "gh release edit failed: {}",
      String::from_utf8_lossy(&output.stderr).trim()
    ))),
    Err(_) => Err(crate::core::error::RelError::Tool(crate::core::error::ToolError::NotFound {
      tool: "gh".to_string(),
    })),
  };

  record(report, "github-release", started, outcome);
}

fn run_docs_scope(plan: &RollbackPlan, config: &RelkitConfig, package_dir: &Path, report: &mut RunReport) {
  let started = Instant::now();
  let changelog_path = package_dir.join(&config.release.changelog);

  let changelog_result = (|| -> RelResult<String> {
    let content = std::fs::read_to_string(&changelog_path)
      .map_err(|e| RelError::message(format!("Cannot read {}: {}", changelog_path.display(), e)))?;
    let mut doc = ChangelogDoc::parse(&content);

    if doc.mark_yanked(&plan.bad_version) {
      std::fs::write(&changelog_path, doc.render())?;
      Ok(format!("Changelog section {} marked [YANKED]", plan.bad_version))
    } else {
      Ok(format!("Changelog has no section for {}; nothing to mark", plan.bad_version))
    }
  })();
  record(report, "docs-changelog", started, changelog_result);

  let started = Instant::now();
  let files_result = (|| -> RelResult<String> {
    let mut rewritten = 0usize;
    for file in &config.release.version_files {
      let path = package_dir.join(file);
      if path.exists() {
        rewritten += manifest::rewrite_version_file(&path, &plan.bad_version, &plan.target_version)?;
      }
    }
    Ok(format!(
      "Rewrote {} version string(s) across {} configured file(s)",
      rewritten,
      config.release.version_files.len()
    ))
  })();
  record(report, "docs-version-files", started, files_result);
}

/// Restore package.json to exactly the pre-recorded target version
fn restore_local(
  plan: &RollbackPlan,
  package_dir: &Path,
  backup: &BackupSnapshot,
  report: &mut RunReport,
) -> RelResult<()> {
  let started = Instant::now();

  let result = (|| -> RelResult<String> {
    // The backup manifest is the authority on the target version
    let target = backup.target_version()?;
    if target != plan.target_version {
      return Err(RelError::message(format!(
        "Backup records target {} but the plan says {}; refusing to restore",
        target, plan.target_version
      )));
    }

    let mut pkg = PackageManifest::load(package_dir)?;
    pkg.set_version(&target)?;
    pkg.save()?;

    // Re-read to prove the field landed exactly
    let written = PackageManifest::load(package_dir)?.version()?;
    if written != target {
      return Err(RelError::message(format!(
        "package.json verification failed: expected {}, found {}",
        target, written
      )));
    }

    Ok(format!("package.json version restored to {}", target))
  })();

  let failed = result.is_err();
  record(report, "local-restore", started, result);

  if failed {
    return Err(RelError::message(
      "Local restore failed; see the rollback report for details",
    ));
  }

  Ok(())
}
