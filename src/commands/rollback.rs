//! Rollback command: plan → backup → confirm → execute → verify

use crate::core::context::ReleaseContext;
use crate::core::error::{RelError, RelResult};
use crate::core::config::RollbackScope;
use crate::core::vcs::SystemGit;
use crate::npm::NpmClient;
use crate::rollback::backup::BackupSnapshot;
use crate::rollback::execute;
use crate::rollback::plan::RollbackPlan;
use crate::utils::{confirm, parse_version};
use crate::verify::report::RunReport;
use std::path::PathBuf;

/// Run the rollback command
pub fn run_rollback(
  ctx: &ReleaseContext,
  version: String,
  to: Option<String>,
  scope: Option<String>,
  yes: bool,
  dry_run: bool,
  json: bool,
) -> RelResult<()> {
  let config = ctx.require_config()?;
  let package_dir = ctx.package_dir();

  let bad_version = parse_version(&version)?;
  let explicit_target = to.map(|raw| parse_version(&raw)).transpose()?;

  let scopes: Vec<RollbackScope> = match scope {
    Some(raw) => raw
      .split(',')
      .filter(|s| !s.trim().is_empty())
      .map(|s| s.parse())
      .collect::<RelResult<Vec<_>>>()?,
    None => config.rollback.scopes.clone(),
  };

  if scopes.is_empty() {
    return Err(RelError::with_help(
      "No rollback scopes selected",
      "Pass --scope npm,git,github,docs or configure [rollback].scopes",
    ));
  }

  let git = SystemGit::open(&package_dir)?;
  let npm = NpmClient::new(&package_dir, &config.package.registry);

  // 1. Plan
  let target = RollbackPlan::resolve_target(config, &git, &npm, &bad_version, explicit_target)?;
  let plan = RollbackPlan::build(config, bad_version.clone(), target.clone(), scopes)?;

  if json && dry_run {
    println!("{}", plan.to_json()?);
    return Ok(());
  }

  if !json {
    println!("{}", plan.to_human_readable());
  }

  if dry_run {
    println!("🔍 Dry-run mode (no backup written, nothing executed)");
    return Ok(());
  }

  // 2. Backup before anything mutates
  let mut files: Vec<PathBuf> = vec![PathBuf::from("package.json"), config.release.changelog.clone()];
  files.extend(config.release.version_files.iter().cloned());

  let backup = BackupSnapshot::create(
    &package_dir,
    &package_dir.join(&config.rollback.backup_dir),
    &bad_version,
    &target,
    &git.head_commit()?,
    &files,
  )?;
  backup.verify()?;

  if !json {
    println!("💾 Backup {} written to {}", backup.manifest.id, backup.dir.display());
    println!();
  }

  // 3. Confirm
  if !yes && !confirm(&format!("Roll back {} → {}?", bad_version, target))? {
    println!("⏭️  Aborted (backup kept)");
    return Ok(());
  }

  // 4. Execute: independent scopes, record-and-continue
  let mut report = RunReport::new("rollback", &config.package.name, Some(&bad_version));
  let result = execute::execute(&plan, config, &package_dir, &git, &npm, &backup, &mut report);

  // 5. Verify / report
  if json {
    println!("{}", report.to_json()?);
  } else {
    println!();
    for step in &report.steps {
      println!("{} {}: {}", step.status.icon(), step.phase, step.message);
    }
    println!();

    let (pass, fail, warn, skip) = report.counts();
    println!("Summary: {} passed, {} failed, {} warning(s), {} skipped", pass, fail, warn, skip);

    let path = report.save_markdown(&ctx.root)?;
    println!("📄 Report written to {}", path.display());

    if report.passed() {
      println!();
      println!("✅ Rollback complete; package.json is back on {}", target);
    } else {
      println!();
      println!("⚠️  Some scopes failed; finish them by hand using the report above");
    }
  }

  result
}
