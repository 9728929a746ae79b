//! Version commands: plan (analyze) and apply (bump)

use crate::core::context::ReleaseContext;
use crate::core::error::{RelError, RelResult};
use crate::core::vcs::SystemGit;
use crate::npm::manifest;
use crate::release::commit::CommitType;
use crate::release::tracker::ReleaseTracker;
use crate::release::{ReleasePlan, VersionBump};

/// Run the version plan command
pub fn run_version_plan(ctx: &ReleaseContext, json: bool) -> RelResult<()> {
  let config = ctx.require_config()?;
  let current = ctx.manifest.version()?;

  let plan = ReleasePlan::analyze(&ctx.package_dir(), config, &current)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&plan)?);
    return Ok(());
  }

  print_plan(&plan);
  Ok(())
}

/// Run the version apply command
pub fn run_version_apply(
  ctx: &ReleaseContext,
  bump: Option<String>,
  pre: Option<String>,
  dry_run: bool,
) -> RelResult<()> {
  let config = ctx.require_config()?;
  let package_dir = ctx.package_dir();
  let current = ctx.manifest.version()?;

  let mut plan = ReleasePlan::analyze(&package_dir, config, &current)?;

  if let Some(keyword) = bump {
    let bump = VersionBump::from_keyword(&keyword)
      .ok_or_else(|| RelError::with_help(format!("Unknown bump '{}'", keyword), "Use major, minor, or patch"))?;
    plan = plan.with_bump(bump);
  } else if !plan.has_changes {
    println!("⚠️  No commits since the last release anchor");
    println!("   Current version: {}", plan.current_version);
    println!("   Pass --bump to force a bump anyway");
    return Ok(());
  }

  if let Some(pre) = pre {
    plan = plan.with_prerelease(&pre)?;
  }

  let new_version = plan.proposed_version.clone();

  println!("📦 Version bump for '{}'", config.package.name);
  println!();
  println!("  Current:  {}", plan.current_version);
  println!("  Proposed: {} ({:?})", new_version, plan.bump_type);
  println!();

  if !plan.commits.is_empty() {
    println!("  Changes:");
    for commit in &plan.commits {
      let icon = match commit.commit_type {
        CommitType::Feat => "✨",
        CommitType::Fix => "🐛",
        CommitType::Perf => "⚡",
        _ => "  ",
      };
      let breaking = if commit.is_breaking { " [BREAKING]" } else { "" };
      println!("    {} {}{}", icon, commit.subject, breaking);
    }
    println!();
  }

  if dry_run {
    println!("🔍 Dry-run mode (no changes applied)");
    return Ok(());
  }

  // 1. package.json is the source of truth; it moves first
  let mut pkg = ctx.manifest.clone();
  pkg.set_version(&new_version)?;
  pkg.save()?;
  println!("   Updated package.json");

  // 2. Propagate to configured version files
  for file in &config.release.version_files {
    let path = package_dir.join(file);
    if !path.exists() {
      println!("   ⚠️  {} missing, skipped", file.display());
      continue;
    }
    let replaced = manifest::rewrite_version_file(&path, &current, &new_version)?;
    if replaced == 0 {
      println!("   ⚠️  {} did not contain {}", file.display(), current);
    } else {
      println!("   Updated {}", file.display());
    }
  }

  // 3. Update the release anchor
  let git = SystemGit::open(&package_dir)?;
  let head_sha = git.head_commit()?;
  let mut tracker = ReleaseTracker::load(&ctx.root)?;
  tracker.record_release(&new_version, &head_sha);
  tracker.save()?;
  println!(
    "   Updated relkit.toml anchor ({} @ {})",
    tracker.config().state.last_version.as_deref().unwrap_or("?"),
    &head_sha[..8.min(head_sha.len())]
  );

  println!();
  println!("✅ Version {} applied", new_version);
  println!();
  println!("Next steps:");
  println!("  relkit changelog generate");
  println!("  relkit tag --push");

  Ok(())
}

fn print_plan(plan: &ReleasePlan) {
  println!("📋 Release plan for '{}'", plan.package);
  println!();
  println!("   Current:  {}", plan.current_version);

  if plan.has_changes {
    println!("   Proposed: {} ({:?})", plan.proposed_version, plan.bump_type);
    println!("   Changes:  {} commit(s)", plan.commits.len());

    let (breaking, feats, fixes) = plan.summary_counts();
    if breaking > 0 {
      println!("             {} breaking change(s)", breaking);
    }
    if feats > 0 {
      println!("             {} feature(s)", feats);
    }
    if fixes > 0 {
      println!("             {} fix(es)", fixes);
    }

    println!();
    println!("To apply:");
    println!("  relkit version apply");
  } else if plan.is_first_release {
    println!("   Status:   First release (no anchor recorded yet)");
  } else {
    println!("   Status:   No changes since last release");
  }

  println!();
}
