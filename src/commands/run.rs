//! Run command: the full release pipeline in one shot
//!
//! doctor gates → version apply → changelog generate → tag → publish →
//! verify. Stops at the first failing stage; each stage is the same code
//! the standalone subcommands run.

use crate::checks::{CheckContext, create_publish_gate_runner};
use crate::commands;
use crate::core::context::ReleaseContext;
use crate::core::error::{RelError, RelResult, ValidationError};
use crate::utils::confirm;

/// Run the release pipeline
pub fn run_release(ctx: &ReleaseContext, skip_publish: bool, yes: bool, dry_run: bool) -> RelResult<()> {
  let config = ctx.require_config()?;

  let mut stages = vec!["gates", "version", "changelog", "tag"];
  if !skip_publish {
    stages.push("publish");
    stages.push("verify");
  }

  println!("🚂 Release pipeline for '{}'", config.package.name);
  println!("   Stages: {}", stages.join(" → "));
  if dry_run {
    println!("   Mode:   dry-run (nothing will be mutated)");
  }
  println!();

  // Stage 1: gates
  println!("━━ Stage 1/{}: gates", stages.len());
  let check_ctx = CheckContext {
    package_root: ctx.root.clone(),
    config: ctx.config.clone(),
    thorough: !dry_run,
  };
  let runner = create_publish_gate_runner(config.release.sign_tags);
  let results = runner.run_all(&check_ctx)?;
  let mut gate_failures = 0;
  for result in &results {
    let icon = if result.passed { "✅" } else { "❌" };
    println!("   {} {}: {}", icon, result.check_name, result.message);
    if !result.passed && result.severity == crate::checks::Severity::Error {
      gate_failures += 1;
    }
  }
  if gate_failures > 0 {
    return Err(RelError::Validation(ValidationError::Gate {
      reason: format!("{} gate(s) failed; fix them and re-run", gate_failures),
    }));
  }
  println!();

  // Stage 2: version bump
  println!("━━ Stage 2/{}: version", stages.len());
  let version_before = ctx.manifest.version()?;
  commands::run_version_apply(ctx, None, None, dry_run)?;
  println!();

  // Re-read everything the bump changed (manifest version, state anchor)
  let ctx = if dry_run {
    ctx.clone()
  } else {
    ReleaseContext::build(&ctx.root)?
  };

  if !dry_run && ctx.manifest.version()? == version_before {
    println!("✅ Nothing to release; pipeline stopped after the version stage");
    return Ok(());
  }

  // Stage 3: changelog
  println!("━━ Stage 3/{}: changelog", stages.len());
  match commands::run_changelog_generate(&ctx, None, false, dry_run) {
    Ok(()) => {}
    Err(e) if dry_run => {
      // A dry-run bump leaves package.json untouched, so promotion can
      // legitimately collide with the existing version section
      println!("   (skipped in dry-run: {})", e);
    }
    Err(e) => return Err(e),
  }
  println!();

  // Stage 4: tag
  println!("━━ Stage 4/{}: tag", stages.len());
  match commands::run_tag(&ctx, !dry_run, false, dry_run) {
    Ok(()) => {}
    Err(e) if dry_run => {
      // Same collision as the changelog stage: the un-bumped version may
      // already carry a tag
      println!("   (skipped in dry-run: {})", e);
    }
    Err(e) => return Err(e),
  }
  println!();

  if skip_publish {
    println!("⏭️  Publish skipped (--skip-publish)");
    println!("✅ Pipeline complete");
    return Ok(());
  }

  if !dry_run && !yes && !confirm("Proceed to publish?")? {
    println!("⏭️  Stopped before publish (version, changelog, and tag are in place)");
    return Ok(());
  }

  // Stage 5: publish
  println!("━━ Stage 5/{}: publish", stages.len());
  commands::run_publish(&ctx, None, None, true, dry_run)?;
  println!();

  // Stage 6: verify
  println!("━━ Stage 6/{}: verify", stages.len());
  if dry_run {
    println!("🔍 Dry-run mode (nothing was published, nothing to verify)");
  } else {
    commands::run_verify(&ctx, None, 4, false)?;
  }

  println!();
  println!("🎉 Pipeline complete");
  println!();
  println!("Next: relkit monitor");

  Ok(())
}
