//! Publish command: validation-gated npm publish

use crate::checks::{CheckContext, create_publish_gate_runner};
use crate::core::context::ReleaseContext;
use crate::core::error::{RelError, RelResult, ValidationError};
use crate::npm::NpmClient;
use crate::utils::confirm;
use std::thread;
use std::time::Duration;

/// Seconds between post-publish visibility polls
const VISIBILITY_POLL_SECS: u64 = 5;

/// Number of post-publish visibility polls before giving up
const VISIBILITY_POLL_ATTEMPTS: u32 = 12;

/// Run the publish command
pub fn run_publish(
  ctx: &ReleaseContext,
  dist_tag: Option<String>,
  otp: Option<String>,
  yes: bool,
  dry_run: bool,
) -> RelResult<()> {
  let config = ctx.require_config()?;
  let package_dir = ctx.package_dir();

  let version = ctx.manifest.version()?;
  let name = ctx.manifest.name()?.to_string();
  let dist_tag = dist_tag.unwrap_or_else(|| config.release.dist_tag.clone());

  if ctx.manifest.is_private() {
    return Err(RelError::Validation(ValidationError::Gate {
      reason: "package.json is marked \"private\": true".to_string(),
    }));
  }

  // Gate 1: environment and repository checks
  println!("🔍 Running publish gates...");
  let check_ctx = CheckContext {
    package_root: ctx.root.clone(),
    config: ctx.config.clone(),
    thorough: !dry_run, // registry auth check only matters for a real publish
  };
  let runner = create_publish_gate_runner(config.release.sign_tags);
  let results = runner.run_all(&check_ctx)?;

  let failed: Vec<_> = results
    .iter()
    .filter(|r| !r.passed && r.severity == crate::checks::Severity::Error)
    .collect();
  if !failed.is_empty() {
    for result in &failed {
      println!("   ❌ {}: {}", result.check_name, result.message);
    }
    return Err(RelError::Validation(ValidationError::Gate {
      reason: format!("{} publish gate(s) failed", failed.len()),
    }));
  }
  println!("   ✅ Gates passed");

  let client = NpmClient::new(&package_dir, &config.package.registry);

  // Gate 2: tarball sanity
  println!("🔍 Validating package tarball (npm pack --dry-run)...");
  let pack = client.pack_dry_run()?;
  println!(
    "   ✅ {} ({} files, {} bytes unpacked)",
    pack.filename, pack.file_count, pack.unpacked_size
  );

  // Gate 3: dependency audit (blocking on critical/high)
  println!("🔍 Auditing dependencies...");
  let audit = client.audit()?;
  if audit.has_blocking() {
    return Err(RelError::Validation(ValidationError::Gate {
      reason: format!(
        "npm audit found {} critical and {} high severity vulnerabilities",
        audit.critical, audit.high
      ),
    }));
  }
  if audit.total() > 0 {
    println!("   ⚠️  {} lower-severity vulnerabilities (not blocking)", audit.total());
  } else {
    println!("   ✅ No known vulnerabilities");
  }

  // Gate 4: duplicate version guard
  if client.version_exists(&name, &version)? {
    return Err(RelError::Validation(ValidationError::Gate {
      reason: format!("{}@{} is already published", name, version),
    }));
  }

  println!();
  println!("📦 Ready to publish {}@{} (dist-tag '{}')", name, version, dist_tag);

  if dry_run {
    println!("🔍 Dry-run mode - skipping actual publish");
    return Ok(());
  }

  if !yes && !confirm(&format!("About to publish {}@{} to {}. Continue?", name, version, config.package.registry))? {
    println!("⏭️  Aborted");
    return Ok(());
  }

  println!("🚀 Publishing...");
  client.publish(&dist_tag, otp.as_deref())?;
  println!("✅ Published {}@{}", name, version);

  // Post-publish: wait for registry propagation with a bounded poll
  println!("⏳ Waiting for registry propagation...");
  let mut visible = false;
  for attempt in 1..=VISIBILITY_POLL_ATTEMPTS {
    if client.version_exists(&name, &version)? {
      visible = true;
      break;
    }
    if attempt < VISIBILITY_POLL_ATTEMPTS {
      thread::sleep(Duration::from_secs(VISIBILITY_POLL_SECS));
    }
  }

  if visible {
    println!("✅ {}@{} is visible on the registry", name, version);
  } else {
    println!(
      "⚠️  Not visible after {}s; the registry may still be propagating",
      u64::from(VISIBILITY_POLL_ATTEMPTS) * VISIBILITY_POLL_SECS
    );
  }

  println!();
  println!("Next steps:");
  println!("  relkit verify --stress 4");
  println!("  relkit monitor");

  Ok(())
}
