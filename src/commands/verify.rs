//! Verify command: post-publish verification of a released version

use crate::core::context::ReleaseContext;
use crate::core::error::{RelError, RelResult, ValidationError};
use crate::core::vcs::SystemGit;
use crate::npm::NpmClient;
use crate::release::changelog::ChangelogDoc;
use crate::utils::parse_version;
use crate::verify::report::{RunReport, StepStatus};
use crate::verify::stress;
use std::time::Instant;

/// Run the verify command
pub fn run_verify(
  ctx: &ReleaseContext,
  release: Option<String>,
  stress_workers: usize,
  json: bool,
) -> RelResult<()> {
  let config = ctx.require_config()?;
  let package_dir = ctx.package_dir();

  let version = match release {
    Some(raw) => parse_version(&raw)?,
    None => ctx.manifest.version()?,
  };
  let name = ctx.manifest.name()?.to_string();

  let client = NpmClient::new(&package_dir, &config.package.registry);
  let mut report = RunReport::new("verification", &name, Some(&version));

  if !json {
    println!("🔎 Verifying {}@{}...", name, version);
    println!();
  }

  // 1. Registry visibility
  let started = Instant::now();
  match client.version_exists(&name, &version) {
    Ok(true) => {
      report.record("registry", StepStatus::Pass, "version visible on the registry", started.elapsed());
    }
    Ok(false) => {
      report.record("registry", StepStatus::Fail, "version not found on the registry", started.elapsed());
    }
    Err(e) => {
      report.record("registry", StepStatus::Fail, e.to_string(), started.elapsed());
    }
  }

  // 2. Dist-tag correctness (a mismatch is a hard failure, not a warning)
  let started = Instant::now();
  match client.dist_tag_version(&name, &config.release.dist_tag) {
    Ok(Some(tagged)) if tagged == version => {
      report.record(
        "dist-tag",
        StepStatus::Pass,
        format!("'{}' points at {}", config.release.dist_tag, version),
        started.elapsed(),
      );
    }
    Ok(Some(tagged)) => {
      report.record(
        "dist-tag",
        StepStatus::Fail,
        format!("'{}' points at {} instead of {}", config.release.dist_tag, tagged, version),
        started.elapsed(),
      );
    }
    Ok(None) => {
      report.record(
        "dist-tag",
        StepStatus::Fail,
        format!("dist-tag '{}' does not exist", config.release.dist_tag),
        started.elapsed(),
      );
    }
    Err(e) => {
      report.record("dist-tag", StepStatus::Fail, e.to_string(), started.elapsed());
    }
  }

  // 3. Git tag present (and signature when signing is on)
  let started = Instant::now();
  let tag = config.tag_for(&version);
  match SystemGit::open(&package_dir) {
    Ok(git) => match git.tag_exists(&tag) {
      Ok(true) => {
        if config.release.sign_tags {
          if git.verify_tag(&tag)? {
            report.record("git-tag", StepStatus::Pass, format!("{} exists and signature verifies", tag), started.elapsed());
          } else {
            report.record("git-tag", StepStatus::Fail, format!("{} exists but signature does not verify", tag), started.elapsed());
          }
        } else {
          report.record("git-tag", StepStatus::Pass, format!("{} exists", tag), started.elapsed());
        }
      }
      Ok(false) => {
        report.record("git-tag", StepStatus::Fail, format!("tag {} does not exist", tag), started.elapsed());
      }
      Err(e) => {
        report.record("git-tag", StepStatus::Fail, e.to_string(), started.elapsed());
      }
    },
    Err(e) => {
      report.record("git-tag", StepStatus::Fail, e.to_string(), started.elapsed());
    }
  }

  // 4. Changelog carries the release
  let started = Instant::now();
  match std::fs::read_to_string(ctx.changelog_path()?) {
    Ok(content) => {
      if ChangelogDoc::parse(&content).has_version(&version) {
        report.record("changelog", StepStatus::Pass, format!("section [{}] present", version), started.elapsed());
      } else {
        report.record("changelog", StepStatus::Fail, format!("no section for [{}]", version), started.elapsed());
      }
    }
    Err(_) => {
      report.record("changelog", StepStatus::Fail, "changelog not found", started.elapsed());
    }
  }

  // 5. Install smoke + stress fan-out
  if stress_workers > 0 {
    let started = Instant::now();
    let outcome = stress::run_stress(&client, &name, &version, stress_workers);
    let status = if outcome.passed() {
      StepStatus::Pass
    } else {
      StepStatus::Fail
    };
    let message = match &outcome.first_failure {
      Some(failure) => format!(
        "{}/{} installs succeeded; first failure: {}",
        outcome.succeeded, outcome.attempted, failure
      ),
      None => format!("{}/{} installs succeeded", outcome.succeeded, outcome.attempted),
    };
    report
      .record("stress", status, message, started.elapsed())
      .details = Some(serde_json::to_value(&outcome)?);
  } else {
    report.record("stress", StepStatus::Skipped, "stress disabled (--stress 0)", std::time::Duration::ZERO);
  }

  // Output
  if json {
    println!("{}", report.to_json()?);
  } else {
    for step in &report.steps {
      println!("{} {}: {}", step.status.icon(), step.phase, step.message);
    }
    println!();

    let (pass, fail, warn, skip) = report.counts();
    println!("Summary: {} passed, {} failed, {} warning(s), {} skipped", pass, fail, warn, skip);

    let path = report.save_markdown(&ctx.root)?;
    println!("📄 Report written to {}", path.display());
  }

  if !report.passed() {
    return Err(RelError::Validation(ValidationError::Gate {
      reason: format!("verification failed for {}@{}", name, version),
    }));
  }

  Ok(())
}
