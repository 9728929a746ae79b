//! Post-release monitoring: poll health signals against static thresholds
//!
//! A fixed-interval loop over three probes, exactly as long as the
//! configured window: registry dist-tag drift, version visibility, and new
//! GitHub issues mentioning the release. Threshold breaches become warning
//! steps in the report and, when a webhook is configured, a JSON POST via
//! curl.

use crate::core::config::RelkitConfig;
use crate::core::error::{RelError, RelResult, ToolError};
use crate::npm::NpmClient;
use crate::verify::report::{RunReport, StepStatus};
use semver::Version;
use std::process::Command;
use std::time::Instant;

/// One poll's worth of health signals
#[derive(Debug, Clone)]
pub struct HealthSample {
  pub version_visible: bool,
  pub dist_tag_ok: bool,
  pub new_issues: Option<u64>,
}

/// Probe the registry and GitHub once
pub fn sample_health(
  config: &RelkitConfig,
  npm: &NpmClient,
  version: &Version,
) -> RelResult<HealthSample> {
  let name = &config.package.name;

  let version_visible = npm.version_exists(name, version)?;
  let dist_tag_ok = npm
    .dist_tag_version(name, &config.release.dist_tag)?
    .map(|v| v == *version)
    .unwrap_or(false);

  let new_issues = match &config.monitor.github_repo {
    Some(repo) => count_issues_mentioning(repo, version).ok(),
    None => None,
  };

  Ok(HealthSample {
    version_visible,
    dist_tag_ok,
    new_issues,
  })
}

/// Count open issues mentioning the version via `gh api`
fn count_issues_mentioning(repo: &str, version: &Version) -> RelResult<u64> {
  let query = format!(
    "search/issues?q=repo:{}+state:open+type:issue+{}+in:title,body",
    repo, version
  );

  let output = Command::new("gh")
    .args(["api", &query, "--jq", ".total_count"])
    .output()
    .map_err(|_| RelError::Tool(ToolError::NotFound { tool: "gh".to_string() }))?;

  if !output.status.success() {
    return Err(RelError::message(format!(
      "gh api failed: {}",
      String::from_utf8_lossy(&output.stderr).trim()
    )));
  }

  Ok(String::from_utf8_lossy(&output.stdout).trim().parse()?)
}

/// Record one sample into the report; returns true when a threshold was breached
pub fn record_sample(
  config: &RelkitConfig,
  sample: &HealthSample,
  version: &Version,
  elapsed: std::time::Duration,
  report: &mut RunReport,
) -> bool {
  let mut breached = false;

  if sample.version_visible {
    report.record("registry-visibility", StepStatus::Pass, format!("{} visible on the registry", version), elapsed);
  } else {
    breached = true;
    report.record(
      "registry-visibility",
      StepStatus::Warning,
      format!("{} not (yet) visible on the registry", version),
      elapsed,
    );
  }

  if sample.dist_tag_ok {
    report.record(
      "dist-tag",
      StepStatus::Pass,
      format!("'{}' points at {}", config.release.dist_tag, version),
      elapsed,
    );
  } else {
    breached = true;
    report.record(
      "dist-tag",
      StepStatus::Warning,
      format!("'{}' does not point at {}", config.release.dist_tag, version),
      elapsed,
    );
  }

  match sample.new_issues {
    Some(count) if count > config.monitor.max_new_issues => {
      breached = true;
      report.record(
        "github-issues",
        StepStatus::Warning,
        format!(
          "{} open issue(s) mention {} (threshold {})",
          count, version, config.monitor.max_new_issues
        ),
        elapsed,
      );
    }
    Some(count) => {
      report.record(
        "github-issues",
        StepStatus::Pass,
        format!("{} open issue(s) mention {}", count, version),
        elapsed,
      );
    }
    None => {
      report.record(
        "github-issues",
        StepStatus::Skipped,
        "No monitor.github_repo configured",
        elapsed,
      );
    }
  }

  breached
}

/// POST an alert to the configured webhook via curl
///
/// The payload carries both `text` (Slack) and `content` (Discord) so either
/// endpoint renders it.
pub fn notify_webhook(webhook: &str, package: &str, version: &Version, detail: &str) -> RelResult<()> {
  let payload = serde_json::json!({
    "text": format!("⚠️ {} v{}: {}", package, version, detail),
    "content": format!("⚠️ {} v{}: {}", package, version, detail),
  })
  .to_string();

  let output = Command::new("curl")
    .args([
      "--silent",
      "--show-error",
      "--fail",
      "-X",
      "POST",
      "-H",
      "Content-Type: application/json",
      "-d",
      &payload,
      webhook,
    ])
    .output()
    .map_err(|e| RelError::message(format!("curl is not available: {}", e)))?;

  if !output.status.success() {
    return Err(RelError::message(format!(
      "Webhook POST failed: {}",
      String::from_utf8_lossy(&output.stderr).trim()
    )));
  }

  Ok(())
}

/// Run the full monitoring window
///
/// Polls every `interval_secs` until `duration_secs` elapses. Returns the
/// number of threshold breaches observed. In quiet mode per-poll lines are
/// replaced by a progress bar on stderr, keeping stdout machine-clean.
pub fn run_monitor(
  config: &RelkitConfig,
  npm: &NpmClient,
  version: &Version,
  report: &mut RunReport,
  quiet: bool,
) -> RelResult<usize> {
  let window = std::time::Duration::from_secs(config.monitor.duration_secs);
  let interval = std::time::Duration::from_secs(config.monitor.interval_secs);
  let total_polls = (config.monitor.duration_secs / config.monitor.interval_secs).max(1) as usize;
  let started = Instant::now();
  let mut breaches = 0usize;
  let mut poll = 0usize;

  let mut bar = if quiet {
    Some(crate::ui::progress::StepProgress::new(
      total_polls,
      format!("monitor {}@{}", config.package.name, version),
    ))
  } else {
    None
  };

  loop {
    poll += 1;
    let poll_started = Instant::now();

    if let Some(ref mut bar) = bar {
      bar.set(poll.min(total_polls));
    } else {
      println!("🔭 Poll #{} ({} elapsed)", poll, crate::utils::format_duration(started.elapsed()));
    }

    match sample_health(config, npm, version) {
      Ok(sample) => {
        if record_sample(config, &sample, version, poll_started.elapsed(), report) {
          breaches += 1;

          if let Some(webhook) = &config.monitor.webhook
            && let Err(e) = notify_webhook(webhook, &config.package.name, version, "health threshold breached")
          {
            report.record("webhook", StepStatus::Warning, e.to_string(), poll_started.elapsed());
          }
        }
      }
      Err(e) => {
        report.record("poll", StepStatus::Fail, e.to_string(), poll_started.elapsed());
      }
    }

    if started.elapsed() + interval > window {
      break;
    }
    std::thread::sleep(interval);
  }

  Ok(breaches)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample(visible: bool, tag_ok: bool, issues: Option<u64>) -> HealthSample {
    HealthSample {
      version_visible: visible,
      dist_tag_ok: tag_ok,
      new_issues: issues,
    }
  }

  #[test]
  fn test_record_sample_healthy() {
    let config = RelkitConfig::new("demo-pkg");
    let mut report = RunReport::new("monitoring", "demo-pkg", None);

    let breached = record_sample(
      &config,
      &sample(true, true, Some(0)),
      &Version::new(1, 0, 0),
      std::time::Duration::from_millis(10),
      &mut report,
    );

    assert!(!breached);
    assert!(report.passed());
    assert_eq!(report.steps.len(), 3);
  }

  #[test]
  fn test_record_sample_dist_tag_drift_breaches() {
    let config = RelkitConfig::new("demo-pkg");
    let mut report = RunReport::new("monitoring", "demo-pkg", None);

    let breached = record_sample(
      &config,
      &sample(true, false, None),
      &Version::new(1, 0, 0),
      std::time::Duration::from_millis(10),
      &mut report,
    );

    assert!(breached);
    assert!(report.steps.iter().any(|s| s.phase == "dist-tag" && s.status == StepStatus::Warning));
    assert!(report.steps.iter().any(|s| s.phase == "github-issues" && s.status == StepStatus::Skipped));
  }

  #[test]
  fn test_record_sample_issue_threshold() {
    let mut config = RelkitConfig::new("demo-pkg");
    config.monitor.max_new_issues = 2;
    let mut report = RunReport::new("monitoring", "demo-pkg", None);

    let breached = record_sample(
      &config,
      &sample(true, true, Some(3)),
      &Version::new(1, 0, 0),
      std::time::Duration::from_millis(10),
      &mut report,
    );

    assert!(breached);
    assert!(
      report
        .steps
        .iter()
        .any(|s| s.phase == "github-issues" && s.message.contains("threshold 2"))
    );
  }
}
