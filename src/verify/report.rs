//! Typed step reports for verification, rollback, and orchestration runs
//!
//! Every step records `{phase, status, message, details, duration_ms,
//! timestamp}`; a run accumulates steps and renders as JSON (for CI) or
//! Markdown (the report files the workflow archives).

use crate::core::error::{RelResult, ResultExt};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
  Pass,
  Fail,
  Warning,
  Skipped,
}

impl StepStatus {
  pub fn icon(&self) -> &'static str {
    match self {
      StepStatus::Pass => "✅",
      StepStatus::Fail => "❌",
      StepStatus::Warning => "⚠️",
      StepStatus::Skipped => "⏭️",
    }
  }
}

impl fmt::Display for StepStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepStatus::Pass => write!(f, "pass"),
      StepStatus::Fail => write!(f, "fail"),
      StepStatus::Warning => write!(f, "warning"),
      StepStatus::Skipped => write!(f, "skipped"),
    }
  }
}

/// A single recorded step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
  pub phase: String,
  pub status: StepStatus,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
  pub duration_ms: u64,
  pub timestamp: String,
}

/// An accumulated run of steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
  /// Run kind, e.g. "verification", "rollback", "release"
  pub title: String,
  pub package: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  pub started_at: String,
  pub steps: Vec<StepReport>,
}

impl RunReport {
  pub fn new(title: impl Into<String>, package: impl Into<String>, version: Option<&semver::Version>) -> Self {
    Self {
      title: title.into(),
      package: package.into(),
      version: version.map(|v| v.to_string()),
      started_at: Utc::now().to_rfc3339(),
      steps: Vec::new(),
    }
  }

  /// Record a step
  pub fn record(
    &mut self,
    phase: impl Into<String>,
    status: StepStatus,
    message: impl Into<String>,
    duration: Duration,
  ) -> &mut StepReport {
    self.steps.push(StepReport {
      phase: phase.into(),
      status,
      message: message.into(),
      details: None,
      duration_ms: duration.as_millis() as u64,
      timestamp: Utc::now().to_rfc3339(),
    });
    self.steps.last_mut().unwrap()
  }

  /// Counts by status: (pass, fail, warning, skipped)
  pub fn counts(&self) -> (usize, usize, usize, usize) {
    let mut pass = 0;
    let mut fail = 0;
    let mut warn = 0;
    let mut skip = 0;

    for step in &self.steps {
      match step.status {
        StepStatus::Pass => pass += 1,
        StepStatus::Fail => fail += 1,
        StepStatus::Warning => warn += 1,
        StepStatus::Skipped => skip += 1,
      }
    }

    (pass, fail, warn, skip)
  }

  /// Whether the run had no failures
  pub fn passed(&self) -> bool {
    self.steps.iter().all(|s| s.status != StepStatus::Fail)
  }

  /// Render as pretty JSON
  pub fn to_json(&self) -> RelResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Render as a Markdown report
  pub fn to_markdown(&self) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {} report: {}", capitalize(&self.title), self.package));
    if let Some(ref version) = self.version {
      out.push_str(&format!(" v{}", version));
    }
    out.push_str("\n\n");
    out.push_str(&format!("Started: {}\n\n", self.started_at));

    let (pass, fail, warn, skip) = self.counts();
    out.push_str(&format!(
      "**Summary**: {} passed, {} failed, {} warning(s), {} skipped\n\n",
      pass, fail, warn, skip
    ));

    out.push_str("| Phase | Status | Duration | Message |\n");
    out.push_str("|-------|--------|----------|---------|\n");
    for step in &self.steps {
      out.push_str(&format!(
        "| {} | {} {} | {}ms | {} |\n",
        step.phase,
        step.status.icon(),
        step.status,
        step.duration_ms,
        step.message.replace('|', "\\|").replace('\n', " "),
      ));
    }

    out.push('\n');
    out
  }

  /// Write the Markdown report under `<root>/.relkit/reports/`
  ///
  /// Returns the path written.
  pub fn save_markdown(&self, root: &Path) -> RelResult<PathBuf> {
    let reports_dir = root.join(".relkit").join("reports");
    std::fs::create_dir_all(&reports_dir)
      .with_context(|| format!("Failed to create {}", reports_dir.display()))?;

    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let filename = format!("{}-{}.md", crate::utils::filename_safe(&self.title), stamp);
    let path = reports_dir.join(filename);

    std::fs::write(&path, self.to_markdown()).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> RunReport {
    let mut report = RunReport::new("verification", "demo-pkg", Some(&semver::Version::new(1, 2, 3)));
    report.record("registry", StepStatus::Pass, "version visible", Duration::from_millis(120));
    report.record("dist-tag", StepStatus::Fail, "latest points at 1.2.2", Duration::from_millis(80));
    report.record("stress", StepStatus::Warning, "2/10 installs slow", Duration::from_secs(3));
    report
  }

  #[test]
  fn test_counts_and_passed() {
    let report = sample();
    assert_eq!(report.counts(), (1, 1, 1, 0));
    assert!(!report.passed());

    let mut ok = RunReport::new("verification", "demo-pkg", None);
    ok.record("registry", StepStatus::Pass, "ok", Duration::from_millis(1));
    assert!(ok.passed());
  }

  #[test]
  fn test_json_shape() {
    let report = sample();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["package"], "demo-pkg");
    assert_eq!(json["version"], "1.2.3");
    assert_eq!(json["steps"][0]["phase"], "registry");
    assert_eq!(json["steps"][0]["status"], "pass");
    assert!(json["steps"][0]["duration_ms"].is_u64());
    assert!(json["steps"][0]["timestamp"].is_string());
  }

  #[test]
  fn test_markdown_render() {
    let md = sample().to_markdown();
    assert!(md.contains("# Verification report: demo-pkg v1.2.3"));
    assert!(md.contains("1 passed, 1 failed, 1 warning(s), 0 skipped"));
    assert!(md.contains("| registry | ✅ pass |"));
    assert!(md.contains("| dist-tag | ❌ fail |"));
  }

  #[test]
  fn test_save_markdown() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = sample().save_markdown(dir.path()).unwrap();

    assert!(path.exists());
    assert!(path.to_string_lossy().contains("verification-"));
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("demo-pkg"));
  }

  #[test]
  fn test_record_details() {
    let mut report = RunReport::new("verification", "demo-pkg", None);
    report
      .record("registry", StepStatus::Pass, "ok", Duration::from_millis(5))
      .details = Some(serde_json::json!({ "versions": 3 }));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["steps"][0]["details"]["versions"], 3);
  }
}
