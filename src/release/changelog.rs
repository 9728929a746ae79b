//! Keep a Changelog document model: parsing, validation, and generation
//!
//! The changelog format is the one the release scripts enforced:
//! a `# Changelog` header, an `## [Unreleased]` section, and release
//! sections `## [X.Y.Z] - YYYY-MM-DD` with `### Added/Changed/...`
//! category subsections.

use crate::core::error::{RelError, RelResult, ValidationError};
use crate::release::commit::CommitType;
use crate::release::plan::ReleaseCommit;
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Keep a Changelog category headings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
  Added,
  Changed,
  Deprecated,
  Removed,
  Fixed,
  Security,
}

impl Category {
  pub const ALL: [Category; 6] = [
    Category::Added,
    Category::Changed,
    Category::Deprecated,
    Category::Removed,
    Category::Fixed,
    Category::Security,
  ];

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim() {
      "Added" => Some(Category::Added),
      "Changed" => Some(Category::Changed),
      "Deprecated" => Some(Category::Deprecated),
      "Removed" => Some(Category::Removed),
      "Fixed" => Some(Category::Fixed),
      "Security" => Some(Category::Security),
      _ => None,
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Category::Added => write!(f, "Added"),
      Category::Changed => write!(f, "Changed"),
      Category::Deprecated => write!(f, "Deprecated"),
      Category::Removed => write!(f, "Removed"),
      Category::Fixed => write!(f, "Fixed"),
      Category::Security => write!(f, "Security"),
    }
  }
}

/// One `## [...]` section of the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
  /// Text inside the brackets ("Unreleased", "1.2.3", "1.2.3 [YANKED]" is not split)
  pub label: String,
  /// Parsed version; None for the Unreleased section or unparseable labels
  pub version: Option<Version>,
  /// Date suffix after " - ", if present
  pub date: Option<String>,
  /// Marker suffix after the bracket, e.g. "[YANKED]"
  pub marker: Option<String>,
  /// Raw section body between this heading and the next `##`
  pub body: String,
}

impl Section {
  pub fn is_unreleased(&self) -> bool {
    self.label.eq_ignore_ascii_case("unreleased")
  }

  pub fn has_content(&self) -> bool {
    self.body.lines().any(|l| !l.trim().is_empty())
  }
}

/// Parsed changelog document
#[derive(Debug, Clone)]
pub struct ChangelogDoc {
  /// Everything before the first `## ` heading (title + intro prose)
  pub preamble: String,
  /// Sections in file order (Unreleased first in a well-formed file)
  pub sections: Vec<Section>,
}

fn heading_regex() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"^##\s+\[(?P<label>[^\]]+)\](?:\s*-\s*(?P<date>\S+))?(?:\s+(?P<marker>\[.+\]))?\s*$")
      .expect("heading regex is valid")
  })
}

fn date_regex() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex is valid"))
}

impl ChangelogDoc {
  /// Parse a changelog into preamble + sections
  pub fn parse(content: &str) -> Self {
    let mut preamble = String::new();
    let mut sections: Vec<Section> = Vec::new();

    for line in content.lines() {
      if let Some(caps) = heading_regex().captures(line) {
        let label = caps["label"].to_string();
        sections.push(Section {
          version: Version::parse(&label).ok(),
          date: caps.name("date").map(|m| m.as_str().to_string()),
          marker: caps.name("marker").map(|m| m.as_str().to_string()),
          label,
          body: String::new(),
        });
      } else if let Some(current) = sections.last_mut() {
        current.body.push_str(line);
        current.body.push('\n');
      } else {
        preamble.push_str(line);
        preamble.push('\n');
      }
    }

    Self { preamble, sections }
  }

  /// Render back to markdown
  pub fn render(&self) -> String {
    let mut out = String::new();
    out.push_str(&self.preamble);

    for section in &self.sections {
      out.push_str(&format!("## [{}]", section.label));
      if let Some(ref date) = section.date {
        out.push_str(&format!(" - {}", date));
      }
      if let Some(ref marker) = section.marker {
        out.push_str(&format!(" {}", marker));
      }
      out.push('\n');
      out.push_str(&section.body);
    }

    out
  }

  /// The Unreleased section, if present
  pub fn unreleased(&self) -> Option<&Section> {
    self.sections.iter().find(|s| s.is_unreleased())
  }

  /// Whether a release section for this version exists
  pub fn has_version(&self, version: &Version) -> bool {
    self.sections.iter().any(|s| s.version.as_ref() == Some(version))
  }

  /// Move the Unreleased content into a new release section, leaving a
  /// fresh empty Unreleased section behind
  pub fn promote_unreleased(&mut self, version: &Version, date: &str) -> RelResult<()> {
    if self.has_version(version) {
      return Err(RelError::Validation(ValidationError::Changelog {
        reason: format!("a section for {} already exists", version),
      }));
    }

    let idx = self
      .sections
      .iter()
      .position(|s| s.is_unreleased())
      .ok_or_else(|| {
        RelError::Validation(ValidationError::Changelog {
          reason: "no ## [Unreleased] section to promote".to_string(),
        })
      })?;

    if !self.sections[idx].has_content() {
      return Err(RelError::Validation(ValidationError::Changelog {
        reason: "the ## [Unreleased] section is empty; nothing to release".to_string(),
      }));
    }

    let body = std::mem::take(&mut self.sections[idx].body);
    self.sections[idx].body = "\n".to_string();

    let release = Section {
      label: version.to_string(),
      version: Some(version.clone()),
      date: Some(date.to_string()),
      marker: None,
      body,
    };
    self.sections.insert(idx + 1, release);

    Ok(())
  }

  /// Insert a pre-rendered release section after Unreleased (or at the top)
  pub fn insert_release(&mut self, section: Section) {
    let idx = self
      .sections
      .iter()
      .position(|s| s.is_unreleased())
      .map(|i| i + 1)
      .unwrap_or(0);
    self.sections.insert(idx, section);
  }

  /// Mark a release section as yanked (rollback docs scope)
  pub fn mark_yanked(&mut self, version: &Version) -> bool {
    for section in &mut self.sections {
      if section.version.as_ref() == Some(version) {
        section.marker = Some("[YANKED]".to_string());
        return true;
      }
    }
    false
  }
}

/// Severity of a changelog validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
  Warning,
  Error,
}

/// A single changelog validation finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogIssue {
  pub severity: IssueSeverity,
  pub message: String,
}

impl ChangelogIssue {
  fn error(message: impl Into<String>) -> Self {
    Self {
      severity: IssueSeverity::Error,
      message: message.into(),
    }
  }

  fn warning(message: impl Into<String>) -> Self {
    Self {
      severity: IssueSeverity::Warning,
      message: message.into(),
    }
  }
}

/// Validate a changelog against the Keep a Changelog structure
///
/// A missing `## [Unreleased]` section is a hard error. Returns all
/// findings; callers decide whether warnings fail the run (--strict).
pub fn validate(content: &str) -> Vec<ChangelogIssue> {
  let mut issues = Vec::new();
  let doc = ChangelogDoc::parse(content);

  if !doc.preamble.lines().any(|l| l.trim_start().starts_with("# ")) {
    issues.push(ChangelogIssue::warning("missing top-level '# Changelog' heading"));
  }

  if doc.unreleased().is_none() {
    issues.push(ChangelogIssue::error("missing '## [Unreleased]' section"));
  }

  let mut seen: Vec<&Version> = Vec::new();
  let mut prev: Option<&Version> = None;

  for section in &doc.sections {
    if section.is_unreleased() {
      if section.date.is_some() {
        issues.push(ChangelogIssue::warning("the Unreleased section must not carry a date"));
      }
      continue;
    }

    let Some(version) = section.version.as_ref() else {
      issues.push(ChangelogIssue::error(format!(
        "section heading '[{}]' is not a valid semver version",
        section.label
      )));
      continue;
    };

    if seen.contains(&version) {
      issues.push(ChangelogIssue::error(format!("duplicate section for version {}", version)));
    }
    seen.push(version);

    match &section.date {
      Some(date) if !date_regex().is_match(date) => {
        issues.push(ChangelogIssue::warning(format!(
          "release {} has a malformed date '{}' (expected YYYY-MM-DD)",
          version, date
        )));
      }
      None => {
        issues.push(ChangelogIssue::warning(format!("release {} has no date", version)));
      }
      _ => {}
    }

    if let Some(p) = prev
      && version >= p
    {
      issues.push(ChangelogIssue::error(format!(
        "versions out of order: {} appears below {}",
        version, p
      )));
    }
    prev = Some(version);

    for line in section.body.lines() {
      if let Some(rest) = line.trim_end().strip_prefix("### ")
        && Category::parse(rest).is_none()
      {
        issues.push(ChangelogIssue::warning(format!(
          "unknown category '### {}' under {}",
          rest.trim(),
          version
        )));
      }
    }
  }

  issues
}

/// Map a release commit to a changelog category, or None to omit it
fn category_for(commit: &ReleaseCommit) -> Option<Category> {
  if commit.scope.as_deref() == Some("security") {
    return Some(Category::Security);
  }

  match commit.commit_type {
    CommitType::Feat => Some(Category::Added),
    CommitType::Fix => Some(Category::Fixed),
    CommitType::Perf | CommitType::Refactor => Some(Category::Changed),
    CommitType::Revert => Some(Category::Removed),
    _ => None,
  }
}

/// Render a release section from conventional commits
pub fn section_from_commits(version: &Version, date: &str, commits: &[ReleaseCommit]) -> Section {
  let mut body = String::from("\n");

  for category in Category::ALL {
    let entries: Vec<&ReleaseCommit> = commits
      .iter()
      .filter(|c| category_for(c) == Some(category))
      .collect();

    if entries.is_empty() {
      continue;
    }

    body.push_str(&format!("### {}\n\n", category));

    for commit in entries {
      let scope_str = commit
        .scope
        .as_ref()
        .filter(|s| s.as_str() != "security")
        .map(|s| format!("**{}**: ", s))
        .unwrap_or_default();
      let breaking = if commit.is_breaking { "**BREAKING**: " } else { "" };
      let description = commit
        .parsed
        .as_ref()
        .map(|p| p.description.as_str())
        .unwrap_or(commit.subject.as_str());

      body.push_str(&format!("- {}{}{}\n", breaking, scope_str, description));
    }

    body.push('\n');
  }

  Section {
    label: version.to_string(),
    version: Some(version.clone()),
    date: Some(date.to_string()),
    marker: None,
    body,
  }
}

/// A starter changelog for `relkit init`
pub fn starter(package_name: &str) -> String {
  format!(
    "# Changelog\n\nAll notable changes to {} will be documented in this file.\n\nThe format is based on [Keep a Changelog](https://keepachangelog.com/en/1.1.0/),\nand this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).\n\n## [Unreleased]\n",
    package_name
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::release::commit::ConventionalCommit;

  const SAMPLE: &str = "# Changelog\n\nAll notable changes.\n\n## [Unreleased]\n\n### Added\n\n- pending thing\n\n## [1.1.0] - 2025-03-01\n\n### Added\n\n- shiny feature\n\n## [1.0.0] - 2025-01-15\n\n### Fixed\n\n- first fix\n";

  #[test]
  fn test_parse_sections() {
    let doc = ChangelogDoc::parse(SAMPLE);
    assert_eq!(doc.sections.len(), 3);
    assert!(doc.sections[0].is_unreleased());
    assert_eq!(doc.sections[1].version, Some(Version::new(1, 1, 0)));
    assert_eq!(doc.sections[1].date.as_deref(), Some("2025-03-01"));
    assert!(doc.preamble.contains("# Changelog"));
  }

  #[test]
  fn test_render_roundtrip() {
    let doc = ChangelogDoc::parse(SAMPLE);
    assert_eq!(doc.render(), SAMPLE);
  }

  #[test]
  fn test_validate_clean() {
    let issues = validate(SAMPLE);
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
  }

  #[test]
  fn test_validate_missing_unreleased_is_error() {
    let content = "# Changelog\n\n## [1.0.0] - 2025-01-15\n\n### Fixed\n\n- fix\n";
    let issues = validate(content);
    assert!(
      issues
        .iter()
        .any(|i| i.severity == IssueSeverity::Error && i.message.contains("Unreleased"))
    );
  }

  #[test]
  fn test_validate_bad_version_heading() {
    let content = "# Changelog\n\n## [Unreleased]\n\n## [v1.0.0] - 2025-01-15\n";
    let issues = validate(content);
    assert!(issues.iter().any(|i| i.severity == IssueSeverity::Error));
  }

  #[test]
  fn test_validate_out_of_order_versions() {
    let content = "# Changelog\n\n## [Unreleased]\n\n## [1.0.0] - 2025-01-01\n\n## [1.1.0] - 2025-02-01\n";
    let issues = validate(content);
    assert!(issues.iter().any(|i| i.message.contains("out of order")));
  }

  #[test]
  fn test_validate_duplicate_versions() {
    let content = "# Changelog\n\n## [Unreleased]\n\n## [1.0.0] - 2025-01-01\n\n## [1.0.0] - 2025-01-01\n";
    let issues = validate(content);
    assert!(issues.iter().any(|i| i.message.contains("duplicate")));
  }

  #[test]
  fn test_validate_unknown_category_warns() {
    let content = "# Changelog\n\n## [Unreleased]\n\n## [1.0.0] - 2025-01-01\n\n### Improvements\n\n- thing\n";
    let issues = validate(content);
    assert!(
      issues
        .iter()
        .any(|i| i.severity == IssueSeverity::Warning && i.message.contains("Improvements"))
    );
  }

  #[test]
  fn test_promote_unreleased() {
    let mut doc = ChangelogDoc::parse(SAMPLE);
    doc.promote_unreleased(&Version::new(1, 2, 0), "2025-06-01").unwrap();

    assert!(doc.has_version(&Version::new(1, 2, 0)));
    let unreleased = doc.unreleased().unwrap();
    assert!(!unreleased.has_content());

    let rendered = doc.render();
    assert!(rendered.contains("## [1.2.0] - 2025-06-01"));
    // Promoted body moved under the new heading
    let promoted_idx = rendered.find("## [1.2.0]").unwrap();
    let pending_idx = rendered.find("- pending thing").unwrap();
    assert!(pending_idx > promoted_idx);
  }

  #[test]
  fn test_promote_empty_unreleased_fails() {
    let content = "# Changelog\n\n## [Unreleased]\n\n## [1.0.0] - 2025-01-01\n\n### Fixed\n\n- fix\n";
    let mut doc = ChangelogDoc::parse(content);
    assert!(doc.promote_unreleased(&Version::new(1, 1, 0), "2025-06-01").is_err());
  }

  #[test]
  fn test_promote_duplicate_version_fails() {
    let mut doc = ChangelogDoc::parse(SAMPLE);
    assert!(doc.promote_unreleased(&Version::new(1, 1, 0), "2025-06-01").is_err());
  }

  #[test]
  fn test_mark_yanked() {
    let mut doc = ChangelogDoc::parse(SAMPLE);
    assert!(doc.mark_yanked(&Version::new(1, 1, 0)));
    assert!(doc.render().contains("## [1.1.0] - 2025-03-01 [YANKED]"));
    assert!(!doc.mark_yanked(&Version::new(9, 9, 9)));
  }

  fn release_commit(msg: &str) -> ReleaseCommit {
    let parsed = ConventionalCommit::parse(msg);
    let (commit_type, scope, is_breaking) = match &parsed {
      Some(p) => (p.commit_type, p.scope.clone(), p.is_breaking()),
      None => (CommitType::Other, None, false),
    };
    ReleaseCommit {
      sha: "abc123".to_string(),
      subject: msg.lines().next().unwrap_or("").to_string(),
      commit_type,
      scope,
      is_breaking,
      parsed,
    }
  }

  #[test]
  fn test_section_from_commits() {
    let commits = vec![
      release_commit("feat(cli): add rollback command"),
      release_commit("fix: registry poll timeout"),
      release_commit("fix(security): sanitize webhook payload"),
      release_commit("chore: bump deps"),
    ];

    let section = section_from_commits(&Version::new(1, 2, 0), "2025-06-01", &commits);

    assert!(section.body.contains("### Added"));
    assert!(section.body.contains("**cli**: add rollback command"));
    assert!(section.body.contains("### Fixed"));
    assert!(section.body.contains("### Security"));
    assert!(section.body.contains("sanitize webhook payload"));
    // Chores are omitted
    assert!(!section.body.contains("bump deps"));
  }

  #[test]
  fn test_section_from_commits_breaking_marker() {
    let commits = vec![release_commit("feat!: new config layout")];
    let section = section_from_commits(&Version::new(2, 0, 0), "2025-06-01", &commits);
    assert!(section.body.contains("**BREAKING**: new config layout"));
  }

  #[test]
  fn test_starter_passes_validation() {
    let issues = validate(&starter("demo-pkg"));
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
  }
}
