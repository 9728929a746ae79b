//! Conventional commit parsing
//!
//! Format: `<type>(<scope>)!: <description>` with optional body and
//! `BREAKING CHANGE:` / `Key: value` footers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Conventional commit types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
  /// New feature
  Feat,
  /// Bug fix
  Fix,
  /// Documentation changes
  Docs,
  /// Code style changes (formatting, etc.)
  Style,
  /// Refactoring (no functional changes)
  Refactor,
  /// Performance improvements
  Perf,
  /// Test additions or changes
  Test,
  /// Build system or external dependency changes
  Build,
  /// CI configuration changes
  Ci,
  /// Chores (maintenance tasks)
  Chore,
  /// Reverts a previous commit
  Revert,
  /// Other/unknown type
  Other,
}

impl CommitType {
  /// Parse commit type from its keyword
  pub fn from_keyword(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "feat" | "feature" => Self::Feat,
      "fix" => Self::Fix,
      "docs" | "doc" => Self::Docs,
      "style" => Self::Style,
      "refactor" => Self::Refactor,
      "perf" | "performance" => Self::Perf,
      "test" | "tests" => Self::Test,
      "build" => Self::Build,
      "ci" => Self::Ci,
      "chore" => Self::Chore,
      "revert" => Self::Revert,
      _ => Self::Other,
    }
  }

  /// Check if this commit type triggers a version bump
  pub fn is_user_facing(&self) -> bool {
    matches!(self, Self::Feat | Self::Fix | Self::Perf)
  }

  /// Get the display name for this commit type
  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Feat => "Features",
      Self::Fix => "Bug Fixes",
      Self::Docs => "Documentation",
      Self::Style => "Style",
      Self::Refactor => "Refactoring",
      Self::Perf => "Performance",
      Self::Test => "Tests",
      Self::Build => "Build",
      Self::Ci => "CI",
      Self::Chore => "Chores",
      Self::Revert => "Reverts",
      Self::Other => "Other",
    }
  }
}

impl fmt::Display for CommitType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.display_name())
  }
}

/// A parsed conventional commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionalCommit {
  /// Commit type (feat, fix, chore, docs, etc.)
  pub commit_type: CommitType,
  /// Optional scope (e.g., "auth", "cli", "registry")
  pub scope: Option<String>,
  /// Short description
  pub description: String,
  /// Full commit body (optional)
  pub body: Option<String>,
  /// Breaking change footer; Some("") for a bare `!` marker
  pub breaking_change: Option<String>,
  /// Other footers (e.g., "Closes: #123")
  pub footers: Vec<(String, String)>,
}

fn header_regex() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^)]+)\))?(?P<bang>!)?:\s+(?P<desc>.+)$")
      .expect("header regex is valid")
  })
}

fn footer_regex() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"^(?P<key>[A-Za-z][A-Za-z0-9 _-]*):\s*(?P<value>.*)$").expect("footer regex is valid")
  })
}

impl ConventionalCommit {
  /// Check if this commit is a breaking change
  pub fn is_breaking(&self) -> bool {
    self.breaking_change.is_some()
  }

  /// Parse a conventional commit from a git commit message
  ///
  /// Returns None if the message doesn't follow conventional commit format.
  /// This is intentional - not all commits need to be conventional.
  pub fn parse(message: &str) -> Option<Self> {
    let (first_line, rest) = message.split_once('\n').unwrap_or((message, ""));

    let caps = header_regex().captures(first_line.trim_end())?;

    let commit_type = CommitType::from_keyword(&caps["type"]);
    let scope = caps.name("scope").map(|m| m.as_str().to_string());
    let description = caps["desc"].trim().to_string();
    let mut breaking_change = None;

    // Body and footers: footers come after an empty line
    let mut body_lines = Vec::new();
    let mut footers = Vec::new();
    let mut seen_empty_line = false;
    let mut in_body = true;

    for line in rest.lines() {
      let trimmed = line.trim();

      if trimmed.is_empty() {
        seen_empty_line = true;
        continue;
      }

      if seen_empty_line && let Some(fc) = footer_regex().captures(trimmed) {
        let key = fc["key"].trim();
        let value = fc["value"].trim();

        if key.eq_ignore_ascii_case("BREAKING CHANGE") || key.eq_ignore_ascii_case("BREAKING-CHANGE") {
          breaking_change = Some(value.to_string());
          in_body = false;
          continue;
        }

        // Multi-word keys other than BREAKING CHANGE are body text, not footers
        if !key.contains(' ') {
          footers.push((key.to_string(), value.to_string()));
          in_body = false;
          continue;
        }
      }

      if in_body {
        body_lines.push(line);
        seen_empty_line = false;
      }
    }

    if breaking_change.is_none() && caps.name("bang").is_some() {
      breaking_change = Some(String::new());
    }

    let body = if body_lines.is_empty() {
      None
    } else {
      Some(body_lines.join("\n"))
    };

    Some(Self {
      commit_type,
      scope,
      description,
      body,
      breaking_change,
      footers,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_commit_type_from_keyword() {
    assert_eq!(CommitType::from_keyword("feat"), CommitType::Feat);
    assert_eq!(CommitType::from_keyword("FEAT"), CommitType::Feat);
    assert_eq!(CommitType::from_keyword("fix"), CommitType::Fix);
    assert_eq!(CommitType::from_keyword("docs"), CommitType::Docs);
    assert_eq!(CommitType::from_keyword("unknown"), CommitType::Other);
  }

  #[test]
  fn test_commit_type_user_facing() {
    assert!(CommitType::Feat.is_user_facing());
    assert!(CommitType::Fix.is_user_facing());
    assert!(CommitType::Perf.is_user_facing());
    assert!(!CommitType::Chore.is_user_facing());
    assert!(!CommitType::Docs.is_user_facing());
  }

  #[test]
  fn test_parse_simple_commit() {
    let commit = ConventionalCommit::parse("feat: add dist-tag verification").unwrap();

    assert_eq!(commit.commit_type, CommitType::Feat);
    assert_eq!(commit.scope, None);
    assert_eq!(commit.description, "add dist-tag verification");
    assert_eq!(commit.body, None);
    assert!(!commit.is_breaking());
  }

  #[test]
  fn test_parse_commit_with_scope() {
    let commit = ConventionalCommit::parse("fix(registry): retry visibility poll").unwrap();

    assert_eq!(commit.commit_type, CommitType::Fix);
    assert_eq!(commit.scope, Some("registry".to_string()));
    assert_eq!(commit.description, "retry visibility poll");
  }

  #[test]
  fn test_parse_commit_with_body() {
    let msg = "feat: add rollback scopes\n\nScopes can now be selected independently.";
    let commit = ConventionalCommit::parse(msg).unwrap();

    assert_eq!(
      commit.body,
      Some("Scopes can now be selected independently.".to_string())
    );
  }

  #[test]
  fn test_parse_commit_with_breaking_change_footer() {
    let msg = "feat!: new config layout\n\nBREAKING CHANGE: relkit.toml sections renamed";
    let commit = ConventionalCommit::parse(msg).unwrap();

    assert_eq!(
      commit.breaking_change,
      Some("relkit.toml sections renamed".to_string())
    );
    assert!(commit.is_breaking());
  }

  #[test]
  fn test_parse_bang_marks_breaking() {
    let commit = ConventionalCommit::parse("refactor!: drop node 14 support").unwrap();
    assert!(commit.is_breaking());
    assert_eq!(commit.breaking_change, Some(String::new()));
  }

  #[test]
  fn test_parse_commit_with_footers() {
    let msg = "fix: resolve bug\n\nCloses: #123\nReviewed-by: Alice";
    let commit = ConventionalCommit::parse(msg).unwrap();

    assert_eq!(commit.footers.len(), 2);
    assert_eq!(commit.footers[0], ("Closes".to_string(), "#123".to_string()));
    assert_eq!(commit.footers[1], ("Reviewed-by".to_string(), "Alice".to_string()));
  }

  #[test]
  fn test_parse_non_conventional_commit() {
    assert_eq!(ConventionalCommit::parse("This is not a conventional commit"), None);
    assert_eq!(ConventionalCommit::parse("feat missing colon"), None);
    assert_eq!(ConventionalCommit::parse(""), None);
  }

  #[test]
  fn test_commit_type_display() {
    assert_eq!(CommitType::Feat.to_string(), "Features");
    assert_eq!(CommitType::Fix.to_string(), "Bug Fixes");
  }
}
