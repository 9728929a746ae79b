//! Release planning: analyze changes and suggest version bumps
//!
//! Uses existing infrastructure:
//! - SystemGit for commit analysis
//! - ConventionalCommit for message classification

use crate::core::config::RelkitConfig;
use crate::core::error::RelResult;
use crate::core::vcs::SystemGit;
use crate::release::commit::{CommitType, ConventionalCommit};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version bump type based on conventional commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
  /// Major version bump (breaking changes)
  Major,
  /// Minor version bump (new features)
  Minor,
  /// Patch version bump (bug fixes)
  Patch,
  /// No bump needed (no relevant changes)
  None,
}

impl VersionBump {
  /// Apply bump to a semver version
  ///
  /// Bumping clears any prerelease/build metadata, so "1.2.3-rc.1" + patch
  /// finalizes to "1.2.4".
  pub fn apply(&self, version: &Version) -> Version {
    match self {
      VersionBump::Major => Version::new(version.major + 1, 0, 0),
      VersionBump::Minor => Version::new(version.major, version.minor + 1, 0),
      VersionBump::Patch => Version::new(version.major, version.minor, version.patch + 1),
      VersionBump::None => version.clone(),
    }
  }

  /// Parse a bump keyword from the CLI
  pub fn from_keyword(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "major" => Some(VersionBump::Major),
      "minor" => Some(VersionBump::Minor),
      "patch" => Some(VersionBump::Patch),
      _ => None,
    }
  }
}

/// A single commit relevant to the release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseCommit {
  pub sha: String,
  pub subject: String,
  pub commit_type: CommitType,
  pub scope: Option<String>,
  pub is_breaking: bool,
  /// Parsed form; None for non-conventional commits
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parsed: Option<ConventionalCommit>,
}

/// Release plan for the package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePlan {
  pub package: String,
  pub current_version: Version,
  pub proposed_version: Version,
  pub bump_type: VersionBump,
  pub commits: Vec<ReleaseCommit>,
  pub has_changes: bool,
  pub is_first_release: bool,
}

impl ReleasePlan {
  /// Analyze commits since the release anchor and propose a bump
  pub fn analyze(package_dir: &Path, config: &RelkitConfig, current_version: &Version) -> RelResult<Self> {
    let git = SystemGit::open(package_dir)?;
    let is_first_release = config.state.is_first_release();

    let since = config.state.last_sha.as_deref();
    let raw_commits = git.commits_since(since)?;

    let commits: Vec<ReleaseCommit> = raw_commits
      .iter()
      .map(|c| {
        let parsed = ConventionalCommit::parse(&c.message());
        let (commit_type, scope, is_breaking) = match &parsed {
          Some(p) => (p.commit_type, p.scope.clone(), p.is_breaking()),
          None => (CommitType::Other, None, false),
        };

        ReleaseCommit {
          sha: c.sha.clone(),
          subject: c.subject.clone(),
          commit_type,
          scope,
          is_breaking,
          parsed,
        }
      })
      .collect();

    let bump_type = Self::determine_bump(&commits);
    let proposed_version = bump_type.apply(current_version);

    Ok(Self {
      package: config.package.name.clone(),
      current_version: current_version.clone(),
      proposed_version,
      bump_type,
      has_changes: !commits.is_empty(),
      commits,
      is_first_release,
    })
  }

  /// Determine version bump from commits
  pub fn determine_bump(commits: &[ReleaseCommit]) -> VersionBump {
    if commits.is_empty() {
      return VersionBump::None;
    }

    if commits.iter().any(|c| c.is_breaking) {
      return VersionBump::Major;
    }

    if commits.iter().any(|c| c.commit_type == CommitType::Feat) {
      return VersionBump::Minor;
    }

    // Fixes, perf, and anything else all land as a patch: the scripts this
    // replaces never skipped a release once commits existed
    VersionBump::Patch
  }

  /// Override the proposed bump (for `version apply --bump`)
  pub fn with_bump(mut self, bump: VersionBump) -> Self {
    self.bump_type = bump;
    self.proposed_version = bump.apply(&self.current_version);
    self
  }

  /// Attach a prerelease identifier to the proposed version, e.g. "rc.1"
  pub fn with_prerelease(mut self, pre: &str) -> RelResult<Self> {
    let tagged = format!("{}-{}", self.proposed_version, pre);
    self.proposed_version = crate::utils::parse_version(&tagged)?;
    Ok(self)
  }

  /// Count commits by kind for summary output
  pub fn summary_counts(&self) -> (usize, usize, usize) {
    let breaking = self.commits.iter().filter(|c| c.is_breaking).count();
    let feats = self
      .commits
      .iter()
      .filter(|c| c.commit_type == CommitType::Feat)
      .count();
    let fixes = self
      .commits
      .iter()
      .filter(|c| c.commit_type == CommitType::Fix)
      .count();
    (breaking, feats, fixes)
  }
}
