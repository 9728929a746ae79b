//! Rollback planning: resolve the target version, enumerate scope steps
//!
//! Every rollback produces a plan before execution, enabling:
//!
//! - **Dry-run mode**: show what will happen without doing it
//! - **Auditability**: plans are JSON-serializable for logging/review
//! - **Idempotency**: same input → same plan id

use crate::core::config::{RelkitConfig, RollbackScope};
use crate::core::error::{RelError, RelResult};
use crate::core::vcs::SystemGit;
use crate::npm::NpmClient;
use semver::Version;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA-256 hash of plan contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// A planned rollback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackPlan {
  pub id: PlanId,
  pub package: String,
  /// Version being rolled back
  pub bad_version: Version,
  /// Version the rollback restores
  pub target_version: Version,
  /// Tag of the bad version (e.g. "v1.1.0")
  pub bad_tag: String,
  /// Scopes to execute, in order
  pub scopes: Vec<RollbackScope>,
  /// Human-readable step descriptions, in execution order
  pub steps: Vec<String>,
}

impl RollbackPlan {
  /// Build a rollback plan
  pub fn build(
    config: &RelkitConfig,
    bad_version: Version,
    target_version: Version,
    scopes: Vec<RollbackScope>,
  ) -> RelResult<Self> {
    if target_version >= bad_version {
      return Err(RelError::with_help(
        format!(
          "Target version {} is not older than the version being rolled back ({})",
          target_version, bad_version
        ),
        "Pass --to <version> with a previously released version",
      ));
    }

    let bad_tag = config.tag_for(&bad_version);
    let mut steps = Vec::new();

    for scope in &scopes {
      match scope {
        RollbackScope::Npm => {
          steps.push(format!(
            "Deprecate {}@{} on the registry",
            config.package.name, bad_version
          ));
          steps.push(format!(
            "Point dist-tag '{}' at {}",
            config.release.dist_tag, target_version
          ));
        }
        RollbackScope::Git => {
          steps.push(format!("Delete local tag {}", bad_tag));
          steps.push(format!("Delete tag {} on origin", bad_tag));
        }
        RollbackScope::Github => {
          steps.push(format!("Mark GitHub release {} as prerelease", bad_tag));
        }
        RollbackScope::Docs => {
          steps.push(format!("Mark changelog section {} as [YANKED]", bad_version));
          steps.push(format!("Rewrite version files {} → {}", bad_version, target_version));
        }
      }
    }

    steps.push(format!("Restore package.json version to {}", target_version));

    let id = PlanId::from_contents(serde_json::to_vec(&(&config.package.name, &bad_version, &target_version, &scopes))?.as_slice());

    Ok(Self {
      id,
      package: config.package.name.clone(),
      bad_version,
      target_version,
      bad_tag,
      scopes,
      steps,
    })
  }

  /// Resolve the rollback target version
  ///
  /// Precedence: explicit --to, then the newest older release tag, then the
  /// newest older published version on the registry.
  pub fn resolve_target(
    config: &RelkitConfig,
    git: &SystemGit,
    npm: &NpmClient,
    bad_version: &Version,
    explicit: Option<Version>,
  ) -> RelResult<Version> {
    if let Some(target) = explicit {
      return Ok(target);
    }

    // Release tags, newest first
    let prefix = &config.release.tag_prefix;
    for tag in git.list_tags()? {
      if let Some(raw) = tag.strip_prefix(prefix.as_str())
        && let Ok(version) = Version::parse(raw)
        && version < *bad_version
      {
        return Ok(version);
      }
    }

    // Registry history fallback
    let older = npm
      .published_versions(&config.package.name)?
      .into_iter()
      .filter(|v| v < bad_version)
      .next_back();

    older.ok_or_else(|| {
      RelError::with_help(
        format!("No release older than {} found in tags or registry history", bad_version),
        "Pass --to <version> explicitly",
      )
    })
  }

  /// Serialize to JSON
  pub fn to_json(&self) -> RelResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!("📋 Rollback plan {} for {}\n", self.id, self.package));
    output.push_str(&format!("   {} → {}\n", self.bad_version, self.target_version));
    output.push_str(&format!(
      "   Scopes: {}\n",
      self
        .scopes
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
    ));

    output.push_str(&format!("\n   Steps ({}):\n", self.steps.len()));
    for (i, step) in self.steps.iter().enumerate() {
      output.push_str(&format!("   {}. {}\n", i + 1, step));
    }

    output.push_str("\n⚠️  NOTE: This operation mutates remote state (registry, tags, releases)\n");
    output.push_str("   A backup snapshot is written before any step runs\n");

    output
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plan(scopes: Vec<RollbackScope>) -> RollbackPlan {
    let config = RelkitConfig::new("demo-pkg");
    RollbackPlan::build(&config, Version::new(1, 1, 0), Version::new(1, 0, 0), scopes).unwrap()
  }

  #[test]
  fn test_build_full_plan() {
    let p = plan(vec![
      RollbackScope::Npm,
      RollbackScope::Git,
      RollbackScope::Github,
      RollbackScope::Docs,
    ]);

    assert_eq!(p.bad_tag, "v1.1.0");
    // 2 npm + 2 git + 1 github + 2 docs + 1 local restore
    assert_eq!(p.steps.len(), 8);
    assert!(p.steps.last().unwrap().contains("Restore package.json version to 1.0.0"));
  }

  #[test]
  fn test_build_rejects_newer_target() {
    let config = RelkitConfig::new("demo-pkg");
    let result = RollbackPlan::build(
      &config,
      Version::new(1, 0, 0),
      Version::new(1, 1, 0),
      vec![RollbackScope::Npm],
    );
    assert!(result.is_err());
  }

  #[test]
  fn test_build_rejects_same_version() {
    let config = RelkitConfig::new("demo-pkg");
    let result = RollbackPlan::build(
      &config,
      Version::new(1, 0, 0),
      Version::new(1, 0, 0),
      vec![RollbackScope::Npm],
    );
    assert!(result.is_err());
  }

  #[test]
  fn test_plan_id_stability() {
    let a = plan(vec![RollbackScope::Npm]);
    let b = plan(vec![RollbackScope::Npm]);
    let c = plan(vec![RollbackScope::Git]);

    assert_eq!(a.id, b.id);
    assert_ne!(a.id, c.id);
    assert_eq!(a.id.short().len(), 12);
  }

  #[test]
  fn test_human_readable() {
    let p = plan(vec![RollbackScope::Npm]);
    let text = p.to_human_readable();

    assert!(text.contains("demo-pkg"));
    assert!(text.contains("1.1.0 → 1.0.0"));
    assert!(text.contains("Deprecate demo-pkg@1.1.0"));
  }

  #[test]
  fn test_json_roundtrip() {
    let p = plan(vec![RollbackScope::Npm, RollbackScope::Docs]);
    let json = p.to_json().unwrap();
    let parsed: RollbackPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.id, p.id);
    assert_eq!(parsed.scopes.len(), 2);
  }
}
