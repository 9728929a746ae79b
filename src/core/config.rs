use crate::core::error::{ConfigError, RelError, RelResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration for relkit
/// Searched in order: relkit.toml, .relkit.toml, .config/relkit.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelkitConfig {
  pub package: PackageConfig,
  #[serde(default)]
  pub release: ReleaseConfig,
  #[serde(default)]
  pub signing: SigningConfig,
  #[serde(default)]
  pub monitor: MonitorConfig,
  #[serde(default)]
  pub rollback: RollbackConfig,
  #[serde(default)]
  pub state: ReleaseState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
  /// npm package name (must match package.json)
  pub name: String,

  /// Directory containing package.json (relative to the config file)
  #[serde(default = "default_package_dir")]
  pub dir: PathBuf,

  /// Registry to publish to and verify against
  #[serde(default = "default_registry")]
  pub registry: String,
}

fn default_package_dir() -> PathBuf {
  PathBuf::from(".")
}

fn default_registry() -> String {
  "https://registry.npmjs.org".to_string()
}

/// Release workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Tag prefix, producing tags like "v1.2.3"
  #[serde(default = "default_tag_prefix")]
  pub tag_prefix: String,

  /// Branch releases must be cut from
  #[serde(default = "default_branch")]
  pub branch: String,

  /// npm dist-tag that should track releases
  #[serde(default = "default_dist_tag")]
  pub dist_tag: String,

  /// Changelog path (Keep a Changelog format)
  #[serde(default = "default_changelog")]
  pub changelog: PathBuf,

  /// Extra files carrying a copy of the version string (e.g. src/version.ts)
  #[serde(default)]
  pub version_files: Vec<PathBuf>,

  /// Create GPG-signed tags (git tag -s)
  #[serde(default = "default_true")]
  pub sign_tags: bool,
}

fn default_tag_prefix() -> String {
  "v".to_string()
}

fn default_branch() -> String {
  "main".to_string()
}

fn default_dist_tag() -> String {
  "latest".to_string()
}

fn default_changelog() -> PathBuf {
  PathBuf::from("CHANGELOG.md")
}

fn default_true() -> bool {
  true
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      tag_prefix: default_tag_prefix(),
      branch: default_branch(),
      dist_tag: default_dist_tag(),
      changelog: default_changelog(),
      version_files: Vec::new(),
      sign_tags: true,
    }
  }
}

/// GPG signing configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SigningConfig {
  /// Key id to sign with (default: git config user.signingkey)
  #[serde(default)]
  pub key_id: Option<String>,

  /// Refuse to tag when no signing key is resolvable
  #[serde(default)]
  pub require_signed_tags: bool,
}

/// Post-release monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
  /// Seconds between polls
  #[serde(default = "default_interval_secs")]
  pub interval_secs: u64,

  /// Total monitoring window in seconds
  #[serde(default = "default_duration_secs")]
  pub duration_secs: u64,

  /// Threshold: new open issues mentioning the release before alerting
  #[serde(default = "default_max_new_issues")]
  pub max_new_issues: u64,

  /// Webhook URL for alerts (Slack/Discord-compatible JSON payload)
  #[serde(default)]
  pub webhook: Option<String>,

  /// GitHub repository in OWNER/REPO form for issue polling
  #[serde(default)]
  pub github_repo: Option<String>,
}

fn default_interval_secs() -> u64 {
  30
}

fn default_duration_secs() -> u64 {
  600
}

fn default_max_new_issues() -> u64 {
  5
}

impl Default for MonitorConfig {
  fn default() -> Self {
    Self {
      interval_secs: default_interval_secs(),
      duration_secs: default_duration_secs(),
      max_new_issues: default_max_new_issues(),
      webhook: None,
      github_repo: None,
    }
  }
}

/// Rollback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackConfig {
  /// Where backup snapshots are written
  #[serde(default = "default_backup_dir")]
  pub backup_dir: PathBuf,

  /// Scopes executed when --scope is not passed
  #[serde(default = "default_scopes")]
  pub scopes: Vec<RollbackScope>,
}

fn default_backup_dir() -> PathBuf {
  PathBuf::from(".relkit/backups")
}

fn default_scopes() -> Vec<RollbackScope> {
  vec![
    RollbackScope::Npm,
    RollbackScope::Git,
    RollbackScope::Github,
    RollbackScope::Docs,
  ]
}

impl Default for RollbackConfig {
  fn default() -> Self {
    Self {
      backup_dir: default_backup_dir(),
      scopes: default_scopes(),
    }
  }
}

/// Independent rollback scopes: the npm registry, local/remote git tags,
/// the GitHub release, and version strings in docs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackScope {
  Npm,
  Git,
  Github,
  Docs,
}

impl fmt::Display for RollbackScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RollbackScope::Npm => write!(f, "npm"),
      RollbackScope::Git => write!(f, "git"),
      RollbackScope::Github => write!(f, "github"),
      RollbackScope::Docs => write!(f, "docs"),
    }
  }
}

impl FromStr for RollbackScope {
  type Err = RelError;

  fn from_str(s: &str) -> RelResult<Self> {
    match s.trim().to_lowercase().as_str() {
      "npm" => Ok(RollbackScope::Npm),
      "git" => Ok(RollbackScope::Git),
      "github" => Ok(RollbackScope::Github),
      "docs" => Ok(RollbackScope::Docs),
      other => Err(RelError::with_help(
        format!("Unknown rollback scope '{}'", other),
        "Valid scopes: npm, git, github, docs (comma-separated)",
      )),
    }
  }
}

/// Release anchor metadata, updated by `relkit version apply`
///
/// # Invariants
///
/// 1. Every completed release records version + sha + date together
/// 2. The anchor is the starting point for the next commit analysis
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReleaseState {
  /// Last released version
  #[serde(default)]
  pub last_version: Option<String>,

  /// Git SHA of the last release (anchor point for the next one)
  #[serde(default)]
  pub last_sha: Option<String>,

  /// Date of the last release (ISO 8601)
  #[serde(default)]
  pub last_date: Option<String>,
}

impl ReleaseState {
  /// Check if this package has never been released through relkit
  pub fn is_first_release(&self) -> bool {
    self.last_version.is_none() || self.last_sha.is_none()
  }

  /// Get the last version or default to "0.0.0"
  pub fn current_version(&self) -> semver::Version {
    self
      .last_version
      .as_ref()
      .and_then(|v| semver::Version::parse(v).ok())
      .unwrap_or_else(|| semver::Version::new(0, 0, 0))
  }
}

impl RelkitConfig {
  /// Find config file in search order: relkit.toml, .relkit.toml, .config/relkit.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("relkit.toml"),
      path.join(".relkit.toml"),
      path.join(".config").join("relkit.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from relkit.toml (searches multiple locations)
  pub fn load(path: &Path) -> RelResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      RelError::Config(ConfigError::NotFound {
        package_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: RelkitConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Save config to relkit.toml (default location)
  pub fn save(&self, path: &Path) -> RelResult<()> {
    let config_path = path.join("relkit.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Create a new config with defaults for the given package
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      package: PackageConfig {
        name: name.into(),
        dir: default_package_dir(),
        registry: default_registry(),
      },
      release: ReleaseConfig::default(),
      signing: SigningConfig::default(),
      monitor: MonitorConfig::default(),
      rollback: RollbackConfig::default(),
      state: ReleaseState::default(),
    }
  }

  /// Validate configuration invariants
  pub fn validate(&self) -> RelResult<()> {
    if self.package.name.is_empty() {
      return Err(RelError::Config(ConfigError::MissingField {
        field: "package.name".to_string(),
      }));
    }

    if !self.package.registry.starts_with("http://") && !self.package.registry.starts_with("https://") {
      return Err(RelError::message(format!(
        "Invalid registry URL '{}'. Must start with http:// or https://",
        self.package.registry
      )));
    }

    if let Some(ref v) = self.state.last_version
      && semver::Version::parse(v).is_err()
    {
      return Err(RelError::message(format!(
        "Invalid state.last_version '{}'. Must be strict semver (e.g. '1.2.3')",
        v
      )));
    }

    if self.monitor.interval_secs == 0 {
      return Err(RelError::message("monitor.interval_secs must be greater than zero"));
    }

    if let Some(ref repo) = self.monitor.github_repo
      && repo.split('/').filter(|s| !s.is_empty()).count() != 2
    {
      return Err(RelError::message(format!(
        "Invalid monitor.github_repo '{}'. Expected OWNER/REPO",
        repo
      )));
    }

    Ok(())
  }

  /// Full tag name for a version, e.g. "v1.2.3"
  pub fn tag_for(&self, version: &semver::Version) -> String {
    format!("{}{}", self.release.tag_prefix, version)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn minimal() -> RelkitConfig {
    RelkitConfig::new("test-pkg")
  }

  #[test]
  fn test_defaults() {
    let config = minimal();
    assert_eq!(config.release.tag_prefix, "v");
    assert_eq!(config.release.dist_tag, "latest");
    assert_eq!(config.release.branch, "main");
    assert!(config.release.sign_tags);
    assert_eq!(config.rollback.scopes.len(), 4);
    assert!(config.state.is_first_release());
  }

  #[test]
  fn test_validate_empty_name() {
    let mut config = minimal();
    config.package.name = String::new();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_validate_bad_registry() {
    let mut config = minimal();
    config.package.registry = "registry.npmjs.org".to_string();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_validate_bad_state_version() {
    let mut config = minimal();
    config.state.last_version = Some("v1.0.0".to_string());
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_validate_bad_github_repo() {
    let mut config = minimal();
    config.monitor.github_repo = Some("just-a-name".to_string());
    assert!(config.validate().is_err());

    config.monitor.github_repo = Some("owner/repo".to_string());
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_tag_for() {
    let config = minimal();
    assert_eq!(config.tag_for(&semver::Version::new(1, 2, 3)), "v1.2.3");
  }

  #[test]
  fn test_scope_from_str() {
    assert_eq!("npm".parse::<RollbackScope>().unwrap(), RollbackScope::Npm);
    assert_eq!(" GitHub ".parse::<RollbackScope>().unwrap(), RollbackScope::Github);
    assert!("registry".parse::<RollbackScope>().is_err());
  }

  #[test]
  fn test_roundtrip_toml() {
    let config = minimal();
    let toml = toml_edit::ser::to_string_pretty(&config).unwrap();
    let parsed: RelkitConfig = toml_edit::de::from_str(&toml).unwrap();
    assert_eq!(parsed.package.name, "test-pkg");
    assert_eq!(parsed.release.changelog, PathBuf::from("CHANGELOG.md"));
  }

  #[test]
  fn test_release_state_current_version() {
    let state = ReleaseState {
      last_version: Some("0.3.1".to_string()),
      last_sha: Some("abc123".to_string()),
      last_date: Some("2025-01-15T10:00:00Z".to_string()),
    };
    assert!(!state.is_first_release());
    assert_eq!(state.current_version().to_string(), "0.3.1");
  }
}
