//! Release anchor tracking and persistence
//!
//! Maintains the invariant: every completed release records
//! version + sha + date together in relkit.toml `[state]`.

use crate::core::config::RelkitConfig;
use crate::core::error::RelResult;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Release state tracker
///
/// Loads relkit.toml, exposes the release anchor, and persists updates
/// after a successful `version apply`.
pub struct ReleaseTracker {
  config: RelkitConfig,
  root: PathBuf,
}

impl ReleaseTracker {
  /// Load the tracker from the directory containing relkit.toml
  pub fn load(root: &Path) -> RelResult<Self> {
    let config = RelkitConfig::load(root)?;
    Ok(Self {
      config,
      root: root.to_path_buf(),
    })
  }

  pub fn config(&self) -> &RelkitConfig {
    &self.config
  }

  /// Record a completed release: version + sha + timestamp move together
  pub fn record_release(&mut self, version: &semver::Version, sha: &str) {
    self.config.state.last_version = Some(version.to_string());
    self.config.state.last_sha = Some(sha.to_string());
    self.config.state.last_date = Some(Utc::now().to_rfc3339());
  }

  /// Save updated configuration back to relkit.toml
  pub fn save(&self) -> RelResult<()> {
    self.config.save(&self.root)
  }
}
