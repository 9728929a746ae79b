//! Unified package context - build once, pass everywhere
//!
//! ReleaseContext eliminates redundant manifest/config loads by building
//! all package-level data once in main.rs, then passing by reference to
//! all commands.

use crate::core::config::RelkitConfig;
use crate::core::error::{RelError, RelResult};
use crate::npm::PackageManifest;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Unified package context containing all shared package-level data.
///
/// Built once at startup, passed by reference to all commands.
#[derive(Clone)]
pub struct ReleaseContext {
  /// Directory relkit was invoked from (where relkit.toml lives)
  pub root: PathBuf,

  /// relkit configuration (relkit.toml)
  /// Optional because init/doctor can run before it exists
  pub config: Option<Arc<RelkitConfig>>,

  /// Parsed package.json
  pub manifest: PackageManifest,
}

impl ReleaseContext {
  /// Build context from a root directory.
  ///
  /// Loads relkit.toml if present, then the package manifest from the
  /// configured package dir (or the root itself without config).
  pub fn build(root: &Path) -> RelResult<Self> {
    let config = RelkitConfig::load(root).ok().map(Arc::new);

    let package_dir = match &config {
      Some(cfg) => root.join(&cfg.package.dir),
      None => root.to_path_buf(),
    };
    let manifest = PackageManifest::load(&package_dir)?;

    Ok(Self {
      root: root.to_path_buf(),
      config,
      manifest,
    })
  }

  /// Get config or error if not found.
  pub fn require_config(&self) -> RelResult<&Arc<RelkitConfig>> {
    self
      .config
      .as_ref()
      .ok_or_else(|| RelError::message("No relkit.toml found. Run 'relkit init' to create one."))
  }

  /// Directory containing package.json
  pub fn package_dir(&self) -> PathBuf {
    match &self.config {
      Some(cfg) => self.root.join(&cfg.package.dir),
      None => self.root.clone(),
    }
  }

  /// Absolute changelog path (only meaningful with config)
  pub fn changelog_path(&self) -> RelResult<PathBuf> {
    let config = self.require_config()?;
    Ok(self.package_dir().join(&config.release.changelog))
  }

  /// Reload the manifest from disk (after a version bump)
  pub fn reload_manifest(&mut self) -> RelResult<()> {
    self.manifest = PackageManifest::load(&self.package_dir())?;
    Ok(())
  }
}
