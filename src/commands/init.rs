//! Init command: write a starter relkit.toml and changelog

use crate::core::config::RelkitConfig;
use crate::core::error::{RelError, RelResult};
use crate::npm::PackageManifest;
use crate::release::changelog;
use std::env;

/// Run the init command
pub fn run_init(force: bool) -> RelResult<()> {
  let root = env::current_dir()?;

  // relkit is configured next to an existing package.json
  let manifest = PackageManifest::load(&root)?;
  let name = manifest.name()?.to_string();

  if RelkitConfig::exists(&root) && !force {
    return Err(RelError::with_help(
      "relkit.toml already exists",
      "Use --force to overwrite the existing configuration",
    ));
  }

  let mut config = RelkitConfig::new(&name);

  // Seed the anchor from an already-published version field
  if let Ok(version) = manifest.version() {
    config.state.last_version = Some(version.to_string());
  }

  config.save(&root)?;
  println!("✅ Wrote relkit.toml for '{}'", name);

  let changelog_path = root.join(&config.release.changelog);
  if !changelog_path.exists() {
    std::fs::write(&changelog_path, changelog::starter(&name))?;
    println!("✅ Wrote starter {}", config.release.changelog.display());
  } else {
    println!("   {} already exists, left untouched", config.release.changelog.display());
  }

  println!();
  println!("Next steps:");
  println!("  1. Review relkit.toml (registry, branch, version_files)");
  println!("  2. relkit doctor --thorough");
  println!("  3. relkit version plan");

  Ok(())
}
