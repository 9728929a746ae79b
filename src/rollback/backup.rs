//! Backup snapshots taken before destructive rollback operations
//!
//! A snapshot is a timestamped directory holding copies of the files a
//! rollback may touch (package.json, the changelog, version files) plus a
//! manifest recording SHA-256 checksums, the git refs at snapshot time, and
//! the pre-recorded target version the rollback must restore.

use crate::core::error::{RelError, RelResult, ResultExt};
use chrono::Utc;
use semver::Version;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// One backed-up file with its integrity checksum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupFile {
  /// Path relative to the package dir
  pub path: PathBuf,
  /// SHA-256 of the file contents at snapshot time
  pub sha256: String,
}

/// Snapshot manifest (manifest.json inside the snapshot directory)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
  /// Snapshot id (first 12 hex chars of the manifest content hash)
  pub id: String,
  pub created_at: String,
  /// Version being rolled back
  pub bad_version: String,
  /// Version the rollback must restore (the "pre-recorded target")
  pub target_version: String,
  /// HEAD at snapshot time
  pub head_sha: String,
  /// Files included in the snapshot
  pub files: Vec<BackupFile>,
}

/// A backup snapshot on disk
#[derive(Debug, Clone)]
pub struct BackupSnapshot {
  pub dir: PathBuf,
  pub manifest: BackupManifest,
}

fn sha256_hex(bytes: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  format!("{:x}", hasher.finalize())
}

impl BackupSnapshot {
  /// Create a snapshot under `backup_dir`
  ///
  /// Copies every listed file that exists; missing files are skipped (a
  /// package without a changelog still gets a usable snapshot).
  pub fn create(
    package_dir: &Path,
    backup_dir: &Path,
    bad_version: &Version,
    target_version: &Version,
    head_sha: &str,
    files: &[PathBuf],
  ) -> RelResult<Self> {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let dir = backup_dir.join(format!("{}-{}", stamp, crate::utils::filename_safe(&bad_version.to_string())));
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create backup dir {}", dir.display()))?;

    let mut backed_up = Vec::new();
    for rel in files {
      let source = package_dir.join(rel);
      if !source.exists() {
        continue;
      }

      let content = fs::read(&source).with_context(|| format!("Failed to read {}", source.display()))?;
      let dest = dir.join(rel);
      if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
      }
      fs::write(&dest, &content).with_context(|| format!("Failed to write {}", dest.display()))?;

      backed_up.push(BackupFile {
        path: rel.clone(),
        sha256: sha256_hex(&content),
      });
    }

    let mut manifest = BackupManifest {
      id: String::new(),
      created_at: Utc::now().to_rfc3339(),
      bad_version: bad_version.to_string(),
      target_version: target_version.to_string(),
      head_sha: head_sha.to_string(),
      files: backed_up,
    };
    manifest.id = sha256_hex(serde_json::to_vec(&manifest)?.as_slice())[..12].to_string();

    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    fs::write(dir.join("manifest.json"), manifest_json)
      .with_context(|| format!("Failed to write manifest into {}", dir.display()))?;

    Ok(Self { dir, manifest })
  }

  /// Load an existing snapshot
  #[allow(dead_code)] // TODO: expose via a `relkit rollback --restore <backup>` escape hatch
  pub fn load(dir: &Path) -> RelResult<Self> {
    let manifest_path = dir.join("manifest.json");
    let content = fs::read_to_string(&manifest_path)
      .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let manifest: BackupManifest = serde_json::from_str(&content)?;

    Ok(Self {
      dir: dir.to_path_buf(),
      manifest,
    })
  }

  /// Verify every backed-up file still matches its recorded checksum
  pub fn verify(&self) -> RelResult<()> {
    for file in &self.manifest.files {
      let path = self.dir.join(&file.path);
      let content = fs::read(&path).with_context(|| format!("Backup file missing: {}", path.display()))?;

      if sha256_hex(&content) != file.sha256 {
        return Err(RelError::message(format!(
          "Backup integrity check failed for {} (checksum mismatch)",
          file.path.display()
        )));
      }
    }

    Ok(())
  }

  /// The pre-recorded target version this snapshot's rollback must restore
  pub fn target_version(&self) -> RelResult<Version> {
    crate::utils::parse_version(&self.manifest.target_version)
  }

  /// Copy a backed-up file back into the package dir
  #[allow(dead_code)] // TODO: expose via a `relkit rollback --restore <backup>` escape hatch
  pub fn restore_file(&self, package_dir: &Path, rel: &Path) -> RelResult<()> {
    let source = self.dir.join(rel);
    if !source.exists() {
      return Err(RelError::message(format!(
        "File {} is not part of this backup",
        rel.display()
      )));
    }

    let dest = package_dir.join(rel);
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::copy(&source, &dest).with_context(|| format!("Failed to restore {}", dest.display()))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn setup() -> (TempDir, PathBuf) {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("package.json"), "{\"name\":\"demo\",\"version\":\"1.1.0\"}\n").unwrap();
    fs::write(pkg.join("CHANGELOG.md"), "# Changelog\n\n## [Unreleased]\n").unwrap();
    (root, pkg)
  }

  #[test]
  fn test_create_and_verify() {
    let (root, pkg) = setup();
    let backup_dir = root.path().join("backups");

    let snapshot = BackupSnapshot::create(
      &pkg,
      &backup_dir,
      &Version::new(1, 1, 0),
      &Version::new(1, 0, 0),
      "abc123",
      &[PathBuf::from("package.json"), PathBuf::from("CHANGELOG.md")],
    )
    .unwrap();

    assert_eq!(snapshot.manifest.files.len(), 2);
    assert_eq!(snapshot.manifest.id.len(), 12);
    assert_eq!(snapshot.target_version().unwrap(), Version::new(1, 0, 0));
    snapshot.verify().unwrap();
  }

  #[test]
  fn test_missing_files_skipped() {
    let (root, pkg) = setup();
    let backup_dir = root.path().join("backups");

    let snapshot = BackupSnapshot::create(
      &pkg,
      &backup_dir,
      &Version::new(1, 1, 0),
      &Version::new(1, 0, 0),
      "abc123",
      &[PathBuf::from("package.json"), PathBuf::from("does-not-exist.md")],
    )
    .unwrap();

    assert_eq!(snapshot.manifest.files.len(), 1);
  }

  #[test]
  fn test_verify_detects_tampering() {
    let (root, pkg) = setup();
    let backup_dir = root.path().join("backups");

    let snapshot = BackupSnapshot::create(
      &pkg,
      &backup_dir,
      &Version::new(1, 1, 0),
      &Version::new(1, 0, 0),
      "abc123",
      &[PathBuf::from("package.json")],
    )
    .unwrap();

    fs::write(snapshot.dir.join("package.json"), "tampered").unwrap();
    assert!(snapshot.verify().is_err());
  }

  #[test]
  fn test_load_roundtrip_and_restore() {
    let (root, pkg) = setup();
    let backup_dir = root.path().join("backups");

    let created = BackupSnapshot::create(
      &pkg,
      &backup_dir,
      &Version::new(1, 1, 0),
      &Version::new(1, 0, 0),
      "abc123",
      &[PathBuf::from("package.json")],
    )
    .unwrap();

    let loaded = BackupSnapshot::load(&created.dir).unwrap();
    assert_eq!(loaded.manifest.bad_version, "1.1.0");

    // Clobber the original, then restore from backup
    fs::write(pkg.join("package.json"), "{}").unwrap();
    loaded.restore_file(&pkg, Path::new("package.json")).unwrap();
    let restored = fs::read_to_string(pkg.join("package.json")).unwrap();
    assert!(restored.contains("1.1.0"));
  }
}
