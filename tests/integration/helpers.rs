//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A test npm package with git history and relkit configuration
///
/// The release anchor points at the `v<version>` tag created on the initial
/// commit, so a fresh package has zero pending commits and a clean tree.
pub struct TestPackage {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestPackage {
  /// Create a package whose last release is `version`, tagged at HEAD
  pub fn new(name: &str, version: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    // Initialize git repo with main as default branch
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "tag.gpgSign", "false"])?;

    std::fs::write(
      path.join("package.json"),
      format!(
        r#"{{
  "name": "{}",
  "version": "{}",
  "license": "MIT"
}}
"#,
        name, version
      ),
    )?;

    std::fs::write(
      path.join("CHANGELOG.md"),
      format!(
        "# Changelog\n\nAll notable changes to this project will be documented in this file.\n\n## [Unreleased]\n\n### Added\n\n- pending release notes\n\n## [{}] - 2025-01-15\n\n### Added\n\n- initial release\n",
        version
      ),
    )?;

    std::fs::write(
      path.join("version.ts"),
      format!("export const VERSION = \"{}\";\n", version),
    )?;

    let tag = format!("v{}", version);
    std::fs::write(
      path.join("relkit.toml"),
      format!(
        r#"[package]
name = "{}"

[release]
sign_tags = false
version_files = ["version.ts"]

[state]
last_version = "{}"
last_sha = "{}"
last_date = "2025-01-15T10:00:00Z"
"#,
        name, version, tag
      ),
    )?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "chore: initial package setup"])?;
    git(&path, &["tag", "-a", &tag, "-m", &format!("Release {} {}", name, tag)])?;

    Ok(Self { _root: root, path })
  }

  /// Commit current changes, returning the new HEAD sha
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    self.head_sha()
  }

  /// Current HEAD sha
  pub fn head_sha(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create an (unsigned) annotated tag
  pub fn tag(&self, tag: &str) -> Result<()> {
    git(&self.path, &["tag", "-a", tag, "-m", tag])?;
    Ok(())
  }

  /// List tags
  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Write a file inside the package
  pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(rel), content)?;
    Ok(())
  }

  /// Read a file inside the package
  pub fn read_file(&self, rel: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(rel))?)
  }

  /// Parsed package.json version field
  pub fn manifest_version(&self) -> Result<String> {
    let raw = self.read_file("package.json")?;
    let json: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(json["version"].as_str().unwrap_or_default().to_string())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the relkit binary, failing the test on nonzero exit
pub fn run_relkit(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_relkit_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "relkit command failed: relkit {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run the relkit binary, returning the raw output (for failure-path tests)
pub fn run_relkit_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let relkit_bin = env!("CARGO_BIN_EXE_relkit");

  Command::new(relkit_bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run relkit")
}
