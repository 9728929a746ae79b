//! npm CLI wrapper - zero dependencies, parses `--json` output
//!
//! All registry interaction goes through the system `npm` binary with an
//! isolated environment, the same way git operations go through system git.
//! Mutating operations (publish, deprecate, dist-tag) are kept separate from
//! read-only queries so dry-run paths never touch them.

use crate::core::error::{RelError, RelResult, ResultExt, ToolError};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// npm client bound to a package directory and registry
pub struct NpmClient {
  /// Directory containing package.json
  pub(crate) package_dir: PathBuf,

  /// Registry URL passed to every command
  pub(crate) registry: String,
}

/// Summary of `npm pack --dry-run --json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackSummary {
  pub filename: String,
  pub file_count: usize,
  pub unpacked_size: u64,
}

/// Vulnerability counts from `npm audit --json`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AuditSummary {
  pub critical: u64,
  pub high: u64,
  pub moderate: u64,
  pub low: u64,
}

impl AuditSummary {
  /// Whether the audit found anything that should block a release
  pub fn has_blocking(&self) -> bool {
    self.critical > 0 || self.high > 0
  }

  pub fn total(&self) -> u64 {
    self.critical + self.high + self.moderate + self.low
  }
}

impl NpmClient {
  /// Create a client for a package directory
  pub fn new(package_dir: &Path, registry: impl Into<String>) -> Self {
    Self {
      package_dir: package_dir.to_path_buf(),
      registry: registry.into(),
    }
  }

  /// Create a safe npm command with isolated environment
  ///
  /// - Sets working directory to the package dir
  /// - Clears environment variables
  /// - Whitelists PATH, HOME, and the npm auth token
  /// - Pins the registry explicitly (override user .npmrc)
  pub(crate) fn npm_cmd(&self) -> Command {
    let mut cmd = Command::new("npm");

    cmd.current_dir(&self.package_dir);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }
    if let Ok(token) = std::env::var("NPM_TOKEN") {
      cmd.env("NPM_TOKEN", token);
    }

    cmd.arg(format!("--registry={}", self.registry));

    cmd
  }

  /// Run an npm command and return stdout, mapping nonzero exits to ToolError
  fn run(&self, args: &[&str]) -> RelResult<String> {
    let output = self
      .npm_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute npm {}", args.first().unwrap_or(&"")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Tool(ToolError::CommandFailed {
        command: format!("npm {}", args.join(" ")),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }

  /// All published versions of a package, oldest first
  ///
  /// Returns an empty list for a package that has never been published (E404).
  pub fn published_versions(&self, name: &str) -> RelResult<Vec<Version>> {
    let output = self
      .npm_cmd()
      .args(["view", name, "versions", "--json"])
      .output()
      .context("Failed to execute npm view")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("E404") || stderr.contains("404 Not Found") {
        return Ok(vec![]);
      }
      return Err(RelError::Tool(ToolError::CommandFailed {
        command: format!("npm view {} versions", name),
        stderr: stderr.to_string(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_versions_json(&stdout)
  }

  /// Whether a specific version exists on the registry
  pub fn version_exists(&self, name: &str, version: &Version) -> RelResult<bool> {
    Ok(self.published_versions(name)?.iter().any(|v| v == version))
  }

  /// Current dist-tag mapping, e.g. {"latest": "1.2.3", "next": "2.0.0-rc.1"}
  pub fn dist_tags(&self, name: &str) -> RelResult<Vec<(String, Version)>> {
    let stdout = self.run(&["view", name, "dist-tags", "--json"])?;
    let map: serde_json::Value = serde_json::from_str(stdout.trim())?;

    let mut tags = Vec::new();
    if let Some(obj) = map.as_object() {
      for (tag, value) in obj {
        if let Some(raw) = value.as_str()
          && let Ok(version) = Version::parse(raw)
        {
          tags.push((tag.clone(), version));
        }
      }
    }

    Ok(tags)
  }

  /// Version a dist-tag currently points at
  pub fn dist_tag_version(&self, name: &str, tag: &str) -> RelResult<Option<Version>> {
    Ok(
      self
        .dist_tags(name)?
        .into_iter()
        .find(|(t, _)| t == tag)
        .map(|(_, v)| v),
    )
  }

  /// Authenticated registry user, if any
  pub fn whoami(&self) -> RelResult<String> {
    let stdout = self.run(&["whoami"])?;
    Ok(stdout.trim().to_string())
  }

  /// Validate the package tarball without publishing
  pub fn pack_dry_run(&self) -> RelResult<PackSummary> {
    let stdout = self.run(&["pack", "--dry-run", "--json"])?;
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim())?;

    // npm emits an array with one entry per packed workspace
    let entry = parsed
      .as_array()
      .and_then(|a| a.first())
      .ok_or_else(|| RelError::message("Unexpected npm pack output: expected a JSON array"))?;

    Ok(PackSummary {
      filename: entry
        .get("filename")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string(),
      file_count: entry
        .get("entryCount")
        .and_then(|v| v.as_u64())
        .or_else(|| entry.get("files").and_then(|f| f.as_array().map(|a| a.len() as u64)))
        .unwrap_or(0) as usize,
      unpacked_size: entry.get("unpackedSize").and_then(|v| v.as_u64()).unwrap_or(0),
    })
  }

  /// Dependency audit (non-fatal on registry endpoints that lack audit support)
  pub fn audit(&self) -> RelResult<AuditSummary> {
    let output = self.npm_cmd().args(["audit", "--json"]).output().context("Failed to execute npm audit")?;

    // npm audit exits nonzero when vulnerabilities exist; the JSON is still on stdout
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = match serde_json::from_str(stdout.trim()) {
      Ok(v) => v,
      Err(_) => return Ok(AuditSummary::default()),
    };

    let vulns = &parsed["metadata"]["vulnerabilities"];
    Ok(AuditSummary {
      critical: vulns["critical"].as_u64().unwrap_or(0),
      high: vulns["high"].as_u64().unwrap_or(0),
      moderate: vulns["moderate"].as_u64().unwrap_or(0),
      low: vulns["low"].as_u64().unwrap_or(0),
    })
  }

  /// Publish the package
  pub fn publish(&self, dist_tag: &str, otp: Option<&str>) -> RelResult<()> {
    let mut args = vec!["publish".to_string(), format!("--tag={}", dist_tag)];
    if let Some(code) = otp {
      args.push(format!("--otp={}", code));
    }

    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    self.run(&arg_refs)?;
    Ok(())
  }

  /// Deprecate a published version with a guidance message
  pub fn deprecate(&self, name: &str, version: &Version, message: &str) -> RelResult<()> {
    let spec = format!("{}@{}", name, version);
    self.run(&["deprecate", &spec, message])?;
    Ok(())
  }

  /// Point a dist-tag at a version
  pub fn dist_tag_add(&self, name: &str, version: &Version, tag: &str) -> RelResult<()> {
    let spec = format!("{}@{}", name, version);
    self.run(&["dist-tag", "add", &spec, tag])?;
    Ok(())
  }

  /// Install a published version into a scratch directory (smoke test)
  pub fn install_into(&self, target_dir: &Path, name: &str, version: &Version) -> RelResult<()> {
    let spec = format!("{}@{}", name, version);

    let output = Command::new("npm")
      .current_dir(target_dir)
      .args([
        "install",
        &spec,
        "--no-save",
        "--no-audit",
        "--no-fund",
        &format!("--registry={}", self.registry),
      ])
      .output()
      .context("Failed to execute npm install")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Tool(ToolError::CommandFailed {
        command: format!("npm install {}", spec),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }
}

/// Parse `npm view <pkg> versions --json` output
///
/// npm prints a JSON array for multi-version packages but a bare string for
/// packages with exactly one published version.
fn parse_versions_json(raw: &str) -> RelResult<Vec<Version>> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Ok(vec![]);
  }

  let value: serde_json::Value = serde_json::from_str(trimmed)?;

  let mut versions = Vec::new();
  match value {
    serde_json::Value::String(s) => {
      if let Ok(v) = Version::parse(&s) {
        versions.push(v);
      }
    }
    serde_json::Value::Array(items) => {
      for item in items {
        if let Some(s) = item.as_str()
          && let Ok(v) = Version::parse(s)
        {
          versions.push(v);
        }
      }
    }
    _ => {
      return Err(RelError::message("Unexpected npm view output: expected string or array"));
    }
  }

  versions.sort();
  Ok(versions)
}
