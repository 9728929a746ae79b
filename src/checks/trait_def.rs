//! Check trait abstraction for health checks and release gates
//!
//! This module provides a unified interface for running health checks and
//! validations. All checks implement the `Check` trait, making it easy to add
//! new checks without modifying core logic.
//!
//! Built-in checks include:
//! - Required tools (git, npm, gpg, gh on PATH)
//! - Git state (repository present, clean tree, release branch)
//! - GPG signing setup (secret key, git signing config)
//! - npm registry auth (whoami)
//! - Changelog structure
//! - Version-file sync (package.json vs configured version files)

use crate::core::config::RelkitConfig;
use crate::core::error::RelResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Severity level for check results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
  /// Informational message (not an issue)
  Info,
  /// Warning (non-blocking, but should be addressed)
  Warning,
  /// Error (blocking, must be fixed)
  Error,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Info => write!(f, "INFO"),
      Severity::Warning => write!(f, "WARN"),
      Severity::Error => write!(f, "ERROR"),
    }
  }
}

/// Result of running a check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
  /// Name of the check that ran
  pub check_name: String,
  /// Whether the check passed
  pub passed: bool,
  /// Severity level (if failed)
  pub severity: Severity,
  /// Human-readable message
  pub message: String,
  /// Optional suggested fix
  pub suggestion: Option<String>,
  /// Additional metadata (for JSON output)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

impl CheckResult {
  /// Create a passing check result
  pub fn pass(check_name: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      check_name: check_name.into(),
      passed: true,
      severity: Severity::Info,
      message: message.into(),
      suggestion: None,
      details: None,
    }
  }

  /// Create a failing check result with error severity
  pub fn error(
    check_name: impl Into<String>,
    message: impl Into<String>,
    suggestion: Option<impl Into<String>>,
  ) -> Self {
    Self {
      check_name: check_name.into(),
      passed: false,
      severity: Severity::Error,
      message: message.into(),
      suggestion: suggestion.map(|s| s.into()),
      details: None,
    }
  }

  /// Create a failing check result with warning severity
  pub fn warning(
    check_name: impl Into<String>,
    message: impl Into<String>,
    suggestion: Option<impl Into<String>>,
  ) -> Self {
    Self {
      check_name: check_name.into(),
      passed: false,
      severity: Severity::Warning,
      message: message.into(),
      suggestion: suggestion.map(|s| s.into()),
      details: None,
    }
  }

  /// Add details to the check result
  pub fn with_details(mut self, details: serde_json::Value) -> Self {
    self.details = Some(details);
    self
  }
}

/// Context passed to checks
#[derive(Clone)]
pub struct CheckContext {
  /// Package root directory (where relkit.toml lives)
  pub package_root: std::path::PathBuf,
  /// Loaded configuration, when available
  pub config: Option<Arc<RelkitConfig>>,
  /// Whether to run expensive checks (e.g. registry auth)
  pub thorough: bool,
}

/// Health check trait
///
/// Each check implements this trait to provide validation logic.
/// Checks can be run individually or in batch via the CheckRunner.
pub trait Check: Send + Sync {
  /// Unique name for this check (kebab-case)
  fn name(&self) -> &str;

  /// Human-readable description of what this check validates
  fn description(&self) -> &str;

  /// Run the check and return a result
  fn run(&self, ctx: &CheckContext) -> RelResult<CheckResult>;

  /// Whether this check is expensive (requires network, etc.)
  /// Default: false
  fn is_expensive(&self) -> bool {
    false
  }

  /// Whether this check needs relkit.toml to run
  /// Default: false
  fn requires_config(&self) -> bool {
    false
  }
}
