//! Error types for relkit with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. Every error includes a helpful suggestion
//! to guide users toward resolution.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for relkit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (wrapped tool, network, I/O)
  System = 2,
  /// Validation failure (checks failed, gates not met)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for relkit
#[derive(Debug)]
pub enum RelError {
  /// Configuration errors
  Config(ConfigError),

  /// Wrapped tool errors (git, npm, gpg, gh, curl)
  Tool(ToolError),

  /// Validation errors (semver, changelog, release gates)
  Validation(ValidationError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RelError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RelError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RelError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RelError::Message { message, context, help } => RelError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RelError::Config(_) => ExitCode::User,
      RelError::Tool(_) => ExitCode::System,
      RelError::Validation(_) => ExitCode::Validation,
      RelError::Io(_) => ExitCode::System,
      RelError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RelError::Config(e) => e.help_message(),
      RelError::Tool(e) => e.help_message(),
      RelError::Validation(e) => e.help_message(),
      RelError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for RelError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RelError::Config(e) => write!(f, "{}", e),
      RelError::Tool(e) => write!(f, "{}", e),
      RelError::Validation(e) => write!(f, "{}", e),
      RelError::Io(e) => write!(f, "I/O error: {}", e),
      RelError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RelError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RelError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RelError {
  fn from(err: io::Error) -> Self {
    RelError::Io(err)
  }
}

impl From<String> for RelError {
  fn from(msg: String) -> Self {
    RelError::message(msg)
  }
}

impl From<&str> for RelError {
  fn from(msg: &str) -> Self {
    RelError::message(msg)
  }
}

impl From<toml_edit::TomlError> for RelError {
  fn from(err: toml_edit::TomlError) -> Self {
    RelError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for RelError {
  fn from(err: toml_edit::de::Error) -> Self {
    RelError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for RelError {
  fn from(err: toml_edit::ser::Error) -> Self {
    RelError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for RelError {
  fn from(err: serde_json::Error) -> Self {
    RelError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for RelError {
  fn from(err: semver::Error) -> Self {
    RelError::Validation(ValidationError::Semver {
      message: err.to_string(),
    })
  }
}

impl From<std::str::Utf8Error> for RelError {
  fn from(err: std::str::Utf8Error) -> Self {
    RelError::message(format!("UTF-8 error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for RelError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    RelError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<std::num::ParseIntError> for RelError {
  fn from(err: std::num::ParseIntError) -> Self {
    RelError::message(format!("Parse error: {}", err))
  }
}

impl From<std::env::VarError> for RelError {
  fn from(err: std::env::VarError) -> Self {
    RelError::message(format!("Environment variable error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// relkit.toml not found
  NotFound { package_root: PathBuf },

  /// package.json not found
  ManifestNotFound { package_root: PathBuf },

  /// Missing required field
  MissingField { field: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `relkit init` to create a configuration file.".to_string()),
      ConfigError::ManifestNotFound { .. } => {
        Some("relkit must run from an npm package root (a directory containing package.json).".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { package_root } => {
        write!(
          f,
          "No relkit configuration found.\nExpected file: {}/relkit.toml",
          package_root.display()
        )
      }
      ConfigError::ManifestNotFound { package_root } => {
        write!(f, "No package.json found at: {}", package_root.display())
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
    }
  }
}

/// Wrapped tool errors
#[derive(Debug)]
pub enum ToolError {
  /// Tool binary not found on PATH
  NotFound { tool: String },

  /// Tool command exited nonzero
  CommandFailed { command: String, stderr: String },

  /// Git repository not found
  RepoNotFound { path: PathBuf },

  /// Tag operation failed
  TagError { tag: String, reason: String },
}

impl ToolError {
  fn help_message(&self) -> Option<String> {
    match self {
      ToolError::NotFound { tool } => Some(format!(
        "Install `{}` and make sure it is on your PATH. Run `relkit doctor` to see all required tools.",
        tool
      )),
      ToolError::CommandFailed { stderr, .. } => {
        if stderr.contains("ENEEDAUTH") || stderr.contains("401") {
          Some("Authenticate with the registry first: npm login".to_string())
        } else if stderr.contains("EOTP") {
          Some("Your account requires a one-time password: re-run with --otp <code>".to_string())
        } else if stderr.contains("gpg failed to sign") {
          Some("Check your signing setup: git config user.signingkey, then `relkit doctor --thorough`".to_string())
        } else {
          None
        }
      }
      ToolError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolError::NotFound { tool } => {
        write!(f, "Required tool not found: {}", tool)
      }
      ToolError::CommandFailed { command, stderr } => {
        write!(f, "Command failed: {}\n{}", command, stderr)
      }
      ToolError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      ToolError::TagError { tag, reason } => {
        write!(f, "Tag operation failed for '{}': {}", tag, reason)
      }
    }
  }
}

/// Validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Version string is not strict semver
  Semver { message: String },

  /// Changelog structure violation
  Changelog { reason: String },

  /// A release gate failed (dirty tree, wrong branch, duplicate version)
  Gate { reason: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::Semver { .. } => {
        Some("Versions must be strict semver like 1.2.3 or 1.2.3-rc.1 (no leading 'v').".to_string())
      }
      ValidationError::Changelog { .. } => {
        Some("See https://keepachangelog.com for the expected structure, or run `relkit changelog validate`.".to_string())
      }
      ValidationError::Gate { .. } => Some("Run `relkit doctor --thorough` to diagnose release readiness.".to_string()),
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::Semver { message } => {
        write!(f, "Invalid version: {}", message)
      }
      ValidationError::Changelog { reason } => {
        write!(f, "Changelog validation failed: {}", reason)
      }
      ValidationError::Gate { reason } => {
        write!(f, "Release gate failed: {}", reason)
      }
    }
  }
}

/// Result type alias for relkit
pub type RelResult<T> = Result<T, RelError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RelResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RelResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RelError>,
{
  fn context(self, ctx: impl Into<String>) -> RelResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RelResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with colors and help text
pub fn print_error(error: &RelError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

/// Convert anyhow::Error to RelError (for transition period)
impl From<anyhow::Error> for RelError {
  fn from(err: anyhow::Error) -> Self {
    RelError::message(err.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exit_codes() {
    assert_eq!(RelError::message("oops").exit_code(), ExitCode::User);
    assert_eq!(
      RelError::Tool(ToolError::NotFound { tool: "npm".into() }).exit_code(),
      ExitCode::System
    );
    assert_eq!(
      RelError::Validation(ValidationError::Gate {
        reason: "dirty tree".into()
      })
      .exit_code(),
      ExitCode::Validation
    );
  }

  #[test]
  fn test_context_chaining() {
    let err = RelError::message("base").context("while publishing");
    let rendered = err.to_string();
    assert!(rendered.contains("base"));
    assert!(rendered.contains("while publishing"));
  }

  #[test]
  fn test_semver_error_maps_to_validation() {
    let err: RelError = "v1.0.0".parse::<semver::Version>().unwrap_err().into();
    assert_eq!(err.exit_code(), ExitCode::Validation);
  }

  #[test]
  fn test_otp_help_message() {
    let err = RelError::Tool(ToolError::CommandFailed {
      command: "npm publish".into(),
      stderr: "npm ERR! code EOTP".into(),
    });
    assert!(err.help_message().unwrap().contains("--otp"));
  }
}
