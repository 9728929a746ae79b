//! Small shared helpers: strict semver parsing, prompts, durations

use crate::core::error::{RelError, RelResult, ValidationError};
use semver::Version;
use std::io::{self, Write};
use std::time::Duration;

/// Parse a version string as strict semver
///
/// Rejects anything `semver` rejects ("1.0", "1.0.0.0", empty) and adds an
/// explicit hint for the common "v1.0.0" mistake. Prerelease and build
/// metadata are accepted ("1.0.0-rc.1", "1.0.0+build.5").
pub fn parse_version(raw: &str) -> RelResult<Version> {
  let trimmed = raw.trim();

  if trimmed.starts_with('v') || trimmed.starts_with('V') {
    return Err(RelError::Validation(ValidationError::Semver {
      message: format!("'{}' has a leading 'v'; versions are bare semver (the tag prefix is added separately)", trimmed),
    }));
  }

  Version::parse(trimmed).map_err(|e| {
    RelError::Validation(ValidationError::Semver {
      message: format!("'{}' is not valid semver: {}", trimmed, e),
    })
  })
}

/// Ask the user for y/N confirmation on stdin
///
/// Returns false on EOF or any answer other than y/yes.
pub fn confirm(prompt: &str) -> RelResult<bool> {
  print!("{} [y/N] ", prompt);
  io::stdout().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;

  let input = input.trim().to_lowercase();
  Ok(input == "y" || input == "yes")
}

/// Format a duration for human-readable report output
pub fn format_duration(d: Duration) -> String {
  let secs = d.as_secs();
  if secs >= 60 {
    format!("{}m{}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{}s", secs, d.subsec_millis() / 100)
  } else {
    format!("{}ms", d.as_millis())
  }
}

/// Sanitize a string for use in a filename (timestamps, versions)
pub fn filename_safe(s: &str) -> String {
  s.chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '-' })
    .collect()
}
