//! GPG signing setup check
//!
//! Mirrors the preconditions the tagging flow needs: a resolvable signing
//! key and a secret key gpg can actually use.

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::RelResult;
use crate::core::vcs::SystemGit;
use std::process::Command;

/// Verifies a signing key is configured and present in the gpg keyring
pub struct GpgSigningCheck;

/// Resolve the signing key: relkit.toml [signing].key_id wins, then
/// git config user.signingkey
fn resolve_key(ctx: &CheckContext) -> RelResult<Option<String>> {
  if let Some(config) = &ctx.config
    && let Some(key) = &config.signing.key_id
  {
    return Ok(Some(key.clone()));
  }

  match SystemGit::open(&ctx.package_root) {
    Ok(git) => git.config_get("user.signingkey"),
    Err(_) => Ok(None),
  }
}

/// Whether gpg has a secret key matching the id (or any secret key for None)
fn secret_key_exists(key_id: Option<&str>) -> bool {
  let mut cmd = Command::new("gpg");
  cmd.args(["--list-secret-keys", "--with-colons"]);
  if let Some(key) = key_id {
    cmd.arg(key);
  }

  match cmd.output() {
    Ok(output) if output.status.success() => {
      let stdout = String::from_utf8_lossy(&output.stdout);
      stdout.lines().any(|l| l.starts_with("sec"))
    }
    _ => false,
  }
}

impl Check for GpgSigningCheck {
  fn name(&self) -> &str {
    "gpg-signing"
  }

  fn description(&self) -> &str {
    "Verifies a GPG signing key is configured and usable"
  }

  fn run(&self, ctx: &CheckContext) -> RelResult<CheckResult> {
    let signing_wanted = ctx.config.as_ref().map(|c| c.release.sign_tags).unwrap_or(true);

    if !signing_wanted {
      return Ok(CheckResult::pass(self.name(), "Tag signing disabled in relkit.toml"));
    }

    let key = resolve_key(ctx)?;

    let Some(key) = key else {
      return Ok(CheckResult::warning(
        self.name(),
        "No signing key configured (git user.signingkey or relkit.toml [signing].key_id)",
        Some("git config user.signingkey <KEY_ID>, or set release.sign_tags = false"),
      ));
    };

    if !secret_key_exists(Some(key.as_str())) {
      return Ok(
        CheckResult::error(
          self.name(),
          format!("Signing key '{}' not found in the gpg secret keyring", key),
          Some("gpg --list-secret-keys to inspect, or import the key on this machine"),
        )
        .with_details(serde_json::json!({ "key_id": key })),
      );
    }

    Ok(CheckResult::pass(
      self.name(),
      format!("Signing key '{}' is available", key),
    ))
  }
}
