//! Tag command: create the (signed) release tag

use crate::core::context::ReleaseContext;
use crate::core::error::{RelError, RelResult, ValidationError};
use crate::core::vcs::SystemGit;

/// Run the tag command
pub fn run_tag(ctx: &ReleaseContext, push: bool, no_sign: bool, dry_run: bool) -> RelResult<()> {
  let config = ctx.require_config()?;
  let package_dir = ctx.package_dir();

  let version = ctx.manifest.version()?;
  let tag = config.tag_for(&version);
  let sign = config.release.sign_tags && !no_sign;

  let git = SystemGit::open(&package_dir)?;

  // Preflight gates, same order the release checklist ran them
  if git.tag_exists(&tag)? {
    return Err(RelError::Validation(ValidationError::Gate {
      reason: format!("tag {} already exists", tag),
    }));
  }

  if !git.is_clean()? {
    return Err(RelError::Validation(ValidationError::Gate {
      reason: "working tree has uncommitted changes".to_string(),
    }));
  }

  let key_id = match (&config.signing.key_id, sign) {
    (Some(key), true) => Some(key.clone()),
    (None, true) => git.config_get("user.signingkey")?,
    _ => None,
  };

  if sign && key_id.is_none() && config.signing.require_signed_tags {
    return Err(RelError::with_help(
      "Signed tags are required but no signing key is resolvable",
      "git config user.signingkey <KEY_ID>, or set [signing].key_id in relkit.toml",
    ));
  }

  let message = format!("Release {} v{}", config.package.name, version);

  println!("🏷️  Tag plan");
  println!("   Tag:     {}", tag);
  println!("   Signed:  {}", if sign { "yes (gpg)" } else { "no (annotated only)" });
  if let Some(ref key) = key_id {
    println!("   Key:     {}", key);
  }
  println!("   Push:    {}", if push { "origin" } else { "no" });
  println!();

  if dry_run {
    println!("🔍 Dry-run mode (no tag created)");
    return Ok(());
  }

  git.create_tag(&tag, &message, sign, key_id.as_deref())?;
  println!("✅ Created tag {}", tag);

  if sign && !git.verify_tag(&tag)? {
    println!("⚠️  Tag created but signature verification failed (git tag -v {})", tag);
  }

  if push {
    if !git.has_remote("origin")? {
      return Err(RelError::with_help(
        "No 'origin' remote configured",
        "Add a remote first: git remote add origin <url>",
      ));
    }
    git.push_tag("origin", &tag)?;
    println!("✅ Pushed {} to origin", tag);
  } else {
    println!();
    println!("Next: git push origin {}", tag);
  }

  Ok(())
}
