//! Changelog commands: generate (promote or synthesize) and validate

use crate::core::context::ReleaseContext;
use crate::core::error::{RelError, RelResult, ValidationError};
use crate::release::changelog::{self, ChangelogDoc, IssueSeverity};
use crate::release::plan::ReleasePlan;
use crate::utils::parse_version;

/// Run the changelog generate command
///
/// Default: promote the Unreleased section into a dated release section.
/// With --from-commits: synthesize the section from conventional commits
/// since the release anchor instead.
pub fn run_changelog_generate(
  ctx: &ReleaseContext,
  release: Option<String>,
  from_commits: bool,
  dry_run: bool,
) -> RelResult<()> {
  let config = ctx.require_config()?;
  let path = ctx.changelog_path()?;

  let version = match release {
    Some(raw) => parse_version(&raw)?,
    None => ctx.manifest.version()?,
  };
  let date = chrono::Utc::now().format("%Y-%m-%d").to_string();

  let content = std::fs::read_to_string(&path)
    .map_err(|e| RelError::message(format!("Cannot read {}: {}", path.display(), e)))?;
  let mut doc = ChangelogDoc::parse(&content);

  if from_commits {
    if doc.has_version(&version) {
      return Err(RelError::Validation(ValidationError::Changelog {
        reason: format!("a section for {} already exists", version),
      }));
    }

    let plan = ReleasePlan::analyze(&ctx.package_dir(), config, &version)?;
    if plan.commits.is_empty() {
      return Err(RelError::with_help(
        "No commits since the release anchor to generate from",
        "Commit changes first, or write the Unreleased section by hand",
      ));
    }

    let section = changelog::section_from_commits(&version, &date, &plan.commits);
    if !section.has_content() {
      return Err(RelError::with_help(
        "No changelog-worthy commits found (only chore/docs/test types)",
        "Write the Unreleased section by hand and re-run without --from-commits",
      ));
    }
    doc.insert_release(section);
  } else {
    doc.promote_unreleased(&version, &date)?;
  }

  if dry_run {
    println!("🔍 Dry-run mode; would write {}:", path.display());
    println!();
    println!("{}", doc.render());
    return Ok(());
  }

  std::fs::write(&path, doc.render())?;
  println!("✅ Added section [{}] - {} to {}", version, date, config.release.changelog.display());

  Ok(())
}

/// Run the changelog validate command
pub fn run_changelog_validate(ctx: &ReleaseContext, strict: bool, json: bool) -> RelResult<()> {
  let config = ctx.require_config()?;
  let path = ctx.changelog_path()?;

  let content = std::fs::read_to_string(&path)
    .map_err(|_| {
      RelError::Validation(ValidationError::Changelog {
        reason: format!("changelog not found at {}", path.display()),
      })
    })?;

  let issues = changelog::validate(&content);
  let errors = issues.iter().filter(|i| i.severity == IssueSeverity::Error).count();
  let warnings = issues.len() - errors;

  if json {
    println!("{}", serde_json::to_string_pretty(&issues)?);
  } else {
    if issues.is_empty() {
      println!("✅ {} is valid", config.release.changelog.display());
      return Ok(());
    }

    println!("📋 {} finding(s) in {}", issues.len(), config.release.changelog.display());
    println!();
    for issue in &issues {
      let icon = match issue.severity {
        IssueSeverity::Error => "❌",
        IssueSeverity::Warning => "⚠️",
      };
      println!("  {} {}", icon, issue.message);
    }
    println!();
  }

  if errors > 0 || (strict && warnings > 0) {
    return Err(RelError::Validation(ValidationError::Changelog {
      reason: format!("{} error(s), {} warning(s)", errors, warnings),
    }));
  }

  Ok(())
}
