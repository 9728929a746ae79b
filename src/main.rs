mod checks;
mod commands;
mod core;
mod monitor;
mod npm;
mod release;
mod rollback;
mod ui;
mod utils;
mod verify;

use clap::{Parser, Subcommand};
use crate::core::error::{RelError, print_error};

/// Release automation for npm packages
#[derive(Parser)]
#[command(name = "relkit")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct RelkitCli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Setup & Inspection
  // ============================================================================
  /// Initialize relkit configuration for an npm package
  Init {
    /// Overwrite an existing relkit.toml
    #[arg(long)]
    force: bool,
  },

  /// Run health checks and diagnostics
  Doctor {
    /// Run thorough checks (includes registry auth)
    #[arg(long)]
    thorough: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show where the release stands
  Status {
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Release Steps
  // ============================================================================
  /// Version planning and bumping from conventional commits
  #[command(subcommand)]
  Version(VersionCommands),

  /// Changelog generation and validation (Keep a Changelog)
  #[command(subcommand)]
  Changelog(ChangelogCommands),

  /// Create the release tag (GPG-signed by default)
  Tag {
    /// Push the tag to origin after creating it
    #[arg(long)]
    push: bool,
    /// Create a plain annotated tag even when signing is configured
    #[arg(long)]
    no_sign: bool,
    /// Show what would happen without making changes
    #[arg(long)]
    dry_run: bool,
  },

  /// Publish the package to the npm registry (validation-gated)
  Publish {
    /// dist-tag to publish under (default: from relkit.toml)
    #[arg(long)]
    dist_tag: Option<String>,
    /// One-time password for registries requiring 2FA
    #[arg(long)]
    otp: Option<String>,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
    /// Run all gates but skip the actual publish
    #[arg(long)]
    dry_run: bool,
  },

  // ============================================================================
  // Aftercare
  // ============================================================================
  /// Verify a published release (registry, dist-tag, tag, changelog, stress)
  Verify {
    /// Version to verify (default: package.json version)
    #[arg(long)]
    release: Option<String>,
    /// Number of parallel install workers for the stress test (0 disables)
    #[arg(long, default_value_t = 4)]
    stress: usize,
    /// Output the report in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Roll back a bad release (plan → backup → confirm → execute → verify)
  Rollback {
    /// Version to roll back
    #[arg(id = "rollback_version", value_name = "VERSION")]
    version: String,
    /// Version to restore (default: newest older release)
    #[arg(long)]
    to: Option<String>,
    /// Comma-separated scopes: npm,git,github,docs (default: from relkit.toml)
    #[arg(long)]
    scope: Option<String>,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
    /// Show the plan without writing a backup or executing
    #[arg(long)]
    dry_run: bool,
    /// Output the plan/report in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Monitor a release against health thresholds
  Monitor {
    /// Total monitoring window in seconds (default: from relkit.toml)
    #[arg(long)]
    duration: Option<u64>,
    /// Seconds between polls (default: from relkit.toml)
    #[arg(long)]
    interval: Option<u64>,
    /// Output the report in JSON format
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Orchestration
  // ============================================================================
  /// Run the full release pipeline (gates → version → changelog → tag → publish → verify)
  Run {
    /// Stop after tagging; do not publish
    #[arg(long)]
    skip_publish: bool,
    /// Skip confirmation prompts
    #[arg(short, long)]
    yes: bool,
    /// Walk the pipeline without mutating anything
    #[arg(long)]
    dry_run: bool,
  },
}

#[derive(Subcommand)]
enum VersionCommands {
  /// Analyze commits since the last release and suggest a bump
  Plan {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Apply a bump to package.json and configured version files
  Apply {
    /// Force a specific bump: major, minor, or patch
    #[arg(long)]
    bump: Option<String>,
    /// Attach a prerelease identifier (e.g. "rc.1")
    #[arg(long)]
    pre: Option<String>,
    /// Show what would happen without making changes
    #[arg(long)]
    dry_run: bool,
  },
}

#[derive(Subcommand)]
enum ChangelogCommands {
  /// Promote the Unreleased section into a dated release section
  Generate {
    /// Version for the new section (default: package.json version)
    #[arg(long)]
    release: Option<String>,
    /// Synthesize the section from conventional commits instead of promoting
    #[arg(long)]
    from_commits: bool,
    /// Print the result without writing the file
    #[arg(long)]
    dry_run: bool,
  },

  /// Validate the changelog structure
  Validate {
    /// Treat warnings as errors (exit code 3)
    #[arg(long)]
    strict: bool,
    /// Output findings in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = RelkitCli::parse();

  // init runs before package context can exist
  if let Commands::Init { force } = &cli.command {
    if let Err(err) = commands::run_init(*force) {
      handle_error(err);
    }
    return;
  }

  let root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  // Build package context once (loads config and manifest)
  let ctx = match crate::core::context::ReleaseContext::build(&root) {
    Ok(ctx) => ctx,
    Err(e) => {
      handle_error(e);
    }
  };

  let result = match cli.command {
    Commands::Init { .. } => unreachable!("handled above"),

    // Setup & Inspection
    Commands::Doctor { thorough, json } => commands::run_doctor(&ctx, thorough, json),
    Commands::Status { json } => commands::run_status(&ctx, json),

    // Release Steps
    Commands::Version(version_cmd) => match version_cmd {
      VersionCommands::Plan { json } => commands::run_version_plan(&ctx, json),
      VersionCommands::Apply { bump, pre, dry_run } => commands::run_version_apply(&ctx, bump, pre, dry_run),
    },
    Commands::Changelog(changelog_cmd) => match changelog_cmd {
      ChangelogCommands::Generate {
        release,
        from_commits,
        dry_run,
      } => commands::run_changelog_generate(&ctx, release, from_commits, dry_run),
      ChangelogCommands::Validate { strict, json } => commands::run_changelog_validate(&ctx, strict, json),
    },
    Commands::Tag { push, no_sign, dry_run } => commands::run_tag(&ctx, push, no_sign, dry_run),
    Commands::Publish {
      dist_tag,
      otp,
      yes,
      dry_run,
    } => commands::run_publish(&ctx, dist_tag, otp, yes, dry_run),

    // Aftercare
    Commands::Verify { release, stress, json } => commands::run_verify(&ctx, release, stress, json),
    Commands::Rollback {
      version,
      to,
      scope,
      yes,
      dry_run,
      json,
    } => commands::run_rollback(&ctx, version, to, scope, yes, dry_run, json),
    Commands::Monitor {
      duration,
      interval,
      json,
    } => commands::run_monitor(&ctx, duration, interval, json),

    // Orchestration
    Commands::Run {
      skip_publish,
      yes,
      dry_run,
    } => commands::run_release(&ctx, skip_publish, yes, dry_run),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RelError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
