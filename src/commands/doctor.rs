//! Health check command for diagnosing issues
//!
//! The doctor command runs all health checks and reports any issues found.

use crate::checks::{CheckContext, Severity, create_default_runner};
use crate::core::context::ReleaseContext;
use crate::core::error::{ExitCode, RelError, RelResult};

/// Run the doctor command to diagnose issues
///
/// Returns Ok(()) if all checks pass, or exits with error code if checks fail
pub fn run_doctor(ctx: &ReleaseContext, thorough: bool, json: bool) -> RelResult<()> {
  let check_ctx = CheckContext {
    package_root: ctx.root.clone(),
    config: ctx.config.clone(),
    thorough,
  };

  let runner = create_default_runner();
  let results = runner.run_all(&check_ctx)?;

  if json {
    // JSON output for CI/automation
    let json_output = serde_json::to_string_pretty(&results)
      .map_err(|e| RelError::message(format!("Failed to serialize JSON: {}", e)))?;
    println!("{}", json_output);
  } else {
    // Human-readable output
    println!("🏥 Running health checks...\n");

    let mut has_errors = false;
    let mut has_warnings = false;

    println!("📋 Registered checks:");
    for check in runner.checks() {
      println!("   • {}: {}", check.name(), check.description());
    }
    println!();

    for result in &results {
      let icon = if result.passed { "✅" } else { "❌" };
      println!("{} {}: {}", icon, result.check_name, result.message);

      if !result.passed {
        if let Some(ref suggestion) = result.suggestion {
          println!("   💡 Fix: {}", suggestion);
        }

        match result.severity {
          Severity::Error => has_errors = true,
          Severity::Warning => has_warnings = true,
          _ => {}
        }
      }
      println!();
    }

    let passed_count = results.iter().filter(|r| r.passed).count();
    let total_count = results.len();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Summary: {}/{} checks passed", passed_count, total_count);

    if has_errors {
      println!("\n⚠️  Critical issues found. Please fix errors before releasing.");
      std::process::exit(ExitCode::Validation.as_i32());
    } else if has_warnings {
      println!("\n⚠️  Some warnings found. Consider addressing them.");
    } else {
      println!("\n✨ All checks passed! Your setup looks healthy.");
    }
  }

  Ok(())
}
