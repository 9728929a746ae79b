//! Monitor command: post-release health polling

use crate::core::context::ReleaseContext;
use crate::core::error::RelResult;
use crate::monitor;
use crate::npm::NpmClient;
use crate::verify::report::RunReport;

/// Run the monitor command
pub fn run_monitor(
  ctx: &ReleaseContext,
  duration: Option<u64>,
  interval: Option<u64>,
  json: bool,
) -> RelResult<()> {
  let config = ctx.require_config()?;
  let package_dir = ctx.package_dir();

  // CLI flags override the configured window
  let mut effective = config.as_ref().clone();
  if let Some(secs) = duration {
    effective.monitor.duration_secs = secs;
  }
  if let Some(secs) = interval {
    effective.monitor.interval_secs = secs;
  }
  effective.validate()?;

  let version = ctx.manifest.version()?;
  let npm = NpmClient::new(&package_dir, &effective.package.registry);
  let mut report = RunReport::new("monitoring", &effective.package.name, Some(&version));

  if !json {
    println!(
      "🔭 Monitoring {}@{} for {}s (every {}s)",
      effective.package.name, version, effective.monitor.duration_secs, effective.monitor.interval_secs
    );
    println!();
  }

  let breaches = monitor::run_monitor(&effective, &npm, &version, &mut report, json)?;

  if json {
    println!("{}", report.to_json()?);
  } else {
    println!();
    let (pass, fail, warn, skip) = report.counts();
    println!("Summary: {} passed, {} failed, {} warning(s), {} skipped", pass, fail, warn, skip);

    let path = report.save_markdown(&ctx.root)?;
    println!("📄 Report written to {}", path.display());

    if breaches == 0 {
      println!();
      println!("✅ No threshold breaches during the monitoring window");
    } else {
      println!();
      println!("⚠️  {} poll(s) breached thresholds; consider `relkit rollback {}`", breaches, version);
    }
  }

  Ok(())
}
