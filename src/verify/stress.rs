//! Fixed fan-out install stress test
//!
//! Spawns N parallel `npm install` workers against the released version in
//! scratch directories and counts completions. No coordination beyond the
//! join - the point is to catch registry propagation flakiness, not to
//! benchmark.

use crate::npm::NpmClient;
use crate::ui::progress::MultiProgress;
use rayon::prelude::*;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

/// Outcome of a stress run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressOutcome {
  pub attempted: usize,
  pub succeeded: usize,
  pub failed: usize,
  pub duration_ms: u64,
  /// First failure message, when any worker failed
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_failure: Option<String>,
}

impl StressOutcome {
  pub fn passed(&self) -> bool {
    self.failed == 0
  }
}

/// Scratch directory for one worker, removed on drop
struct ScratchDir {
  path: PathBuf,
}

impl ScratchDir {
  fn create(label: &str, idx: usize) -> std::io::Result<Self> {
    let path = std::env::temp_dir().join(format!("relkit-stress-{}-{}-{}", label, std::process::id(), idx));
    std::fs::create_dir_all(&path)?;
    Ok(Self { path })
  }
}

impl Drop for ScratchDir {
  fn drop(&mut self) {
    let _ = std::fs::remove_dir_all(&self.path);
  }
}

/// Run the stress fan-out: N parallel installs of `name@version`
pub fn run_stress(client: &NpmClient, name: &str, version: &Version, workers: usize) -> StressOutcome {
  let start = Instant::now();

  let progress = MultiProgress::new();
  let bar = progress.add_bar(workers, format!("install {}@{}", name, version));

  let results: Vec<Result<(), String>> = (0..workers)
    .into_par_iter()
    .map(|idx| {
      let result = (|| {
        let scratch = ScratchDir::create("install", idx).map_err(|e| e.to_string())?;
        client
          .install_into(&scratch.path, name, version)
          .map_err(|e| e.to_string())
      })();
      progress.inc(&bar);
      result
    })
    .collect();

  let succeeded = results.iter().filter(|r| r.is_ok()).count();
  let first_failure = results.iter().find_map(|r| r.as_ref().err().cloned());

  StressOutcome {
    attempted: workers,
    succeeded,
    failed: workers - succeeded,
    duration_ms: start.elapsed().as_millis() as u64,
    first_failure,
  }
}
