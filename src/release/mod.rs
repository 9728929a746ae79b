//! Release analysis and changelog maintenance
//!
//! # Core Invariants
//!
//! 1. **package.json is the version source of truth**
//!    - Bumps land there first, then propagate to version files, tags,
//!      and changelog headers
//!
//! 2. **Every completed release has: version, sha, date**
//!    - Stored as the anchor in relkit.toml `[state]`
//!    - The anchor bounds the commit range for the next release plan
//!
//! 3. **The changelog always carries an Unreleased section**
//!    - Promotion moves its content into a dated release section and
//!      leaves a fresh empty Unreleased behind

pub mod changelog;
pub mod commit;
pub mod plan;
pub mod tracker;

pub use commit::{CommitType, ConventionalCommit};
pub use plan::{ReleaseCommit, ReleasePlan, VersionBump};
pub use tracker::ReleaseTracker;
