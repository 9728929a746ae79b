//! CLI commands for relkit
//!
//! This module contains all user-facing command implementations:
//!
//! ## Setup & Inspection
//! - **init**: Initialize relkit.toml and a starter changelog
//! - **doctor**: Run health checks and validation
//! - **status**: Show where the release stands
//!
//! ## Release Steps
//! - **version**: Plan and apply semver bumps from conventional commits
//! - **changelog**: Generate and validate the Keep a Changelog file
//! - **tag**: Create the (GPG-signed) release tag
//! - **publish**: Validation-gated npm publish
//!
//! ## Aftercare
//! - **verify**: Post-publish verification with stress fan-out
//! - **rollback**: Backed-up, scoped rollback of a bad release
//! - **monitor**: Poll health signals against thresholds
//!
//! ## Orchestration
//! - **run**: The full pipeline in one shot
//!
//! Commands accept `&ReleaseContext` to avoid redundant loads.

pub mod changelog;
pub mod doctor;
pub mod init;
pub mod monitor;
pub mod publish;
pub mod rollback;
pub mod run;
pub mod status;
pub mod tag;
pub mod verify;
pub mod version;

pub use changelog::{run_changelog_generate, run_changelog_validate};
pub use doctor::run_doctor;
pub use init::run_init;
pub use monitor::run_monitor;
pub use publish::run_publish;
pub use rollback::run_rollback;
pub use run::run_release;
pub use status::run_status;
pub use tag::run_tag;
pub use verify::run_verify;
pub use version::{run_version_apply, run_version_plan};
