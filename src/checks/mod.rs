//! Health checks and validation infrastructure
//!
//! This module provides a unified interface for running health checks and
//! release gates. All checks implement the `Check` trait, making it easy to
//! add new checks without modifying core logic.
//!
//! # Built-in Checks
//!
//! - **required-tools**: git/npm/gpg/gh availability
//! - **git-state**: repository, clean tree, release branch
//! - **gpg-signing**: signing key configured and present
//! - **npm-auth**: registry authentication (thorough mode only)
//! - **changelog**: Keep a Changelog structure
//! - **version-sync**: package.json vs configured version files

mod changelog;
mod git_state;
mod gpg;
mod npm_auth;
mod runner;
mod tools;
mod trait_def;
mod version_sync;

// Re-export public API
pub use runner::{CheckRunner, create_default_runner, create_publish_gate_runner};
pub use trait_def::{Check, CheckContext, CheckResult, Severity};

// Individual checks are not exported - they're registered in the runner
// constructors. This keeps the API simple and prevents misuse.
