//! Core building blocks for relkit operations
//!
//! - **config**: relkit.toml parsing, validation, and release-state persistence
//! - **context**: unified package context for sharing loaded data across commands
//! - **error**: comprehensive error types with contextual help messages
//! - **vcs**: git operations abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
