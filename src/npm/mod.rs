//! npm package and registry layer
//!
//! - **manifest**: package.json reading and version updates
//! - **client**: system-npm wrapper for registry queries and mutations

pub mod client;
pub mod manifest;

pub use client::NpmClient;
pub use manifest::PackageManifest;
