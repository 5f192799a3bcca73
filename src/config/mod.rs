//! Configuration file handling for bpm
//!
//! This module contains data structures for:
//! - `bundle.yaml` - Bundle manifest
//! - `bundle.lock` - Lock artifact written next to a built archive
//! - Runtime settings resolved from flags and environment

pub mod lockfile;
pub mod manifest;
pub mod settings;

pub use lockfile::Lockfile;
pub use manifest::{BundleFile, DependencySpec, MANIFEST_FILE, Validate};
pub use settings::Settings;
