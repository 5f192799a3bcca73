//! Lock artifact (bundle.lock)
//!
//! Written next to a built archive; enumerates exactly what was packaged so
//! the archive can be verified without unpacking the source tree again.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Bundle;
use crate::error::{BpmError, Result};
use crate::hash;

/// Lock artifact file name
pub const LOCKFILE_NAME: &str = "bundle.lock";

/// One packaged file and its content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedFile {
    pub path: String,
    pub hash: String,
}

/// Lockfile structure (bundle.lock)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockfile {
    pub package: String,
    pub version: String,
    /// Bundle digest over manifest and sources
    pub digest: String,
    /// Archive file name, relative to the lockfile
    pub archive: String,
    /// Packaged files in path order
    pub files: Vec<LockedFile>,
}

impl Lockfile {
    /// Describe what `bundle` packages into `archive`
    pub fn for_bundle(bundle: &Bundle, archive: &str) -> Self {
        Self {
            package: bundle.manifest.package.name.clone(),
            version: bundle.manifest.package.version.clone(),
            digest: bundle.digest(),
            archive: archive.to_string(),
            files: bundle
                .files
                .values()
                .map(|f| LockedFile {
                    path: f.path.clone(),
                    hash: hash::hash_bytes(&f.content),
                })
                .collect(),
        }
    }

    /// Parse lockfile from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BpmError::ConfigParseFailed {
            path: LOCKFILE_NAME.to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize lockfile to pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| BpmError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}
