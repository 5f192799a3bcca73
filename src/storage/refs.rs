//! Ref index: descriptor cache key → stored bundle digest
//!
//! Lets a repeated resolution of the same remote descriptor hit the store
//! without contacting the remote.

use serde::{Deserialize, Serialize};

/// A recorded resolution of a remote descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefEntry {
    pub url: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<String>,
    /// Commit the ref resolved to
    pub sha: String,
    /// Digest of the stored bundle
    pub digest: String,
}
