//! A dependency declaration in bundle.yaml

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Violation;
use crate::hash;
use crate::path_utils;

use super::validation::Validate;

/// A dependency declaration in bundle.yaml
///
/// Exactly one of `path` (local, relative to the declaring bundle) or `git`
/// (remote) is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Dependency name, unique within the manifest
    pub name: String,

    /// Local path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Git repository URL or shorthand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,

    /// Git ref (branch, tag, or SHA)
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,

    /// Subdirectory inside the repository holding the bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<String>,

    /// Expected bundle digest (`blake3:<hex>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl DependencySpec {
    /// Create a new local dependency
    pub fn local(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            git: None,
            git_ref: None,
            subdir: None,
            digest: None,
        }
    }

    /// Create a new git dependency
    pub fn git(name: impl Into<String>, url: impl Into<String>, git_ref: Option<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            git: Some(url.into()),
            git_ref,
            subdir: None,
            digest: None,
        }
    }

    /// Identity used to detect the same dependency declared twice
    pub fn identity(&self) -> String {
        match (&self.path, &self.git) {
            (Some(path), _) => format!(
                "path:{}",
                path_utils::to_forward_slashes(Path::new(path.trim()))
                    .trim_end_matches('/')
            ),
            (None, Some(url)) => format!(
                "git:{}#{}:{}",
                url.trim().trim_end_matches('/').trim_end_matches(".git"),
                self.git_ref.as_deref().unwrap_or(""),
                self.subdir.as_deref().unwrap_or("")
            ),
            (None, None) => format!("name:{}", self.name),
        }
    }

    /// Human-readable specifier used in error reports
    pub fn specifier(&self) -> String {
        match (&self.path, &self.git) {
            (Some(path), _) => format!("{} (path {})", self.name, path),
            (None, Some(url)) => match &self.git_ref {
                Some(r) => format!("{} (git {}#{})", self.name, url, r),
                None => format!("{} (git {})", self.name, url),
            },
            (None, None) => self.name.clone(),
        }
    }
}

impl Validate for DependencySpec {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        if self.name.trim().is_empty() {
            out.push(Violation::new("name", "must not be empty"));
        }

        match (&self.path, &self.git) {
            (Some(_), Some(_)) => out.push(Violation::new(
                "path",
                "only one of 'path' or 'git' may be specified",
            )),
            (None, None) => out.push(Violation::new(
                "path",
                "either 'path' or 'git' must be specified",
            )),
            (Some(path), None) if path.trim().is_empty() => {
                out.push(Violation::new("path", "must not be empty"));
            }
            (None, Some(url)) if url.trim().is_empty() => {
                out.push(Violation::new("git", "must not be empty"));
            }
            _ => {}
        }

        if self.git.is_none() && self.git_ref.is_some() {
            out.push(Violation::new("ref", "only allowed on git dependencies"));
        }

        if let Some(subdir) = &self.subdir {
            if !path_utils::is_contained_relative(Path::new(subdir)) {
                out.push(Violation::new(
                    "subdir",
                    "must be a relative path inside the repository",
                ));
            }
        }

        if let Some(digest) = &self.digest {
            if !hash::is_valid_digest(digest) {
                out.push(Violation::new("digest", "must be a blake3:<64 hex> digest"));
            }
        }

        out
    }
}
