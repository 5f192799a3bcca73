//! Path utilities for bpm
//!
//! Bundle-relative paths are always stored with forward slashes so digests and
//! archives are identical across platforms.

use std::path::{Component, Path};

use wax::{CandidatePath, Glob, Pattern};

/// Convert a path to a forward-slash string
///
/// # Examples
///
/// ```ignore
/// let path = Path::new("policies\\authz.rego");
/// assert_eq!(to_forward_slashes(path), "policies/authz.rego");
/// ```
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a package name safe for use as a file name.
///
/// Every character outside `[A-Za-z0-9_-]` (including `.`) becomes `_`.
/// Returns "unknown" if the name is empty.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(make_path_safe("acme.authz"), "acme_authz");
/// assert_eq!(make_path_safe("@org/policy"), "_org_policy");
/// ```
pub fn make_path_safe(name: &str) -> String {
    if name.is_empty() {
        return "unknown".to_string();
    }
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Whether `path` is relative and never escapes its root.
///
/// Used to reject archive entries such as `/etc/passwd` or `../x.rego`.
pub fn is_contained_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Check if a glob pattern matches a bundle-relative file path
///
/// Invalid patterns never match; the manifest validator reports them.
pub fn matches_glob(pattern: &str, file_path: &str) -> bool {
    let normalized_path = to_forward_slashes(Path::new(file_path));
    let candidate = CandidatePath::from(normalized_path.as_str());
    Glob::new(pattern).is_ok_and(|glob| glob.matched(&candidate).is_some())
}

/// Whether a glob pattern compiles
pub fn is_valid_glob(pattern: &str) -> bool {
    Glob::new(pattern).is_ok()
}
