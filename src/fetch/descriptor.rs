//! Remote bundle descriptors
//!
//! Accepted forms:
//! - `github:owner/repo`
//! - `owner/repo` (GitHub shorthand)
//! - `https://host/path.git`, `http://…`, `ssh://…`, `git@host:path`
//! - `file:///path` or an absolute path
//!
//! Any form may carry a `#ref` suffix (branch, tag or SHA).

use std::fmt;

use crate::config::DependencySpec;
use crate::error::{Result, fetch};

/// Where to retrieve a remote bundle from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VendorDescriptor {
    /// Clone URL
    pub url: String,
    /// Branch, tag or SHA; remote HEAD when `None`
    pub git_ref: Option<String>,
    /// Bundle root inside the repository
    pub subdir: Option<String>,
    /// Expected bundle digest
    pub digest: Option<String>,
}

impl VendorDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            git_ref: None,
            subdir: None,
            digest: None,
        }
    }

    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// Parse a descriptor from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(fetch::parse_failed(input, "empty source"));
        }

        let (main, git_ref) = match input.rsplit_once('#') {
            Some((main, r)) if !r.is_empty() => (main, Some(r.to_string())),
            Some((main, _)) => (main, None),
            None => (input, None),
        };

        let url = parse_url(main).ok_or_else(|| {
            fetch::parse_failed(input, "unrecognized source format")
        })?;

        Ok(Self {
            url,
            git_ref,
            subdir: None,
            digest: None,
        })
    }

    /// Build a descriptor from a git dependency declaration
    pub fn from_dependency(dep: &DependencySpec) -> Result<Option<Self>> {
        let Some(git) = &dep.git else {
            return Ok(None);
        };
        let mut descriptor = Self::parse(git)?;
        if dep.git_ref.is_some() {
            descriptor.git_ref.clone_from(&dep.git_ref);
        }
        descriptor.subdir.clone_from(&dep.subdir);
        descriptor.digest.clone_from(&dep.digest);
        Ok(Some(descriptor))
    }

    /// Key identifying what this descriptor retrieves, independent of the
    /// expected digest
    pub fn cache_key(&self) -> String {
        let url = self.url.trim_end_matches('/');
        let url = url.strip_suffix(".git").unwrap_or(url);
        format!(
            "{}#{}:{}",
            url,
            self.git_ref.as_deref().unwrap_or(""),
            self.subdir.as_deref().unwrap_or("").trim_matches('/')
        )
    }
}

impl fmt::Display for VendorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)?;
        if let Some(r) = &self.git_ref {
            write!(f, "#{r}")?;
        }
        if let Some(s) = &self.subdir {
            write!(f, " ({s})")?;
        }
        Ok(())
    }
}

fn parse_url(main: &str) -> Option<String> {
    if let Some(rest) = main.strip_prefix("github:") {
        return github_shorthand(rest);
    }
    const SCHEMES: &[&str] = &["https://", "http://", "ssh://", "git@", "file://"];
    if SCHEMES.iter().any(|s| main.starts_with(s)) {
        return Some(main.to_string());
    }
    if main.starts_with('/') {
        return Some(format!("file://{main}"));
    }
    github_shorthand(main)
}

fn github_shorthand(rest: &str) -> Option<String> {
    let (owner, repo) = rest.split_once('/')?;
    let valid = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if !valid(owner) || !valid(repo) {
        return None;
    }
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Some(format!("https://github.com/{owner}/{repo}.git"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_github_shorthands() {
        let expected = "https://github.com/acme/policies.git";
        assert_eq!(VendorDescriptor::parse("github:acme/policies").unwrap().url, expected);
        assert_eq!(VendorDescriptor::parse("acme/policies").unwrap().url, expected);
        assert_eq!(VendorDescriptor::parse("acme/policies.git").unwrap().url, expected);
    }

    #[test]
    fn test_parse_full_urls() {
        for url in [
            "https://gitlab.com/acme/policies.git",
            "ssh://git@example.com/acme/policies.git",
            "git@github.com:acme/policies.git",
            "file:///srv/repos/policies",
        ] {
            assert_eq!(VendorDescriptor::parse(url).unwrap().url, url);
        }
        assert_eq!(
            VendorDescriptor::parse("/srv/repos/policies").unwrap().url,
            "file:///srv/repos/policies"
        );
    }

    #[test]
    fn test_parse_ref_fragment() {
        let d = VendorDescriptor::parse("acme/policies#v1.2.0").unwrap();
        assert_eq!(d.git_ref.as_deref(), Some("v1.2.0"));
        let d = VendorDescriptor::parse("acme/policies#").unwrap();
        assert_eq!(d.git_ref, None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "   ", "just-a-name", "a/b/c", "owner/re po"] {
            let err = VendorDescriptor::parse(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Decode, "input: {input:?}");
        }
    }

    #[test]
    fn test_cache_key_ignores_digest_and_git_suffix() {
        let a = VendorDescriptor::new("https://example.com/r.git").with_ref("main");
        let b = VendorDescriptor::new("https://example.com/r")
            .with_ref("main")
            .with_digest(format!("blake3:{}", "0".repeat(64)));
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), a.clone().with_subdir("sub").cache_key());
    }

    #[test]
    fn test_from_dependency() {
        let mut dep = DependencySpec::git("shared", "acme/shared#v1", Some("v2".into()));
        dep.subdir = Some("bundles/shared".into());
        let d = VendorDescriptor::from_dependency(&dep).unwrap().unwrap();
        assert_eq!(d.url, "https://github.com/acme/shared.git");
        assert_eq!(d.git_ref.as_deref(), Some("v2"));
        assert_eq!(d.subdir.as_deref(), Some("bundles/shared"));

        let local = DependencySpec::local("common", "../common");
        assert!(VendorDescriptor::from_dependency(&local).unwrap().is_none());
    }
}
