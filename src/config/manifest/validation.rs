//! Field and structural validation of manifests
//!
//! Validators collect every violation instead of stopping at the first, so a
//! single `bpm validate` run reports everything that needs fixing.

use crate::error::{BpmError, Result, Violation};

/// A value that can check itself for field-level violations
pub trait Validate {
    /// All violations, in field order. Empty when valid.
    fn violations(&self) -> Vec<Violation>;

    /// Aggregate violations into a single validation error
    fn validate(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(BpmError::Validation { violations })
        }
    }
}

/// Prefix every field of `nested` with `prefix.`
pub(crate) fn nest(prefix: &str, nested: Vec<Violation>) -> impl Iterator<Item = Violation> + '_ {
    nested
        .into_iter()
        .map(move |v| Violation::new(format!("{prefix}.{}", v.field), v.message))
}

/// Package names: ASCII letters, digits, `.`, `_`, `-`; must start with a letter or digit
pub(crate) fn is_valid_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// `MAJOR.MINOR.PATCH` with optional `-prerelease` and `+build` suffixes
pub(crate) fn is_valid_version(version: &str) -> bool {
    let core = version
        .split_once('+')
        .map_or(version, |(core, _)| core);
    let (core, pre) = match core.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (core, None),
    };
    if pre.is_some_and(str::is_empty) {
        return false;
    }
    let parts: Vec<&str> = core.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_charset() {
        assert!(is_valid_package_name("acme.authz"));
        assert!(is_valid_package_name("policy_lib-2"));
        assert!(!is_valid_package_name(""));
        assert!(!is_valid_package_name(".hidden"));
        assert!(!is_valid_package_name("has space"));
        assert!(!is_valid_package_name("slash/name"));
    }

    #[test]
    fn test_version_format() {
        assert!(is_valid_version("1.2.3"));
        assert!(is_valid_version("0.1.0-rc.1"));
        assert!(is_valid_version("1.0.0+build.5"));
        assert!(!is_valid_version("1.2"));
        assert!(!is_valid_version("v1.2.3"));
        assert!(!is_valid_version("1.2.3-"));
        assert!(!is_valid_version(""));
    }

    #[test]
    fn test_nest_prefixes_fields() {
        let nested: Vec<_> = nest("dependencies[2]", vec![Violation::new("git", "bad")]).collect();
        assert_eq!(nested[0].field, "dependencies[2].git");
    }
}
