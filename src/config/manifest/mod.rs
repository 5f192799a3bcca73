//! Bundle manifest (bundle.yaml)
//!
//! The manifest names the package, declares its dependencies and selects
//! which source files belong to the bundle.

pub mod dependency;
pub mod validation;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{BpmError, Result, Violation};
use crate::path_utils;

pub use dependency::DependencySpec;
pub use validation::Validate;

/// Manifest file name at the root of every bundle
pub const MANIFEST_FILE: &str = "bundle.yaml";

/// Package identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Bundle manifest from bundle.yaml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleFile {
    pub package: PackageInfo,

    /// Declared dependencies, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencySpec>,

    /// Globs selecting the source files of the bundle; all `.rego` files when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,

    /// Globs excluded when loading the source tree
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

impl BundleFile {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: PackageInfo {
                name: name.into(),
                version: version.into(),
                description: None,
                author: None,
            },
            dependencies: Vec::new(),
            targets: Vec::new(),
            ignore: Vec::new(),
        }
    }

    /// Parse a manifest; `origin` names the file in error messages
    pub fn from_yaml(yaml: &str, origin: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| BpmError::ManifestParseFailed {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Whether a bundle-relative source path is part of this bundle
    pub fn includes(&self, path: &str) -> bool {
        let targeted = if self.targets.is_empty() {
            path.ends_with(".rego")
        } else {
            self.targets.iter().any(|t| path_utils::matches_glob(t, path))
        };
        targeted && !self.ignore.iter().any(|g| path_utils::matches_glob(g, path))
    }
}

impl Validate for PackageInfo {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        if self.name.is_empty() {
            out.push(Violation::new("name", "must not be empty"));
        } else if !validation::is_valid_package_name(&self.name) {
            out.push(Violation::new(
                "name",
                "may only contain letters, digits, '.', '_' and '-', starting with a letter or digit",
            ));
        }
        if self.version.is_empty() {
            out.push(Violation::new("version", "must not be empty"));
        } else if !validation::is_valid_version(&self.version) {
            out.push(Violation::new("version", "must be MAJOR.MINOR.PATCH"));
        }
        out
    }
}

impl Validate for BundleFile {
    fn violations(&self) -> Vec<Violation> {
        let mut out: Vec<Violation> = validation::nest("package", self.package.violations()).collect();

        let mut names = HashSet::new();
        let mut identities = HashSet::new();
        for (i, dep) in self.dependencies.iter().enumerate() {
            let prefix = format!("dependencies[{i}]");
            out.extend(validation::nest(&prefix, dep.violations()));
            if !dep.name.is_empty() && !names.insert(dep.name.as_str()) {
                out.push(Violation::new(
                    format!("{prefix}.name"),
                    format!("duplicate dependency name '{}'", dep.name),
                ));
            }
            if !identities.insert(dep.identity()) {
                out.push(Violation::new(
                    prefix.clone(),
                    format!("'{}' declares a dependency that is already declared", dep.name),
                ));
            }
        }

        for (field, globs) in [("targets", &self.targets), ("ignore", &self.ignore)] {
            for (i, glob) in globs.iter().enumerate() {
                if !path_utils::is_valid_glob(glob) {
                    out.push(Violation::new(
                        format!("{field}[{i}]"),
                        format!("invalid glob pattern '{glob}'"),
                    ));
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const VALID: &str = r"
package:
  name: acme.authz
  version: 1.0.0
  description: Authorization policies
dependencies:
  - name: common
    path: ../common
  - name: shared
    git: https://example.com/shared.git
    ref: v2.1.0
targets:
  - 'policies/**/*.rego'
ignore:
  - 'policies/**/*_test.rego'
";

    #[test]
    fn test_parse_valid_manifest() {
        let manifest = BundleFile::from_yaml(VALID, "bundle.yaml").unwrap();
        assert_eq!(manifest.package.name, "acme.authz");
        assert_eq!(manifest.dependencies.len(), 2);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_parse_malformed_manifest_is_decode_error() {
        let err = BundleFile::from_yaml("package: [unclosed", "x/bundle.yaml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("x/bundle.yaml"));
    }

    #[test]
    fn test_validation_aggregates_all_violations() {
        let mut manifest = BundleFile::new("", "not-a-version");
        manifest.dependencies.push(DependencySpec::local("a", "../a"));
        manifest.dependencies.push(DependencySpec::local("a", "../b"));
        manifest.ignore.push("[".into());

        let violations = manifest.violations();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"package.name"));
        assert!(fields.contains(&"package.version"));
        assert!(fields.contains(&"dependencies[1].name"));
        assert!(fields.contains(&"ignore[0]"));

        let err = manifest.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_duplicate_identity_under_different_names() {
        let mut manifest = BundleFile::new("p", "1.0.0");
        manifest
            .dependencies
            .push(DependencySpec::git("a", "https://example.com/r.git", None));
        manifest
            .dependencies
            .push(DependencySpec::git("b", "https://example.com/r", None));
        let violations = manifest.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "dependencies[1]");
    }

    #[test]
    fn test_includes_respects_targets_and_ignore() {
        let manifest = BundleFile::from_yaml(VALID, "bundle.yaml").unwrap();
        assert!(manifest.includes("policies/authz/main.rego"));
        assert!(!manifest.includes("policies/authz/main_test.rego"));
        assert!(!manifest.includes("other/main.rego"));

        let plain = BundleFile::new("p", "1.0.0");
        assert!(plain.includes("any/where.rego"));
        assert!(!plain.includes("README.md"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let manifest = BundleFile::from_yaml(VALID, "bundle.yaml").unwrap();
        let yaml = manifest.to_yaml().unwrap();
        assert_eq!(BundleFile::from_yaml(&yaml, "bundle.yaml").unwrap(), manifest);
    }
}
