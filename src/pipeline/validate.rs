//! Manifest validation command

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::config::{BundleFile, MANIFEST_FILE, Validate};
use crate::error::{BpmError, Result, storage};

use super::Command;

/// Input for [`ValidateCommand`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateInput {
    /// Directory holding `bundle.yaml`
    pub source_dir: PathBuf,
}

impl ValidateInput {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }
}

/// Reads and validates a bundle manifest, reporting every violation at once
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateCommand;

impl ValidateCommand {
    pub const NAME: &'static str = "validate";

    pub fn new() -> Self {
        Self
    }
}

impl Command for ValidateCommand {
    type Input = ValidateInput;
    type Output = BundleFile;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&self, input: &ValidateInput) -> Result<BundleFile> {
        let path = input.source_dir.join(MANIFEST_FILE);
        let yaml = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                BpmError::ManifestNotFound {
                    path: input.source_dir.display().to_string(),
                }
            } else {
                storage::read_failed(path.display().to_string(), e.to_string())
            }
        })?;

        let manifest = BundleFile::from_yaml(&yaml, &path.display().to_string())?;
        manifest.validate()?;
        debug!(package = %manifest.package.name, "manifest is valid");
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn write_manifest(yaml: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), yaml).unwrap();
        temp
    }

    #[test]
    fn test_valid_manifest() {
        let temp = write_manifest("package:\n  name: acme.authz\n  version: 1.2.0\n");
        let manifest = ValidateCommand
            .execute(&ValidateInput::new(temp.path()))
            .unwrap();
        assert_eq!(manifest.package.name, "acme.authz");
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let err = ValidateCommand
            .execute(&ValidateInput::new(temp.path()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_unparseable_manifest() {
        let temp = write_manifest("package: [not, a, map\n");
        let err = ValidateCommand
            .execute(&ValidateInput::new(temp.path()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_all_violations_reported() {
        let temp = write_manifest(
            "package:\n  name: ''\n  version: one\ndependencies:\n  - name: x\n",
        );
        match ValidateCommand
            .execute(&ValidateInput::new(temp.path()))
            .unwrap_err()
        {
            BpmError::Validation { violations } => {
                let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
                assert!(fields.contains(&"package.name"));
                assert!(fields.contains(&"package.version"));
                assert!(fields.iter().any(|f| f.starts_with("dependencies[0]")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
