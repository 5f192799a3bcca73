//! Bundle build command: validate, pack, lock

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::config::Lockfile;
use crate::config::lockfile::LOCKFILE_NAME;
use crate::error::Result;
use crate::path_utils::make_path_safe;
use crate::storage::{LoadOptions, Storage, atomic};

use super::validate::{ValidateCommand, ValidateInput};
use super::Command;

/// Suffix of built archives
pub const ARCHIVE_SUFFIX: &str = ".bundle.tar.gz";

/// Input for [`BuildCommand`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInput {
    pub validate: ValidateInput,
    /// Where the archive and lock are written
    pub output_dir: PathBuf,
    pub ignore: Vec<String>,
}

impl BuildInput {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            validate: ValidateInput::new(source_dir),
            output_dir: output_dir.into(),
            ignore: Vec::new(),
        }
    }
}

/// What a build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub archive: PathBuf,
    pub lockfile: PathBuf,
    pub digest: String,
    pub files: usize,
}

/// Archive file name for a package
pub fn archive_name(package: &str) -> String {
    format!("{}{ARCHIVE_SUFFIX}", make_path_safe(package))
}

pub struct BuildCommand {
    validate: ValidateCommand,
    storage: Arc<Storage>,
}

impl BuildCommand {
    pub const NAME: &'static str = "build";

    pub fn new(validate: ValidateCommand, storage: Arc<Storage>) -> Self {
        Self { validate, storage }
    }
}

impl Command for BuildCommand {
    type Input = BuildInput;
    type Output = BuildOutput;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn requires(&self) -> &'static [&'static str] {
        &[ValidateCommand::NAME]
    }

    fn execute(&self, input: &BuildInput) -> Result<BuildOutput> {
        let manifest = self.validate.execute(&input.validate)?;

        let options = LoadOptions {
            ignore: input.ignore.clone(),
        };
        let bundle = self.storage.load(&input.validate.source_dir, &options)?;

        let name = archive_name(&manifest.package.name);
        let archive = self
            .storage
            .save(&bundle, &input.output_dir.join(&name))?;

        let lock = Lockfile::for_bundle(&bundle, &name);
        let lockfile = input.output_dir.join(LOCKFILE_NAME);
        if Lockfile::read(&lockfile).ok().as_ref() != Some(&lock) {
            atomic::write_bytes_atomic(&lockfile, lock.to_json()?.as_bytes())?;
        }

        info!(
            package = %manifest.package.name,
            digest = %lock.digest,
            files = lock.files.len(),
            "built bundle"
        );
        Ok(BuildOutput {
            archive,
            lockfile,
            digest: lock.digest,
            files: lock.files.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BuildCommand) {
        let temp = TempDir::new().unwrap();
        let storage = Arc::new(Storage::open(temp.path().join("store")).unwrap());
        (temp, BuildCommand::new(ValidateCommand::new(), storage))
    }

    fn write_source(dir: &std::path::Path, manifest: &str) {
        fs::create_dir_all(dir.join("policies")).unwrap();
        fs::write(dir.join("bundle.yaml"), manifest).unwrap();
        fs::write(dir.join("policies/authz.rego"), "package acme.authz\n").unwrap();
    }

    #[test]
    fn test_archive_name_sanitized() {
        assert_eq!(archive_name("acme.authz"), "acme_authz.bundle.tar.gz");
    }

    #[test]
    fn test_build_writes_archive_and_lock() {
        let (temp, build) = setup();
        let src = temp.path().join("src");
        write_source(&src, "package:\n  name: acme.authz\n  version: 1.0.0\n");
        let out = temp.path().join("out");

        let output = build.execute(&BuildInput::new(&src, &out)).unwrap();

        assert_eq!(output.archive, out.join("acme_authz.bundle.tar.gz"));
        assert!(output.archive.is_file());
        assert_eq!(output.files, 1);

        let lock = Lockfile::read(&output.lockfile).unwrap();
        assert_eq!(lock.archive, "acme_authz.bundle.tar.gz");
        assert_eq!(lock.digest, output.digest);
        assert_eq!(lock.files[0].path, "policies/authz.rego");

        let reloaded = build
            .storage
            .load(&output.archive, &LoadOptions::default())
            .unwrap();
        assert_eq!(reloaded.digest(), output.digest);
    }

    #[test]
    fn test_invalid_manifest_produces_no_archive() {
        let (temp, build) = setup();
        let src = temp.path().join("src");
        write_source(&src, "package:\n  name: acme.authz\n  version: latest\n");
        let out = temp.path().join("out");

        let err = build.execute(&BuildInput::new(&src, &out)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!out.join("acme_authz.bundle.tar.gz").exists());
        assert!(!out.join(LOCKFILE_NAME).exists());
    }

    #[test]
    fn test_rebuild_is_stable() {
        let (temp, build) = setup();
        let src = temp.path().join("src");
        write_source(&src, "package:\n  name: acme.authz\n  version: 1.0.0\n");
        let out = temp.path().join("out");

        let first = build.execute(&BuildInput::new(&src, &out)).unwrap();
        let bytes = fs::read(&first.archive).unwrap();
        let second = build.execute(&BuildInput::new(&src, &out)).unwrap();

        assert_eq!(first.digest, second.digest);
        assert_eq!(fs::read(&second.archive).unwrap(), bytes);
    }
}
