//! Loading bundles from a source directory or an archive

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::config::lockfile::LOCKFILE_NAME;
use crate::config::{BundleFile, MANIFEST_FILE};
use crate::domain::{Bundle, RawSourceFile};
use crate::error::{BpmError, Result, storage};
use crate::path_utils;

use super::archive;

/// Extra filtering applied on top of the manifest's own `targets` and `ignore`
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Globs excluded when walking a directory
    pub ignore: Vec<String>,
}

/// Load a bundle from a directory or a `.tar.gz` archive
pub fn load(path: &Path, options: &LoadOptions) -> Result<Bundle> {
    let root = dunce::canonicalize(path).map_err(|e| {
        if e.kind() == IoErrorKind::NotFound {
            storage::not_found(path.display().to_string())
        } else {
            storage::read_failed(path.display().to_string(), e.to_string())
        }
    })?;

    if root.is_dir() {
        load_dir(&root, options)
    } else {
        let bytes = fs::read(&root)
            .map_err(|e| storage::read_failed(root.display().to_string(), e.to_string()))?;
        debug!(path = %root.display(), bytes = bytes.len(), "loading bundle archive");
        archive::decode(&bytes, &root.display().to_string())
    }
}

fn load_dir(root: &Path, options: &LoadOptions) -> Result<Bundle> {
    let manifest_path = root.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return Err(BpmError::ManifestNotFound {
            path: root.display().to_string(),
        });
    }
    let yaml = fs::read_to_string(&manifest_path)
        .map_err(|e| storage::read_failed(manifest_path.display().to_string(), e.to_string()))?;
    let manifest = BundleFile::from_yaml(&yaml, &manifest_path.display().to_string())?;
    let mut bundle = Bundle::new(manifest);

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| storage::operation_failed(e.to_string()))?;
        let relative = path_utils::to_forward_slashes(relative);

        if relative == MANIFEST_FILE || relative == LOCKFILE_NAME {
            continue;
        }
        if !bundle.manifest.includes(&relative)
            || options
                .ignore
                .iter()
                .any(|g| path_utils::matches_glob(g, &relative))
        {
            continue;
        }

        let content = fs::read(entry.path())
            .map_err(|e| storage::read_failed(entry.path().display().to_string(), e.to_string()))?;
        bundle.insert(RawSourceFile::new(relative, content));
    }

    debug!(
        path = %root.display(),
        files = bundle.files.len(),
        "loaded bundle directory"
    );
    Ok(bundle)
}
