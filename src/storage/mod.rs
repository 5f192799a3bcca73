//! Content-addressed bundle storage
//!
//! ## Layout
//!
//! ```text
//! <storage>/
//! ├── objects/<2-hex>/<digest-hex>.tar.gz   immutable bundle archives
//! ├── refs/<key-hash>.json                  descriptor → digest index
//! └── tmp/                                  staging for atomic writes
//! ```
//!
//! A `Storage` is an explicit value created once by the caller and shared by
//! reference (or `Arc`) with the components that need it.

pub mod archive;
pub mod atomic;
pub mod load;
pub mod refs;
pub mod stats;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::domain::Bundle;
use crate::error::{BpmError, Result, fetch, storage};
use crate::hash;

pub use load::LoadOptions;
pub use refs::RefEntry;
pub use stats::{StorageStats, StoredBundle};

const OBJECTS_DIR: &str = "objects";
const REFS_DIR: &str = "refs";
const TMP_DIR: &str = "tmp";
const ARCHIVE_EXT: &str = ".tar.gz";

/// Result of storing a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub digest: String,
    pub path: PathBuf,
    /// False when an entry for the digest already existed
    pub created: bool,
}

#[derive(Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open (creating if needed) the store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self { root: root.into() };
        storage.ensure_layout()?;
        Ok(storage)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_layout(&self) -> Result<()> {
        for dir in [OBJECTS_DIR, REFS_DIR, TMP_DIR] {
            let path = self.root.join(dir);
            fs::create_dir_all(&path).map_err(|e| {
                storage::operation_failed(format!(
                    "Failed to create {}: {e}",
                    path.display()
                ))
            })?;
        }
        Ok(())
    }

    fn object_path(&self, digest: &str) -> PathBuf {
        let hex = hash::digest_hex(digest);
        self.root
            .join(OBJECTS_DIR)
            .join(&hex[..2])
            .join(format!("{hex}{ARCHIVE_EXT}"))
    }

    fn ref_path(&self, key: &str) -> PathBuf {
        let key_hash = hash::hash_bytes(key.as_bytes());
        self.root
            .join(REFS_DIR)
            .join(format!("{}.json", hash::digest_hex(&key_hash)))
    }

    /// Load a bundle from a directory or archive outside the store
    pub fn load(&self, path: &Path, options: &LoadOptions) -> Result<Bundle> {
        load::load(path, options)
    }

    /// Write `bundle` as an archive at `dest`.
    ///
    /// The write is atomic. When `dest` already holds the identical archive
    /// nothing is written.
    pub fn save(&self, bundle: &Bundle, dest: &Path) -> Result<PathBuf> {
        let bytes = archive::encode(bundle)?;
        if fs::read(dest).is_ok_and(|existing| existing == bytes) {
            debug!(path = %dest.display(), "archive unchanged, skipping write");
            return Ok(dest.to_path_buf());
        }
        let staging = dest.parent().unwrap_or_else(|| Path::new("."));
        atomic::write_atomic(dest, staging, |w| w.write_all(&bytes))?;
        info!(path = %dest.display(), bytes = bytes.len(), "saved bundle archive");
        Ok(dest.to_path_buf())
    }

    /// Store `bundle` under its digest; a no-op when the entry exists
    pub fn store(&self, bundle: &Bundle) -> Result<StorageEntry> {
        let digest = bundle.digest();
        let path = self.object_path(&digest);

        if path.is_file() {
            debug!(%digest, "storage hit");
            return Ok(StorageEntry {
                digest,
                path,
                created: false,
            });
        }

        let bytes = archive::encode(bundle)?;
        atomic::write_atomic(&path, &self.root.join(TMP_DIR), |w| w.write_all(&bytes))?;
        debug!(%digest, bytes = bytes.len(), "storage store");
        Ok(StorageEntry {
            digest,
            path,
            created: true,
        })
    }

    pub fn contains(&self, digest: &str) -> bool {
        hash::is_valid_digest(digest) && self.object_path(digest).is_file()
    }

    /// Fetch a stored bundle by digest, verifying its content
    pub fn get(&self, digest: &str) -> Result<Option<Bundle>> {
        if !self.contains(digest) {
            return Ok(None);
        }
        let path = self.object_path(digest);
        let bytes = fs::read(&path)
            .map_err(|e| storage::read_failed(path.display().to_string(), e.to_string()))?;
        let bundle = archive::decode(&bytes, &path.display().to_string())?;

        let actual = bundle.digest();
        if !hash::verify_hash(digest, &actual) {
            return Err(fetch::digest_mismatch(
                path.display().to_string(),
                digest,
                actual,
            ));
        }
        Ok(Some(bundle))
    }

    /// Look up the recorded resolution of a descriptor cache key
    pub fn lookup_ref(&self, key: &str) -> Result<Option<RefEntry>> {
        let path = self.ref_path(key);
        if !path.is_file() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| storage::read_failed(path.display().to_string(), e.to_string()))?;
        let entry = serde_json::from_str(&json).map_err(|e| BpmError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(entry))
    }

    /// Record a descriptor resolution; written atomically
    pub fn record_ref(&self, key: &str, entry: &RefEntry) -> Result<()> {
        let json = serde_json::to_vec_pretty(entry)?;
        atomic::write_atomic(&self.ref_path(key), &self.root.join(TMP_DIR), |w| {
            w.write_all(&json)
        })
    }

    fn object_files(&self) -> impl Iterator<Item = walkdir::DirEntry> {
        WalkDir::new(self.root.join(OBJECTS_DIR))
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with(ARCHIVE_EXT))
    }

    fn ref_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(REFS_DIR);
        let mut out = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                out.push(path);
            }
        }
        Ok(out)
    }

    pub fn stats(&self) -> Result<StorageStats> {
        let mut stats = StorageStats::default();
        for entry in self.object_files() {
            stats.entries += 1;
            stats.total_size += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
        stats.refs = self.ref_files()?.len();
        Ok(stats)
    }

    /// All stored bundles, sorted by package then version
    pub fn list(&self) -> Result<Vec<StoredBundle>> {
        let mut out = Vec::new();
        for entry in self.object_files() {
            let name = entry.file_name().to_string_lossy();
            let hex = name.trim_end_matches(ARCHIVE_EXT);
            let bytes = fs::read(entry.path()).map_err(|e| {
                storage::read_failed(entry.path().display().to_string(), e.to_string())
            })?;
            let bundle = archive::decode(&bytes, &entry.path().display().to_string())?;
            out.push(StoredBundle {
                digest: format!("{}{hex}", hash::HASH_PREFIX),
                package: bundle.manifest.package.name,
                version: bundle.manifest.package.version,
                size: bytes.len() as u64,
            });
        }
        out.sort_by(|a, b| {
            (a.package.as_str(), a.version.as_str(), a.digest.as_str()).cmp(&(
                b.package.as_str(),
                b.version.as_str(),
                b.digest.as_str(),
            ))
        });
        Ok(out)
    }

    /// Remove one entry and every ref pointing at it
    pub fn remove(&self, digest: &str) -> Result<bool> {
        if !self.contains(digest) {
            return Ok(false);
        }
        let path = self.object_path(digest);
        fs::remove_file(&path)
            .map_err(|e| storage::operation_failed(format!("Failed to remove {}: {e}", path.display())))?;

        for ref_path in self.ref_files()? {
            let points_here = fs::read_to_string(&ref_path)
                .ok()
                .and_then(|json| serde_json::from_str::<RefEntry>(&json).ok())
                .is_some_and(|entry| hash::verify_hash(&entry.digest, digest));
            if points_here {
                fs::remove_file(&ref_path)?;
            }
        }
        info!(%digest, "removed storage entry");
        Ok(true)
    }

    /// Remove every entry and ref; returns the number of entries removed
    pub fn clear(&self) -> Result<usize> {
        let removed = self.object_files().count();
        for dir in [OBJECTS_DIR, REFS_DIR, TMP_DIR] {
            let path = self.root.join(dir);
            if path.exists() {
                fs::remove_dir_all(&path).map_err(|e| {
                    storage::operation_failed(format!("Failed to remove {}: {e}", path.display()))
                })?;
            }
        }
        self.ensure_layout()?;
        info!(removed, "cleared storage");
        Ok(removed)
    }
}
