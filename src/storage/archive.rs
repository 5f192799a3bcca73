//! Bundle archive codec: gzip-compressed tar with `bundle.yaml` at the root
//!
//! Encoding is deterministic. Entries are written in path order with fixed
//! metadata (mode 0644, uid/gid 0, mtime 0), so identical bundles produce
//! byte-identical archives.

use std::io::{Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::config::{BundleFile, MANIFEST_FILE};
use crate::domain::{Bundle, RawSourceFile};
use crate::error::{BpmError, Result, storage};
use crate::path_utils;

/// Encode a bundle into archive bytes
pub fn encode(bundle: &Bundle) -> Result<Vec<u8>> {
    let manifest = bundle.manifest.to_yaml()?;
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    append(&mut builder, MANIFEST_FILE, manifest.as_bytes())?;
    for file in bundle.files.values() {
        append(&mut builder, &file.path, &file.content)?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| storage::operation_failed(format!("Failed to finish archive: {e}")))?;
    encoder
        .finish()
        .map_err(|e| storage::operation_failed(format!("Failed to compress archive: {e}")))
}

fn append<W: Write>(builder: &mut tar::Builder<W>, path: &str, data: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    header.set_cksum();
    builder
        .append_data(&mut header, path, data)
        .map_err(|e| storage::operation_failed(format!("Failed to add {path} to archive: {e}")))
}

/// Decode archive bytes; `origin` names the archive in error messages
pub fn decode(bytes: &[u8], origin: &str) -> Result<Bundle> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let entries = archive
        .entries()
        .map_err(|e| storage::decode_failed(origin, e.to_string()))?;

    let mut manifest = None;
    let mut files = Vec::new();

    for entry in entries {
        let mut entry = entry.map_err(|e| storage::decode_failed(origin, e.to_string()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry
            .path()
            .map_err(|e| storage::decode_failed(origin, e.to_string()))?
            .into_owned();
        if !path_utils::is_contained_relative(&path) {
            return Err(storage::decode_failed(
                origin,
                format!("entry '{}' escapes the archive root", path.display()),
            ));
        }
        let relative = normalize_entry_path(&path);

        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| storage::decode_failed(origin, e.to_string()))?;

        if relative == MANIFEST_FILE {
            let yaml = String::from_utf8_lossy(&content);
            manifest = Some(BundleFile::from_yaml(
                &yaml,
                &format!("{origin}:{MANIFEST_FILE}"),
            )?);
        } else {
            files.push(RawSourceFile::new(relative, content));
        }
    }

    let manifest = manifest.ok_or_else(|| BpmError::ManifestNotFound {
        path: origin.to_string(),
    })?;

    let mut bundle = Bundle::new(manifest);
    for file in files {
        bundle.insert(file);
    }
    Ok(bundle)
}

fn normalize_entry_path(path: &Path) -> String {
    let forward = path_utils::to_forward_slashes(path);
    forward
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/")
}
