//! Bundle domain type

use std::collections::BTreeMap;

use crate::config::BundleFile;
use crate::hash::DigestBuilder;

use super::RawSourceFile;

/// A manifest together with its source files, keyed by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub manifest: BundleFile,
    pub files: BTreeMap<String, RawSourceFile>,
}

impl Bundle {
    pub fn new(manifest: BundleFile) -> Self {
        Self {
            manifest,
            files: BTreeMap::new(),
        }
    }

    /// Add a file, replacing any file at the same path
    pub fn insert(&mut self, file: RawSourceFile) {
        self.files.insert(file.path.clone(), file);
    }

    pub fn name(&self) -> &str {
        &self.manifest.package.name
    }

    /// Content digest over the canonical manifest encoding and every file in
    /// path order. Identical content always yields the identical digest.
    pub fn digest(&self) -> String {
        let manifest = self
            .manifest
            .to_yaml()
            .unwrap_or_else(|_| format!("{:?}", self.manifest));

        let mut builder = DigestBuilder::new();
        builder.part(manifest.as_bytes());
        for file in self.files.values() {
            builder.part(file.path.as_bytes()).part(&file.content);
        }
        builder.finish()
    }

    /// Sum of source file sizes in bytes
    pub fn content_size(&self) -> u64 {
        self.files.values().map(|f| f.content.len() as u64).sum()
    }
}
