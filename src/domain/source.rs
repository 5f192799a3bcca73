//! Source file stages

use std::collections::BTreeMap;
use std::borrow::Cow;

/// A source file as loaded from a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSourceFile {
    /// Bundle-relative path with forward slashes
    pub path: String,
    pub content: Vec<u8>,
}

impl RawSourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Content as text; invalid UTF-8 is replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// A source file with its package declaration and imports extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSourceFile {
    pub raw: RawSourceFile,
    /// Declared package path, e.g. `acme.authz`
    pub package: String,
    /// Referenced package paths, sorted and deduplicated
    pub imports: Vec<String>,
}

impl IndexedSourceFile {
    pub fn path(&self) -> &str {
        &self.raw.path
    }
}

/// A source file whose imports are all bound to files of the link set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedSourceFile {
    pub file: IndexedSourceFile,
    /// Import → path of the file declaring the matching package
    pub dependencies: BTreeMap<String, String>,
}
