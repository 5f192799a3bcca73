//! Indexing and linking errors

use super::BpmError;

pub fn malformed(path: impl Into<String>, line: usize, reason: impl Into<String>) -> BpmError {
    BpmError::MalformedSource {
        path: path.into(),
        line,
        reason: reason.into(),
    }
}

/// Paths are reported in lexicographic order regardless of input order
pub fn duplicate(package: impl Into<String>, mut paths: Vec<String>) -> BpmError {
    paths.sort();
    paths.dedup();
    BpmError::DuplicateDeclaration {
        package: package.into(),
        paths,
    }
}

pub fn missing(file: impl Into<String>, package: impl Into<String>) -> BpmError {
    BpmError::MissingDependency {
        file: file.into(),
        package: package.into(),
    }
}

pub fn cycle(chain: Vec<String>) -> BpmError {
    BpmError::CyclicDependency { chain }
}
