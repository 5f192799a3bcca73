//! Error types and handling for bpm
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`storage`]: Bundle loading, archive decoding and persistence errors
//! - [`fetch`]: Remote retrieval errors
//! - [`link`]: Indexing and linking errors
//! - [`command`]: Command pipeline errors
//!
//! Every variant maps onto exactly one [`ErrorKind`], which is what the CLI
//! layer prints and tests match on.

pub mod command;
pub mod fetch;
pub mod link;
pub mod storage;

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Coarse error classification surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Decode,
    Io,
    Fetch,
    MalformedSource,
    DuplicateDeclaration,
    MissingDependency,
    CyclicDependency,
    UnresolvedDependency,
    Validation,
    DuplicateCommand,
    InvalidInputType,
    InvalidArgument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::Decode => "decode",
            ErrorKind::Io => "io",
            ErrorKind::Fetch => "fetch",
            ErrorKind::MalformedSource => "malformed-source",
            ErrorKind::DuplicateDeclaration => "duplicate-declaration",
            ErrorKind::MissingDependency => "missing-dependency",
            ErrorKind::CyclicDependency => "cyclic-dependency",
            ErrorKind::UnresolvedDependency => "unresolved-dependency",
            ErrorKind::Validation => "validation",
            ErrorKind::DuplicateCommand => "duplicate-command",
            ErrorKind::InvalidInputType => "invalid-input-type",
            ErrorKind::InvalidArgument => "invalid-argument",
        };
        f.write_str(name)
    }
}

/// A single field-level validation problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted field path, e.g. `dependencies[1].git`
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A dependency specifier that could not be resolved, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDependency {
    pub specifier: String,
    pub reason: String,
}

impl fmt::Display for UnresolvedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.specifier, self.reason)
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Main error type for bpm operations
#[derive(Error, Diagnostic, Debug, Clone)]
pub enum BpmError {
    // Storage errors
    #[error("Bundle not found: {path}")]
    #[diagnostic(
        code(bpm::storage::not_found),
        help("Check that the path exists and points to a bundle directory or .tar.gz archive")
    )]
    BundleNotFound { path: String },

    #[error("Manifest not found in bundle: {path}")]
    #[diagnostic(
        code(bpm::storage::manifest_not_found),
        help("Every bundle needs a bundle.yaml at its root")
    )]
    ManifestNotFound { path: String },

    #[error("Failed to decode archive {path}: {reason}")]
    #[diagnostic(code(bpm::storage::decode_failed))]
    ArchiveDecodeFailed { path: String, reason: String },

    #[error("Failed to parse manifest {path}: {reason}")]
    #[diagnostic(code(bpm::config::manifest_parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    #[diagnostic(code(bpm::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("{digest} is not in the store")]
    #[diagnostic(
        code(bpm::storage::entry_not_found),
        help("Run 'bpm cache list' to see stored digests")
    )]
    EntryNotFound { digest: String },

    #[error("Storage operation failed: {message}")]
    #[diagnostic(code(bpm::storage::operation_failed))]
    StorageOperationFailed { message: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(bpm::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(bpm::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(bpm::fs::io_error))]
    IoError { message: String },

    // Source / fetch errors
    #[error("Failed to parse source: {input}: {reason}")]
    #[diagnostic(
        code(bpm::source::parse_failed),
        help("Valid formats: github:owner/repo, owner/repo, https://host/repo.git, file:///path, with optional #ref")
    )]
    SourceParseFailed { input: String, reason: String },

    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(bpm::fetch::clone_failed),
        help("Check that the URL is correct and you have access to the repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to resolve git ref '{git_ref}': {reason}")]
    #[diagnostic(code(bpm::fetch::ref_resolve_failed))]
    GitRefResolveFailed { git_ref: String, reason: String },

    #[error("Failed to checkout commit '{sha}': {reason}")]
    #[diagnostic(code(bpm::fetch::checkout_failed))]
    GitCheckoutFailed { sha: String, reason: String },

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(bpm::fetch::git_failed))]
    GitOperationFailed { message: String },

    #[error("Fetch of {url} was cancelled")]
    #[diagnostic(code(bpm::fetch::cancelled))]
    FetchCancelled { url: String },

    #[error("Digest mismatch for {source_url}: expected {expected}, got {actual}")]
    #[diagnostic(
        code(bpm::fetch::digest_mismatch),
        help("The remote content changed since the digest was recorded; update the pinned digest if this is expected")
    )]
    DigestMismatch {
        source_url: String,
        expected: String,
        actual: String,
    },

    // Index / link errors
    #[error("Malformed source {path}:{line}: {reason}")]
    #[diagnostic(
        code(bpm::index::malformed_source),
        help("A policy file must start with a `package <path>` declaration")
    )]
    MalformedSource {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Package '{package}' is declared by more than one file: {}", paths.join(", "))]
    #[diagnostic(code(bpm::link::duplicate_declaration))]
    DuplicateDeclaration { package: String, paths: Vec<String> },

    #[error("Missing dependency: '{file}' imports package '{package}' which no file declares")]
    #[diagnostic(
        code(bpm::link::missing_dependency),
        help("Add the file that declares the package, or declare the bundle providing it as a dependency")
    )]
    MissingDependency { file: String, package: String },

    #[error("Cyclic dependency detected: {}", chain.join(" -> "))]
    #[diagnostic(
        code(bpm::link::cyclic_dependency),
        help("Remove one of the imports along the cycle")
    )]
    CyclicDependency { chain: Vec<String> },

    #[error("Unresolved dependencies: {}", join(failures, "; "))]
    #[diagnostic(code(bpm::deps::unresolved))]
    UnresolvedDependencies { failures: Vec<UnresolvedDependency> },

    // Validation errors
    #[error("Validation failed: {}", join(violations, "; "))]
    #[diagnostic(code(bpm::validate::failed))]
    Validation { violations: Vec<Violation> },

    // Command pipeline errors
    #[error("Command '{name}' is already registered in '{parent}'")]
    #[diagnostic(code(bpm::command::duplicate))]
    DuplicateCommand { name: String, parent: String },

    #[error("Command not found: {name}")]
    #[diagnostic(code(bpm::command::not_found))]
    CommandNotFound { name: String },

    #[error("Command '{command}' requires '{requirement}', which is not registered")]
    #[diagnostic(
        code(bpm::command::unknown_requirement),
        help("Register prerequisite commands before the commands that require them")
    )]
    UnknownRequirement {
        command: String,
        requirement: String,
    },

    #[error("Invalid input type for '{command}' command: expected {expected}, got {actual}")]
    #[diagnostic(code(bpm::command::invalid_input))]
    InvalidInputType {
        command: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid {argument} '{value}': {reason}")]
    #[diagnostic(code(bpm::command::invalid_argument))]
    InvalidArgument {
        argument: String,
        value: String,
        reason: String,
    },
}

impl BpmError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BpmError::BundleNotFound { .. }
            | BpmError::ManifestNotFound { .. }
            | BpmError::EntryNotFound { .. }
            | BpmError::CommandNotFound { .. }
            | BpmError::UnknownRequirement { .. } => ErrorKind::NotFound,
            BpmError::ArchiveDecodeFailed { .. }
            | BpmError::ManifestParseFailed { .. }
            | BpmError::ConfigParseFailed { .. }
            | BpmError::SourceParseFailed { .. } => ErrorKind::Decode,
            BpmError::StorageOperationFailed { .. }
            | BpmError::FileReadFailed { .. }
            | BpmError::FileWriteFailed { .. }
            | BpmError::IoError { .. } => ErrorKind::Io,
            BpmError::GitCloneFailed { .. }
            | BpmError::GitRefResolveFailed { .. }
            | BpmError::GitCheckoutFailed { .. }
            | BpmError::GitOperationFailed { .. }
            | BpmError::FetchCancelled { .. }
            | BpmError::DigestMismatch { .. } => ErrorKind::Fetch,
            BpmError::MalformedSource { .. } => ErrorKind::MalformedSource,
            BpmError::DuplicateDeclaration { .. } => ErrorKind::DuplicateDeclaration,
            BpmError::MissingDependency { .. } => ErrorKind::MissingDependency,
            BpmError::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            BpmError::UnresolvedDependencies { .. } => ErrorKind::UnresolvedDependency,
            BpmError::Validation { .. } => ErrorKind::Validation,
            BpmError::DuplicateCommand { .. } => ErrorKind::DuplicateCommand,
            BpmError::InvalidInputType { .. } => ErrorKind::InvalidInputType,
            BpmError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }

    /// Whether a caller may retry the operation that produced this error.
    ///
    /// Only transport failures qualify; cancellation and integrity failures
    /// would fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BpmError::GitCloneFailed { .. } | BpmError::GitOperationFailed { .. }
        )
    }
}

impl From<std::io::Error> for BpmError {
    fn from(err: std::io::Error) -> Self {
        BpmError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BpmError {
    fn from(err: serde_yaml::Error) -> Self {
        BpmError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BpmError {
    fn from(err: serde_json::Error) -> Self {
        BpmError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for BpmError {
    fn from(err: git2::Error) -> Self {
        BpmError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

impl From<walkdir::Error> for BpmError {
    fn from(err: walkdir::Error) -> Self {
        BpmError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, BpmError>;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_error_code() {
        let err = BpmError::BundleNotFound {
            path: "/tmp/x".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("bpm::storage::not_found".to_string())
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BpmError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_yaml_error_conversion() {
        let parse_result: std::result::Result<serde_yaml::Value, _> =
            serde_yaml::from_str("invalid: yaml: content: [unclosed");
        let err: BpmError = parse_result.unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_git_error_conversion() {
        let err: BpmError = git2::Error::from_str("git error").into();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(err.is_retryable());
    }

    test_error_contains!(
        test_cycle_lists_chain,
        BpmError::CyclicDependency {
            chain: vec!["a.rego".into(), "b.rego".into(), "a.rego".into()]
        },
        "a.rego -> b.rego -> a.rego"
    );

    test_error_contains!(
        test_duplicate_declaration_lists_paths,
        BpmError::DuplicateDeclaration {
            package: "authz".into(),
            paths: vec!["a.rego".into(), "b.rego".into()]
        },
        "authz",
        "a.rego, b.rego"
    );

    test_error_contains!(
        test_validation_aggregates,
        BpmError::Validation {
            violations: vec![
                Violation::new("package.name", "must not be empty"),
                Violation::new("package.version", "must not be empty"),
            ]
        },
        "package.name: must not be empty",
        "package.version: must not be empty"
    );

    test_error_contains!(
        test_unresolved_lists_each_specifier,
        BpmError::UnresolvedDependencies {
            failures: vec![
                UnresolvedDependency {
                    specifier: "common (path ../common)".into(),
                    reason: "not found".into()
                },
                UnresolvedDependency {
                    specifier: "shared (git https://example.com/shared.git)".into(),
                    reason: "network".into()
                },
            ]
        },
        "common (path ../common)",
        "shared (git https://example.com/shared.git)"
    );

    #[test]
    fn test_cancellation_is_not_retryable() {
        let err = BpmError::FetchCancelled {
            url: "https://example.com/r.git".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(!err.is_retryable());
    }
}
