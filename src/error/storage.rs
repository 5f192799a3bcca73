//! Storage and file system errors

use super::BpmError;

/// Creates a bundle not found error
pub fn not_found(path: impl Into<String>) -> BpmError {
    BpmError::BundleNotFound { path: path.into() }
}

/// Creates a missing store entry error
pub fn entry_not_found(digest: impl Into<String>) -> BpmError {
    BpmError::EntryNotFound {
        digest: digest.into(),
    }
}

/// Creates an archive decode failed error
pub fn decode_failed(path: impl Into<String>, reason: impl Into<String>) -> BpmError {
    BpmError::ArchiveDecodeFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> BpmError {
    BpmError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> BpmError {
    BpmError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a storage operation failed error
pub fn operation_failed(message: impl Into<String>) -> BpmError {
    BpmError::StorageOperationFailed {
        message: message.into(),
    }
}
