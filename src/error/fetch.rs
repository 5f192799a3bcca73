//! Remote retrieval errors

use super::BpmError;

/// Creates a clone failed error
pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> BpmError {
    BpmError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a ref resolve failed error
pub fn ref_resolve_failed(git_ref: impl Into<String>, reason: impl Into<String>) -> BpmError {
    BpmError::GitRefResolveFailed {
        git_ref: git_ref.into(),
        reason: reason.into(),
    }
}

/// Creates a checkout failed error
pub fn checkout_failed(sha: impl Into<String>, reason: impl Into<String>) -> BpmError {
    BpmError::GitCheckoutFailed {
        sha: sha.into(),
        reason: reason.into(),
    }
}

pub fn cancelled(url: impl Into<String>) -> BpmError {
    BpmError::FetchCancelled { url: url.into() }
}

pub fn digest_mismatch(
    source_url: impl Into<String>,
    expected: impl Into<String>,
    actual: impl Into<String>,
) -> BpmError {
    BpmError::DigestMismatch {
        source_url: source_url.into(),
        expected: expected.into(),
        actual: actual.into(),
    }
}

/// Creates a source parse failed error
pub fn parse_failed(input: impl Into<String>, reason: impl Into<String>) -> BpmError {
    BpmError::SourceParseFailed {
        input: input.into(),
        reason: reason.into(),
    }
}
