//! BLAKE3 hashing utilities for bundle integrity

use blake3::Hasher;

/// Hash prefix for BLAKE3 digests
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate the prefixed BLAKE3 digest of a byte slice
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{}{}", HASH_PREFIX, blake3::hash(bytes).to_hex())
}

/// Incremental digest over a sequence of length-delimited parts.
///
/// Each part is followed by a NUL separator so `("ab", "c")` and `("a", "bc")`
/// never collide.
#[derive(Default)]
pub struct DigestBuilder {
    hasher: Hasher,
}

impl DigestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(bytes);
        self.hasher.update(b"\0");
        self
    }

    pub fn finish(&self) -> String {
        format!("{}{}", HASH_PREFIX, self.hasher.finalize().to_hex())
    }
}

/// Hex portion of a digest, with or without the prefix
pub fn digest_hex(digest: &str) -> &str {
    digest.strip_prefix(HASH_PREFIX).unwrap_or(digest)
}

/// Whether `digest` looks like a full BLAKE3 digest
pub fn is_valid_digest(digest: &str) -> bool {
    let hex = digest_hex(digest);
    hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Verify a hash matches the expected value
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    digest_hex(expected).eq_ignore_ascii_case(digest_hex(actual))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_bytes() {
        let hash = hash_bytes(b"test content");
        assert!(hash.starts_with(HASH_PREFIX));
        assert!(is_valid_digest(&hash));
        assert_eq!(hash, hash_bytes(b"test content"));
    }

    #[test]
    fn test_builder_separates_parts() {
        let a = DigestBuilder::new().part(b"ab").part(b"c").finish();
        let b = DigestBuilder::new().part(b"a").part(b"bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_hash() {
        let hash1 = format!("{HASH_PREFIX}abc123");
        assert!(verify_hash(&hash1, &hash1.clone()));
        assert!(verify_hash(&hash1, "abc123"));
        assert!(!verify_hash(&hash1, &format!("{HASH_PREFIX}def456")));
    }

    #[test]
    fn test_is_valid_digest() {
        assert!(!is_valid_digest("blake3:xyz"));
        assert!(!is_valid_digest(""));
        assert!(is_valid_digest(&"a".repeat(64)));
    }
}
