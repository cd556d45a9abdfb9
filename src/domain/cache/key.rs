//! Cache key derivation

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 digest of the exact text bytes, rendered as lowercase hex
///
/// Keys are case- and whitespace-sensitive: `"a"` and `"a "` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a text
    pub fn for_text(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let key = CacheKey::for_text("hello");
        assert_eq!(
            key.as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_equal_texts_share_a_key() {
        assert_eq!(CacheKey::for_text("same text"), CacheKey::for_text("same text"));
    }

    #[test]
    fn test_case_and_whitespace_sensitive() {
        let base = CacheKey::for_text("Memory");

        assert_ne!(base, CacheKey::for_text("memory"));
        assert_ne!(base, CacheKey::for_text("Memory "));
        assert_ne!(base, CacheKey::for_text(" Memory"));
    }

    #[test]
    fn test_key_is_64_hex_chars() {
        let key = CacheKey::for_text("这是一段用于测试的文本内容");

        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key.to_string(), key.as_str());
    }
}
