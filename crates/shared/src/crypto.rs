//! Cryptographic utilities for API token generation and hashing.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a new API token for a profile.
///
/// Devices present this token when they register themselves, so it must be
/// unguessable. Only its hash is persisted.
pub fn generate_api_token() -> String {
    Uuid::new_v4().to_string()
}

/// Hash under which an API token is stored and looked up.
pub fn hash_api_token(token: &str) -> String {
    sha256_hex(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_empty_string() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_generate_api_token_is_uuid_v4() {
        let token = generate_api_token();
        let parsed = Uuid::parse_str(&token).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_generate_api_token_unique() {
        assert_ne!(generate_api_token(), generate_api_token());
    }

    #[test]
    fn test_hash_api_token_deterministic() {
        let token = generate_api_token();
        assert_eq!(hash_api_token(&token), hash_api_token(&token));
        assert_ne!(hash_api_token(&token), token);
    }
}
