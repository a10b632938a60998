//! Cryptographic utilities for opaque tokens
//!
//! Session tokens and password reset tokens share the same lifecycle: a random
//! value is generated, handed to the client exactly once, and only its SHA-256
//! digest is persisted. This module provides the three building blocks for that:
//!
//! 1. [`generate_token`] draws at least [`MIN_BYTES_PER_TOKEN`] bytes from the OS
//!    entropy source and encodes them as URL-safe base64.
//! 2. [`hash_token`] maps a raw token to the digest that is stored and looked up.
//! 3. [`constant_time_compare`] compares digests without early exit, via the
//!    `subtle` crate.
//!
//! ## Why SHA-256 instead of Argon2?
//!
//! The tokens carry 256 bits of entropy, so brute-forcing a stored digest is
//! infeasible. A slow password hash would only add latency to every request.

use std::fmt;

use base64::{Engine, prelude::BASE64_URL_SAFE};
use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// The minimum number of random bytes used for each token.
pub const MIN_BYTES_PER_TOKEN: usize = 32;

/// A raw, client-facing token.
///
/// The value only ever lives in memory: it is returned once when a session or
/// password reset is created and read back from the client afterwards. Storage
/// layers only see [`RawToken::hash`]. `Debug` output is redacted so the token
/// cannot end up in logs by accident.
#[derive(Clone)]
pub struct RawToken(String);

impl RawToken {
    /// Wrap a token received from a client (cookie, form field, ...).
    pub fn new(token: impl Into<String>) -> Self {
        RawToken(token.into())
    }

    /// Generate a new random token with `bytes_per_token` bytes of entropy.
    ///
    /// Values below [`MIN_BYTES_PER_TOKEN`] are raised to the minimum.
    pub fn generate(bytes_per_token: usize) -> Result<Self, CryptoError> {
        generate_token(bytes_per_token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// The storable digest of this token.
    pub fn hash(&self) -> String {
        hash_token(&self.0)
    }

    /// Check this token against a stored digest in constant time.
    pub fn verify_hash(&self, stored_hash: &str) -> bool {
        verify_token_hash(&self.0, stored_hash)
    }
}

impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawToken(<redacted>)")
    }
}

impl PartialEq for RawToken {
    fn eq(&self, other: &Self) -> bool {
        constant_time_compare(self.0.as_bytes(), other.0.as_bytes())
    }
}

impl Eq for RawToken {}

impl From<String> for RawToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for RawToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Generate a cryptographically secure random token.
///
/// At least [`MIN_BYTES_PER_TOKEN`] bytes are drawn from the OS random number
/// generator and encoded as URL-safe base64 (44 characters for 32 bytes).
///
/// # Errors
///
/// Returns [`CryptoError::RandomSource`] if the entropy source is unavailable.
pub fn generate_token(bytes_per_token: usize) -> Result<RawToken, CryptoError> {
    let len = bytes_per_token.max(MIN_BYTES_PER_TOKEN);
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::RandomSource(e.to_string()))?;
    Ok(RawToken(BASE64_URL_SAFE.encode(bytes)))
}

/// Hash a token for storage using SHA-256.
///
/// The digest is deterministic so it can be used for database lookups, and is
/// returned URL-safe base64 encoded.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    BASE64_URL_SAFE.encode(digest)
}

/// Verify a token against a stored digest with constant-time comparison.
pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);
    constant_time_compare(computed_hash.as_bytes(), stored_hash.as_bytes())
}

/// Perform constant-time comparison of two byte slices.
///
/// Slices of different length compare unequal immediately; the length of a
/// digest is not secret.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generated_token_has_minimum_entropy() {
        let token = generate_token(0).unwrap();
        let decoded = BASE64_URL_SAFE.decode(token.as_str()).unwrap();
        assert_eq!(decoded.len(), MIN_BYTES_PER_TOKEN);
        assert_eq!(token.as_str().len(), 44);
    }

    #[test]
    fn test_generated_token_honours_larger_sizes() {
        let token = RawToken::generate(64).unwrap();
        let decoded = BASE64_URL_SAFE.decode(token.as_str()).unwrap();
        assert_eq!(decoded.len(), 64);
    }

    #[test]
    fn test_generated_token_is_url_safe() {
        for _ in 0..32 {
            let token = generate_token(MIN_BYTES_PER_TOKEN).unwrap();
            assert!(
                token
                    .as_str()
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '='))
            );
        }
    }

    #[test]
    fn test_generated_tokens_do_not_collide() {
        let tokens: HashSet<String> = (0..1000)
            .map(|_| generate_token(MIN_BYTES_PER_TOKEN).unwrap().into_inner())
            .collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_hash_and_verify_token() {
        let token = RawToken::new("test_token_12345");
        let hash = token.hash();

        assert!(token.verify_hash(&hash));
        assert!(!RawToken::new("wrong_token").verify_hash(&hash));
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_token("test_token"), hash_token("test_token"));
        assert_ne!(hash_token("token_a"), hash_token("token_b"));
    }

    #[test]
    fn test_hash_is_base64_sha256() {
        let hash = hash_token("test_token");
        assert_eq!(hash.len(), 44);
        assert_eq!(BASE64_URL_SAFE.decode(&hash).unwrap().len(), 32);
        // The digest never contains the raw token
        assert!(!hash.contains("test_token"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = RawToken::new("super-secret-value");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret-value"));
        assert_eq!(debug, "RawToken(<redacted>)");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(constant_time_compare(b"", b""));
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"short", b"longer_string"));
    }
}
