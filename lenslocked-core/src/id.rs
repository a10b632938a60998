//! Prefixed identifiers
//!
//! Every record gets an id of the form `{prefix}_{random}` where the random
//! part is 12 bytes (96 bits) from the OS entropy source, base64 URL-safe
//! encoded without padding. Prefixes in use: `usr`, `ses`, `gal`, `pwr`.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

use crate::error::CryptoError;

const ID_ENTROPY_BYTES: usize = 12;

/// Generate a prefixed id with 96 bits of entropy.
pub fn generate_prefixed_id(prefix: &str) -> Result<String, CryptoError> {
    let mut bytes = [0u8; ID_ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::RandomSource(e.to_string()))?;

    let encoded = BASE64_URL_SAFE_NO_PAD.encode(bytes);
    Ok(format!("{prefix}_{encoded}"))
}

/// Check that `id` is `{expected_prefix}_` followed by at least 96 bits of
/// base64 URL-safe data.
pub fn validate_prefixed_id(id: &str, expected_prefix: &str) -> bool {
    let Some(random_part) = id
        .strip_prefix(expected_prefix)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };

    match BASE64_URL_SAFE_NO_PAD.decode(random_part) {
        Ok(decoded) => decoded.len() >= ID_ENTROPY_BYTES,
        Err(_) => false,
    }
}

/// Declare an opaque, prefixed identifier type.
///
/// The generated type wraps a `String`, generates new values with
/// [`generate_prefixed_id`] and checks them with [`validate_prefixed_id`].
macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new(id: &str) -> Self {
                $name(id.to_string())
            }

            pub fn new_random() -> Result<Self, $crate::error::CryptoError> {
                $crate::id::generate_prefixed_id($prefix).map($name)
            }

            pub fn into_inner(self) -> String {
                self.0
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Validate that this id has the expected prefix and entropy
            pub fn is_valid(&self) -> bool {
                $crate::id::validate_prefixed_id(&self.0, $prefix)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use prefixed_id;
