//! ID and token generation.

use rand::RngCore;
use sha2::{Digest, Sha256};
use ulid::Ulid;
use uuid::Uuid;

/// Generator for row IDs and opaque tokens.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new row ID.
    ///
    /// Lowercase ULIDs sort by creation time, so "newest first" listings can
    /// paginate on the ID alone.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a session bearer token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // No time component, unlike row IDs
        Uuid::new_v4().simple().to_string()
    }

    /// Generate a one-shot secret (password reset links).
    #[must_use]
    pub fn generate_secret(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Hash a secret for storage; only the digest is ever persisted.
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}
