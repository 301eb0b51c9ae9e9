//! # Password hashing and verification — Argon2id
//!
//! [`PasswordEncoder`] is the hashing capability the account service depends on:
//!
//! - [`encode`](PasswordEncoder::encode) turns a plaintext password into the string
//!   stored in the `password_hash` column.
//! - [`matches`](PasswordEncoder::matches) checks a plaintext password against a stored
//!   hash. Returns `Ok(true)` on success, `Ok(false)` on mismatch, or `Err` if the stored
//!   hash is malformed.
//!
//! [`Argon2Encoder`] implements it with the `argon2` crate: a random salt from [`OsRng`],
//! Argon2id, and a PHC-format result (e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`).
//! Verification reads the parameters back out of the PHC string, so hashes produced
//! under older cost settings keep verifying after the settings change.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{AccountError, Result};
use crate::settings::PasswordSettings;

/// Hashes and verifies passwords.
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, raw: &str) -> Result<String>;

    fn matches(&self, raw: &str, encoded: &str) -> Result<bool>;
}

/// Argon2id password encoder.
#[derive(Clone, Default)]
pub struct Argon2Encoder {
    argon2: Argon2<'static>,
}

impl Argon2Encoder {
    /// Encoder with the argon2 crate's default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder with explicit cost parameters.
    pub fn with_settings(settings: &PasswordSettings) -> Result<Self> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| AccountError::PasswordHash(format!("Invalid argon2 parameters: {}", e)))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordEncoder for Argon2Encoder {
    fn encode(&self, raw: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| AccountError::PasswordHash(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn matches(&self, raw: &str, encoded: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(encoded)
            .map_err(|e| AccountError::PasswordHash(format!("Invalid password hash: {}", e)))?;
        Ok(self
            .argon2
            .verify_password(raw.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
pub(crate) fn fast_encoder() -> Argon2Encoder {
    Argon2Encoder::with_settings(&PasswordSettings {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}
