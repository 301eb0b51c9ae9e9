//! Opaque bearer token generation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

/// Number of random bytes behind every generated token.
pub const TOKEN_BYTES: usize = 128;

/// Generate a fresh opaque token: 128 bytes from the OS CSPRNG, URL-safe base64
/// without padding (171 characters).
///
/// Panics if the operating system cannot supply entropy.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
