//! Credential primitives: password hashing and token generation.

mod password;
mod token;

pub use password::{Argon2Encoder, PasswordEncoder};
pub use token::{generate_token, TOKEN_BYTES};

#[cfg(test)]
pub(crate) use password::fast_encoder;
