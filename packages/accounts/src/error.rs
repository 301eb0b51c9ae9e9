//! Error types returned by the account service and its backends.

use thiserror::Error;

/// Failure of an account operation. Every variant is terminal for the
/// current call; mapping to user-facing responses is left to the caller.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("user already registered")]
    UserAlreadyRegistered,

    #[error("not found")]
    NotFound,

    #[error("password does not match")]
    PasswordMismatch,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure reported by an [`AccountStore`](crate::store::AccountStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.constraint().unwrap_or("unique").to_string())
            }
            _ => Self::Backend(e.to_string()),
        }
    }
}

/// Failure reported by a [`MediaStore`](crate::media::MediaStore).
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("empty upload")]
    Empty,

    #[error("media i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = AccountError> = std::result::Result<T, E>;
