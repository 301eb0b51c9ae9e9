//! # Persistence ports
//!
//! The account service talks to storage through three async traits, one per table:
//!
//! | Trait | Records | Key |
//! |-------|---------|-----|
//! | [`UserStore`] | [`User`] | `id`, unique `login` |
//! | [`TokenStore`] | [`Token`] | `token` value |
//! | [`PushTokenStore`] | [`PushToken`] | unique device `token` |
//!
//! [`AccountStore`] bundles them and adds
//! [`create_user_with_token`](AccountStore::create_user_with_token), the one write
//! spanning two tables, which backends must perform atomically.
//!
//! Backends:
//!
//! - [`MemoryStore`] — process-local, every call holds a single lock.
//! - `PgStore` (feature `postgres`) — sqlx over PostgreSQL, see [`crate::db`].
//!
//! Uniqueness of `users.login` is enforced by the backend and reported as
//! [`StoreError::Conflict`](crate::error::StoreError::Conflict).

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{NewUser, PushToken, Token, User};

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    /// Insert a user, assigning its id. Fails with `Conflict` if the login is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Bind `token.token` to `token.user_id`, replacing any previous owner of that value.
    async fn save_token(&self, token: &Token) -> Result<(), StoreError>;

    /// Owner of a token value.
    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait PushTokenStore: Send + Sync {
    async fn find_push_token(&self, token: &str) -> Result<Option<PushToken>, StoreError>;

    /// Insert the push token owned by `user_id`, or move an existing one to `user_id`.
    async fn upsert_push_token(&self, token: &str, user_id: i64) -> Result<PushToken, StoreError>;
}

#[async_trait]
pub trait AccountStore: UserStore + TokenStore + PushTokenStore {
    /// Insert a user and bind `token` to it in one atomic unit. Nothing is
    /// persisted if either write fails.
    async fn create_user_with_token(
        &self,
        user: NewUser,
        token: &str,
    ) -> Result<(User, Token), StoreError>;
}
