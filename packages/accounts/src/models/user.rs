//! # User model
//!
//! Three representations of an account:
//!
//! ## [`User`]
//!
//! The complete row of the `users` table, including the Argon2 `password_hash`.
//! It derives [`sqlx::FromRow`] when the `postgres` feature is enabled so it can
//! be loaded directly from queries. It never leaves the crate's service layer.
//!
//! ## [`UserInfo`]
//!
//! The caller-facing projection returned by `create`, `get_by_login` and
//! `get_by_token`. It omits the password hash and timestamps. An empty
//! `avatar` means the user has no avatar.
//!
//! ## [`Principal`]
//!
//! What an authentication framework needs to authenticate a login: the
//! identifier, the username and the stored hash. Produced by
//! `load_by_username`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full user record from the store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub name: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Convert to UserInfo for the caller.
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            login: self.login.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }

    /// Convert to the form consumed by an authentication framework.
    pub fn to_principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.login.clone(),
            password_hash: self.password_hash.clone(),
        }
    }
}

/// A user that has not been persisted yet. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
    pub name: String,
    pub avatar: String,
}

/// User information safe to hand to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: i64,
    pub login: String,
    pub name: String,
    pub avatar: String,
}

impl UserInfo {
    /// The avatar reference, if the user has one.
    pub fn avatar(&self) -> Option<&str> {
        Some(self.avatar.as_str()).filter(|a| !a.is_empty())
    }
}

/// Authenticatable identity for a login.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}
