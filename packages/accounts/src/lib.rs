//! # Accounts crate — credential issuance and lookup
//!
//! Account creation, login, opaque bearer tokens and device push-token registration
//! for the application backend. The web layer in front of it maps requests onto
//! [`AccountService`] calls and [`AccountError`] variants onto responses.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | — | Argon2id password encoder and the CSPRNG token generator |
//! | [`db`] | `postgres` | PostgreSQL connection pool and embedded migrations |
//! | [`error`] | — | [`AccountError`], [`StoreError`], [`MediaError`] |
//! | [`media`] | — | Avatar storage capability and its local-directory implementation |
//! | [`models`] | — | `User` records and their caller-safe projections, tokens, push tokens |
//! | [`service`] | — | [`AccountService`], the single entry point |
//! | [`settings`] | — | Layered configuration (defaults, `accounts.toml`, `ACCOUNTS_*` env) |
//! | [`store`] | — | Persistence traits, the in-memory backend and (with `postgres`) `PgStore` |
//!
//! ## Example
//!
//! ```no_run
//! use accounts::{AccountService, Argon2Encoder, LocalMediaStore, MemoryStore};
//!
//! # async fn run() -> Result<(), accounts::AccountError> {
//! let service = AccountService::new(
//!     MemoryStore::new(),
//!     Argon2Encoder::new(),
//!     LocalMediaStore::new("uploads/avatars"),
//! );
//! let token = service.register("alice", "pw1", "Alice", None).await?;
//! let me = service.get_by_token(&token.token).await?;
//! assert_eq!(me.map(|u| u.login).as_deref(), Some("alice"));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod media;
pub mod models;
pub mod service;
pub mod settings;
pub mod store;

pub use auth::{generate_token, Argon2Encoder, PasswordEncoder};
pub use error::{AccountError, MediaError, StoreError};
pub use media::{LocalMediaStore, Media, MediaStore, Upload};
pub use models::{Principal, PushToken, PushTokenRequest, Token, UserInfo};
pub use service::AccountService;
pub use settings::Settings;
pub use store::{AccountStore, MemoryStore};

#[cfg(feature = "postgres")]
pub use store::PgStore;
