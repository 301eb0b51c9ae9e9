//! # Database module — PostgreSQL connection pool and migrations
//!
//! Gated behind the `postgres` feature so that embedders using the in-memory
//! store never pull in SQLx.
//!
//! - [`connect`] opens a pool sized by [`Database::max_connections`](crate::settings::Database).
//! - [`migrate`] applies the embedded `migrations/` directory.

#[cfg(feature = "postgres")]
mod pool;

#[cfg(feature = "postgres")]
pub use pool::{connect, migrate, MIGRATOR};
