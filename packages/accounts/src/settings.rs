//! # Layered settings
//!
//! [`Settings::new`] builds the configuration from three sources, later ones winning:
//!
//! 1. built-in defaults,
//! 2. an optional `accounts.toml` in the working directory,
//! 3. environment variables prefixed with `ACCOUNTS_`, using `__` between nested keys
//!    (e.g. `ACCOUNTS_DATABASE__HOST=db`, `ACCOUNTS_PASSWORD__MEMORY_KIB=65536`).
//!
//! A `.env` file is loaded into the environment first, if present.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
}

impl Database {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

impl Default for Database {
    fn default() -> Self {
        Self {
            user: "accounts".into(),
            password: "password".into(),
            host: "localhost".into(),
            port: 5432,
            database: "accounts".into(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Directory avatars are written to.
    pub upload_dir: PathBuf,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads/avatars"),
        }
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    pub database: Database,
    pub media: MediaSettings,
    pub password: PasswordSettings,
    pub log: Log,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_file("accounts.toml")
    }

    /// Build settings reading `path` (if it exists) instead of `accounts.toml`.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let config = Config::builder()
            .set_default("database.user", defaults.database.user)?
            .set_default("database.password", defaults.database.password)?
            .set_default("database.host", defaults.database.host)?
            .set_default("database.port", i64::from(defaults.database.port))?
            .set_default("database.database", defaults.database.database)?
            .set_default(
                "database.max_connections",
                i64::from(defaults.database.max_connections),
            )?
            .set_default(
                "media.upload_dir",
                defaults.media.upload_dir.to_string_lossy().into_owned(),
            )?
            .set_default("password.memory_kib", i64::from(defaults.password.memory_kib))?
            .set_default("password.iterations", i64::from(defaults.password.iterations))?
            .set_default("password.parallelism", i64::from(defaults.password.parallelism))?
            .set_default("log.filter", defaults.log.filter)?
            .add_source(File::with_name(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("ACCOUNTS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
