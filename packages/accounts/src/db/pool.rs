//! Database connection pool and embedded migrations.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::settings::Database;

/// Schema migrations embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a new connection pool for `database`.
pub async fn connect(database: &Database) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        host = %database.host,
        database = %database.database,
        max_connections = database.max_connections,
        "connecting to postgres"
    );
    PgPoolOptions::new()
        .max_connections(database.max_connections)
        .connect(&database.url())
        .await
}

/// Apply pending migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}
