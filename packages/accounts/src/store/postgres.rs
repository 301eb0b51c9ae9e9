//! PostgreSQL backend.
//!
//! Each trait method is one statement on a pooled connection, except
//! [`create_user_with_token`](AccountStore::create_user_with_token), which runs
//! inside an explicit transaction. Token and push-token writes are
//! `INSERT … ON CONFLICT … DO UPDATE` so a concurrent writer can never be lost.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::{AccountStore, PushTokenStore, TokenStore, UserStore};
use crate::error::StoreError;
use crate::models::{NewUser, PushToken, Token, User};

const USER_COLUMNS: &str = "id, login, password_hash, name, avatar, created_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn insert_user(conn: &mut PgConnection, user: &NewUser) -> Result<User, StoreError> {
    let user: User = sqlx::query_as(&format!(
        "INSERT INTO users (login, password_hash, name, avatar) \
         VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.login)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(&user.avatar)
    .fetch_one(&mut *conn)
    .await?;
    Ok(user)
}

async fn save_token(conn: &mut PgConnection, token: &Token) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO tokens (token, user_id) VALUES ($1, $2)
         ON CONFLICT (token) DO UPDATE SET user_id = EXCLUDED.user_id",
    )
    .bind(&token.token)
    .bind(token.user_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user: Option<User> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let user: Option<User> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE login = $1"
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_user(&mut conn, &user).await
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn save_token(&self, token: &Token) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        save_token(&mut conn, token).await
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let user: Option<User> = sqlx::query_as(
            "SELECT u.id, u.login, u.password_hash, u.name, u.avatar, u.created_at
             FROM tokens t JOIN users u ON u.id = t.user_id
             WHERE t.token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl PushTokenStore for PgStore {
    async fn find_push_token(&self, token: &str) -> Result<Option<PushToken>, StoreError> {
        let push_token: Option<PushToken> =
            sqlx::query_as("SELECT id, token, user_id FROM push_tokens WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(push_token)
    }

    async fn upsert_push_token(&self, token: &str, user_id: i64) -> Result<PushToken, StoreError> {
        let push_token: PushToken = sqlx::query_as(
            r#"
            INSERT INTO push_tokens (token, user_id)
            VALUES ($1, $2)
            ON CONFLICT (token)
            DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, token, user_id
            "#,
        )
        .bind(token)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(push_token)
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_user_with_token(
        &self,
        user: NewUser,
        token: &str,
    ) -> Result<(User, Token), StoreError> {
        let mut tx = self.pool.begin().await?;

        let user = insert_user(&mut tx, &user).await?;
        let token = Token::new(user.id, token);
        save_token(&mut tx, &token).await?;

        tx.commit().await?;
        Ok((user, token))
    }
}
