use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{AccountStore, PushTokenStore, TokenStore, UserStore};
use crate::error::StoreError;
use crate::models::{NewUser, PushToken, Token, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<i64, User>,
    logins: HashMap<String, i64>,
    tokens: HashMap<String, i64>,
    push_tokens: HashMap<String, PushToken>,
    next_user_id: i64,
    next_push_token_id: i64,
}

impl Tables {
    fn insert_user(&mut self, user: NewUser) -> Result<User, StoreError> {
        if self.logins.contains_key(&user.login) {
            return Err(StoreError::Conflict("users_login_key".to_string()));
        }
        self.next_user_id += 1;
        let user = User {
            id: self.next_user_id,
            login: user.login,
            password_hash: user.password_hash,
            name: user.name,
            avatar: user.avatar,
            created_at: Utc::now(),
        };
        self.logins.insert(user.login.clone(), user.id);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn save_token(&mut self, token: &Token) -> Result<(), StoreError> {
        if !self.users.contains_key(&token.user_id) {
            return Err(StoreError::Backend(format!(
                "token owner {} does not exist",
                token.user_id
            )));
        }
        self.tokens.insert(token.token.clone(), token.user_id);
        Ok(())
    }
}

/// In-memory AccountStore for tests and single-process embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .logins
            .get(login)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.tables.lock().await.insert_user(user)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn save_token(&self, token: &Token) -> Result<(), StoreError> {
        self.tables.lock().await.save_token(token)
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tokens
            .get(token)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }
}

#[async_trait]
impl PushTokenStore for MemoryStore {
    async fn find_push_token(&self, token: &str) -> Result<Option<PushToken>, StoreError> {
        Ok(self.tables.lock().await.push_tokens.get(token).cloned())
    }

    async fn upsert_push_token(&self, token: &str, user_id: i64) -> Result<PushToken, StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.push_tokens.get_mut(token) {
            existing.user_id = user_id;
            return Ok(existing.clone());
        }
        tables.next_push_token_id += 1;
        let push_token = PushToken {
            id: tables.next_push_token_id,
            token: token.to_string(),
            user_id,
        };
        tables
            .push_tokens
            .insert(push_token.token.clone(), push_token.clone());
        Ok(push_token)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_user_with_token(
        &self,
        user: NewUser,
        token: &str,
    ) -> Result<(User, Token), StoreError> {
        let mut tables = self.tables.lock().await;
        // Token write cannot fail once the user exists.
        let user = tables.insert_user(user)?;
        let token = Token::new(user.id, token);
        tables.save_token(&token)?;
        Ok((user, token))
    }
}
