//! # Account service
//!
//! [`AccountService`] is the only entry point callers use. It combines an
//! [`AccountStore`], a [`PasswordEncoder`] and a [`MediaStore`]:
//!
//! | Operation | Result | Fails with |
//! |-----------|--------|------------|
//! | [`create`](AccountService::create) | [`UserInfo`] | `UserAlreadyRegistered` (store constraint) |
//! | [`register`](AccountService::register) | [`Token`] | `UserAlreadyRegistered`, `Media` |
//! | [`login`](AccountService::login) | [`Token`] | `NotFound`, `PasswordMismatch` |
//! | [`get_by_login`](AccountService::get_by_login) | `Option<UserInfo>` | — |
//! | [`get_by_token`](AccountService::get_by_token) | `Option<UserInfo>` | — |
//! | [`load_by_username`](AccountService::load_by_username) | [`Principal`] | `UserNotFound` |
//! | [`save_initial_token`](AccountService::save_initial_token) | [`Token`] | `NotFound` |
//! | [`save_push_token`](AccountService::save_push_token) | [`PushToken`] | — |
//!
//! Any operation can also fail with `Store` or `PasswordHash` when a backend
//! or the encoder does.
//!
//! Tokens are minted with [`generate_token`] on every `register` and `login`;
//! they never expire and are never revoked. `register` without an avatar stores
//! an empty avatar reference.

use crate::auth::{generate_token, PasswordEncoder};
use crate::error::{AccountError, Result, StoreError};
use crate::media::{Media, MediaStore, Upload};
use crate::models::{
    NewUser, Principal, PushToken, PushTokenRequest, Token, UserInfo, ANONYMOUS_USER_ID,
};
use crate::store::AccountStore;

pub struct AccountService<S, P, M> {
    store: S,
    passwords: P,
    media: M,
}

/// A uniqueness violation on insert means the login is already taken.
fn login_conflict(e: StoreError) -> AccountError {
    match e {
        StoreError::Conflict(_) => AccountError::UserAlreadyRegistered,
        other => AccountError::Store(other),
    }
}

impl<S, P, M> AccountService<S, P, M>
where
    S: AccountStore,
    P: PasswordEncoder,
    M: MediaStore,
{
    pub fn new(store: S, passwords: P, media: M) -> Self {
        Self {
            store,
            passwords,
            media,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a user directly, without the registration pre-check or a token.
    pub async fn create(
        &self,
        login: &str,
        password: &str,
        name: &str,
        avatar: &str,
    ) -> Result<UserInfo> {
        let user = self
            .store
            .insert_user(NewUser {
                login: login.to_string(),
                password_hash: self.passwords.encode(password)?,
                name: name.to_string(),
                avatar: avatar.to_string(),
            })
            .await
            .map_err(login_conflict)?;

        tracing::info!(user_id = user.id, "created user");
        Ok(user.to_info())
    }

    /// Register a new user, optionally storing an avatar, and issue its first token.
    pub async fn register(
        &self,
        login: &str,
        password: &str,
        name: &str,
        file: Option<&Upload>,
    ) -> Result<Token> {
        if self.store.find_user_by_login(login).await?.is_some() {
            tracing::debug!(login, "registration rejected, login taken");
            return Err(AccountError::UserAlreadyRegistered);
        }

        let password_hash = self.passwords.encode(password)?;
        let media = match file {
            Some(upload) => Some(self.media.save_avatar(upload).await?),
            None => None,
        };

        let new_user = NewUser {
            login: login.to_string(),
            password_hash,
            name: name.to_string(),
            avatar: media.as_ref().map(|m| m.id.clone()).unwrap_or_default(),
        };
        let created = self
            .store
            .create_user_with_token(new_user, &generate_token())
            .await;
        let (user, token) = match created {
            Ok(created) => created,
            Err(e) => {
                if let Some(media) = &media {
                    self.discard_avatar(media).await;
                }
                return Err(login_conflict(e));
            }
        };

        tracing::info!(user_id = user.id, "registered user");
        Ok(token)
    }

    async fn discard_avatar(&self, media: &Media) {
        if let Err(e) = self.media.remove_avatar(media).await {
            tracing::warn!(media_id = %media.id, error = %e, "failed to remove orphaned avatar");
        }
    }

    /// Check credentials and issue a fresh token.
    pub async fn login(&self, login: &str, password: &str) -> Result<Token> {
        let Some(user) = self.store.find_user_by_login(login).await? else {
            tracing::warn!(login, "login for unknown user");
            return Err(AccountError::NotFound);
        };

        if !self.passwords.matches(password, &user.password_hash)? {
            tracing::warn!(user_id = user.id, "password mismatch");
            return Err(AccountError::PasswordMismatch);
        }

        let token = Token::new(user.id, generate_token());
        self.store.save_token(&token).await?;

        tracing::info!(user_id = user.id, "issued token");
        Ok(token)
    }

    pub async fn get_by_login(&self, login: &str) -> Result<Option<UserInfo>> {
        let user = self.store.find_user_by_login(login).await?;
        Ok(user.map(|u| u.to_info()))
    }

    /// Resolve a bearer token to its owner.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<UserInfo>> {
        let user = self.store.find_user_by_token(token).await?;
        tracing::debug!(found = user.is_some(), "token lookup");
        Ok(user.map(|u| u.to_info()))
    }

    pub async fn load_by_username(&self, username: &str) -> Result<Principal> {
        self.store
            .find_user_by_login(username)
            .await?
            .map(|u| u.to_principal())
            .ok_or_else(|| AccountError::UserNotFound(username.to_string()))
    }

    /// Bind a caller-supplied token value to an existing user. The value does not
    /// go through [`generate_token`]; callers must supply an unguessable one.
    pub async fn save_initial_token(&self, user_id: i64, value: &str) -> Result<Token> {
        if self.store.find_user_by_id(user_id).await?.is_none() {
            return Err(AccountError::NotFound);
        }

        let token = Token::new(user_id, value);
        self.store.save_token(&token).await?;

        tracing::info!(user_id, "saved initial token");
        Ok(token)
    }

    /// Register a device push token for `current_user`, or for
    /// [`ANONYMOUS_USER_ID`] when nobody is authenticated. An already known
    /// token moves to the new owner.
    pub async fn save_push_token(
        &self,
        push_token: &PushTokenRequest,
        current_user: Option<i64>,
    ) -> Result<PushToken> {
        let user_id = current_user.unwrap_or(ANONYMOUS_USER_ID);
        let saved = self
            .store
            .upsert_push_token(&push_token.token, user_id)
            .await?;

        tracing::debug!(push_token_id = saved.id, user_id, "saved push token");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{fast_encoder, Argon2Encoder};
    use crate::error::MediaError;
    use crate::media::LocalMediaStore;
    use crate::models::User;
    use crate::store::{MemoryStore, PushTokenStore, TokenStore, UserStore};
    use async_trait::async_trait;

    struct FixedMedia;

    #[async_trait]
    impl MediaStore for FixedMedia {
        async fn save_avatar(&self, _upload: &Upload) -> Result<Media, MediaError> {
            Ok(Media {
                id: "avatar-1.png".to_string(),
            })
        }

        async fn remove_avatar(&self, _media: &Media) -> Result<(), MediaError> {
            Ok(())
        }
    }

    /// Store whose login lookup never finds anything, so `register` always
    /// gets past its pre-check and has to rely on the store's uniqueness.
    #[derive(Clone, Default)]
    struct BlindLoginStore(MemoryStore);

    #[async_trait]
    impl UserStore for BlindLoginStore {
        async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
            self.0.find_user_by_id(id).await
        }

        async fn find_user_by_login(&self, _login: &str) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
            self.0.insert_user(user).await
        }
    }

    #[async_trait]
    impl TokenStore for BlindLoginStore {
        async fn save_token(&self, token: &Token) -> Result<(), StoreError> {
            self.0.save_token(token).await
        }

        async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
            self.0.find_user_by_token(token).await
        }
    }

    #[async_trait]
    impl PushTokenStore for BlindLoginStore {
        async fn find_push_token(&self, token: &str) -> Result<Option<PushToken>, StoreError> {
            self.0.find_push_token(token).await
        }

        async fn upsert_push_token(
            &self,
            token: &str,
            user_id: i64,
        ) -> Result<PushToken, StoreError> {
            self.0.upsert_push_token(token, user_id).await
        }
    }

    #[async_trait]
    impl AccountStore for BlindLoginStore {
        async fn create_user_with_token(
            &self,
            user: NewUser,
            token: &str,
        ) -> Result<(User, Token), StoreError> {
            self.0.create_user_with_token(user, token).await
        }
    }

    fn service() -> AccountService<MemoryStore, Argon2Encoder, FixedMedia> {
        AccountService::new(MemoryStore::new(), fast_encoder(), FixedMedia)
    }

    #[tokio::test]
    async fn test_register_then_lookup_by_token() {
        let service = service();

        let token = service.register("alice", "pw1", "Alice", None).await.unwrap();
        assert!(token.token.len() >= 100);

        let user = service.get_by_token(&token.token).await.unwrap().unwrap();
        assert_eq!(user.id, token.user_id);
        assert_eq!(user.login, "alice");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.avatar, "");
    }

    #[tokio::test]
    async fn test_register_twice_fails() {
        let service = service();
        service.register("alice", "pw1", "Alice", None).await.unwrap();

        let err = service
            .register("alice", "other", "Other", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserAlreadyRegistered));
    }

    #[tokio::test]
    async fn test_store_uniqueness_rejects_register_past_precheck() {
        let inner = MemoryStore::new();
        let service =
            AccountService::new(BlindLoginStore(inner.clone()), fast_encoder(), FixedMedia);

        let first = service.register("alice", "pw1", "Alice", None).await.unwrap();
        let err = service
            .register("alice", "pw2", "Alice 2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserAlreadyRegistered));

        // Only the first user exists, still bound to the first token.
        let stored = inner.find_user_by_login("alice").await.unwrap().unwrap();
        assert_eq!(stored.id, first.user_id);
        assert_eq!(stored.name, "Alice");
        assert!(inner.find_user_by_id(first.user_id + 1).await.unwrap().is_none());
        let owner = inner.find_user_by_token(&first.token).await.unwrap().unwrap();
        assert_eq!(owner.id, first.user_id);
    }

    #[tokio::test]
    async fn test_lost_registration_removes_its_avatar() {
        let dir = tempfile::tempdir().unwrap();
        let service = AccountService::new(
            BlindLoginStore::default(),
            fast_encoder(),
            LocalMediaStore::new(dir.path()),
        );
        let upload = Upload {
            content_type: Some("image/png".to_string()),
            bytes: vec![1, 2, 3],
            ..Upload::default()
        };

        service
            .register("alice", "pw1", "Alice", Some(&upload))
            .await
            .unwrap();
        let err = service
            .register("alice", "pw2", "Alice 2", Some(&upload))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserAlreadyRegistered));

        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[tokio::test]
    async fn test_register_stores_avatar() {
        let service = service();
        let upload = Upload {
            content_type: Some("image/png".to_string()),
            bytes: vec![1, 2, 3],
            ..Upload::default()
        };

        let token = service
            .register("alice", "pw1", "Alice", Some(&upload))
            .await
            .unwrap();
        let user = service.get_by_token(&token.token).await.unwrap().unwrap();
        assert_eq!(user.avatar, "avatar-1.png");
    }

    #[tokio::test]
    async fn test_rejected_avatar_creates_no_user() {
        let dir = tempfile::tempdir().unwrap();
        let service = AccountService::new(
            MemoryStore::new(),
            fast_encoder(),
            LocalMediaStore::new(dir.path()),
        );
        let upload = Upload {
            content_type: Some("application/pdf".to_string()),
            bytes: vec![1],
            ..Upload::default()
        };

        let err = service
            .register("alice", "pw1", "Alice", Some(&upload))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::Media(MediaError::UnsupportedContentType(_))
        ));
        assert!(service.get_by_login("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_password_is_hashed() {
        let service = service();
        service.register("alice", "pw1", "Alice", None).await.unwrap();

        let stored = service.store().find_user_by_login("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw1");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_login_issues_fresh_tokens() {
        let service = service();
        let first = service.register("alice", "pw1", "Alice", None).await.unwrap();

        let second = service.login("alice", "pw1").await.unwrap();
        let third = service.login("alice", "pw1").await.unwrap();
        assert_ne!(first.token, second.token);
        assert_ne!(second.token, third.token);
        assert_eq!(second.user_id, first.user_id);

        // Earlier tokens stay valid.
        for token in [&first, &second, &third] {
            let user = service.get_by_token(&token.token).await.unwrap().unwrap();
            assert_eq!(user.login, "alice");
        }
    }

    #[tokio::test]
    async fn test_login_failures() {
        let service = service();
        service.register("alice", "pw1", "Alice", None).await.unwrap();

        let err = service.login("alice", "bad").await.unwrap_err();
        assert!(matches!(err, AccountError::PasswordMismatch));

        let err = service.login("nobody", "pw1").await.unwrap_err();
        assert!(matches!(err, AccountError::NotFound));
    }

    #[tokio::test]
    async fn test_alice_scenario() {
        let service = service();

        let t1 = service.register("alice", "pw1", "Alice", None).await.unwrap();
        assert_eq!(
            service.get_by_token(&t1.token).await.unwrap().unwrap().login,
            "alice"
        );

        let t2 = service.login("alice", "pw1").await.unwrap();
        assert_ne!(t1.token, t2.token);

        assert!(matches!(
            service.login("alice", "bad").await,
            Err(AccountError::PasswordMismatch)
        ));
        assert!(matches!(
            service.register("alice", "pw9", "Alice", None).await,
            Err(AccountError::UserAlreadyRegistered)
        ));
    }

    #[tokio::test]
    async fn test_get_by_token_unknown_value() {
        let service = service();
        service.register("alice", "pw1", "Alice", None).await.unwrap();
        assert!(service.get_by_token("never-issued").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_skips_precheck_but_keeps_login_unique() {
        let service = service();

        let user = service.create("bob", "pw", "Bob", "bob.jpg").await.unwrap();
        assert_eq!(user.login, "bob");
        assert_eq!(user.avatar, "bob.jpg");
        assert_eq!(service.get_by_login("bob").await.unwrap(), Some(user));

        let err = service.create("bob", "pw", "Bob", "").await.unwrap_err();
        assert!(matches!(err, AccountError::UserAlreadyRegistered));

        // A created user can log in.
        service.login("bob", "pw").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_by_login_miss() {
        assert!(service().get_by_login("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_by_username() {
        let service = service();
        let created = service.create("carol", "pw", "Carol", "").await.unwrap();

        let principal = service.load_by_username("carol").await.unwrap();
        assert_eq!(principal.id, created.id);
        assert_eq!(principal.username, "carol");
        assert!(fast_encoder().matches("pw", &principal.password_hash).unwrap());

        let err = service.load_by_username("dave").await.unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound(name) if name == "dave"));
    }

    #[tokio::test]
    async fn test_save_initial_token() {
        let service = service();
        let user = service.create("erin", "pw", "Erin", "").await.unwrap();

        let token = service.save_initial_token(user.id, "migrated-session").await.unwrap();
        assert_eq!(token, Token::new(user.id, "migrated-session"));
        assert_eq!(
            service.get_by_token("migrated-session").await.unwrap(),
            Some(user)
        );

        let err = service.save_initial_token(999, "x").await.unwrap_err();
        assert!(matches!(err, AccountError::NotFound));
        assert!(service.get_by_token("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_token_follows_latest_binding() {
        let service = service();
        let erin = service.create("erin", "pw", "Erin", "").await.unwrap();
        let frank = service.create("frank", "pw", "Frank", "").await.unwrap();

        service.save_initial_token(erin.id, "shared").await.unwrap();
        service.save_initial_token(frank.id, "shared").await.unwrap();

        let owner = service.get_by_token("shared").await.unwrap().unwrap();
        assert_eq!(owner.login, "frank");
    }

    #[tokio::test]
    async fn test_push_token_reassigned_to_latest_user() {
        let service = service();
        let request = PushTokenRequest::new("device-abc");

        let first = service.save_push_token(&request, Some(1)).await.unwrap();
        let second = service.save_push_token(&request, Some(2)).await.unwrap();
        assert_eq!(first.id, second.id);

        let stored = service
            .store()
            .find_push_token("device-abc")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_id, 2);
    }

    #[tokio::test]
    async fn test_push_token_without_user() {
        let service = service();
        let saved = service
            .save_push_token(&PushTokenRequest::new("device-xyz"), None)
            .await
            .unwrap();
        assert_eq!(saved.user_id, ANONYMOUS_USER_ID);
        assert_eq!(saved.token, "device-xyz");
    }
}
