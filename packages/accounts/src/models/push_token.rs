//! Device push tokens.

use serde::{Deserialize, Serialize};

/// Owner recorded for push tokens registered without an authenticated user.
pub const ANONYMOUS_USER_ID: i64 = 0;

/// A device push token and the user currently owning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct PushToken {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
}

/// Push token as submitted by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushTokenRequest {
    pub token: String,
}

impl PushTokenRequest {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}
