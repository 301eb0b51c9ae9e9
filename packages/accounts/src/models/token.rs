use serde::{Deserialize, Serialize};

/// An opaque bearer token bound to a user. `token` is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Token {
    pub user_id: i64,
    pub token: String,
}

impl Token {
    pub fn new(user_id: i64, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }
}
