//! Data models for accounts, tokens and push tokens.

mod push_token;
mod token;
mod user;

pub use push_token::{PushToken, PushTokenRequest, ANONYMOUS_USER_ID};
pub use token::Token;
pub use user::{NewUser, Principal, User, UserInfo};
