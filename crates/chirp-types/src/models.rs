use serde::{Deserialize, Serialize};

/// Shortest username accepted at registration, in characters.
pub const MIN_USERNAME_LEN: usize = 4;

/// Longest message text accepted, in characters.
pub const MAX_MESSAGE_LEN: usize = 255;

/// A registered account. Passwords are stored and compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: i64,
    pub username: String,
    pub password: String,
}

/// A stored text post. `posted_by` is the author's `account_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: i64,
    pub posted_by: i64,
    pub message_text: String,
    #[serde(alias = "messageTimeEpoch")]
    pub time_posted_epoch: i64,
}

/// Account fields before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
}

/// Message fields before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessageRow {
    pub posted_by: i64,
    pub message_text: String,
    pub time_posted_epoch: i64,
}

/// True when `text` is non-empty and at most [`MAX_MESSAGE_LEN`] characters.
pub fn is_valid_message_text(text: &str) -> bool {
    !text.is_empty() && text.chars().count() <= MAX_MESSAGE_LEN
}

/// True when `username` has at least [`MIN_USERNAME_LEN`] characters.
pub fn is_valid_username(username: &str) -> bool {
    username.chars().count() >= MIN_USERNAME_LEN
}
