use serde::{Deserialize, Serialize};

// -- Accounts --

/// Body of `/register` and `/login`. Fields are optional so a missing
/// username can be told apart from an empty one; any `accountId` sent by the
/// client is accepted and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl AccountCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            account_id: None,
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}

// -- Messages --

/// Body of `POST /messages`. The store assigns the id, so any `messageId`
/// in the request is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub posted_by: Option<i64>,
    #[serde(default)]
    pub message_text: Option<String>,
    #[serde(default, alias = "messageTimeEpoch")]
    pub time_posted_epoch: Option<i64>,
}

impl NewMessage {
    pub fn new(posted_by: i64, message_text: impl Into<String>, time_posted_epoch: i64) -> Self {
        Self {
            message_id: None,
            posted_by: Some(posted_by),
            message_text: Some(message_text.into()),
            time_posted_epoch: Some(time_posted_epoch),
        }
    }
}

/// Body of `PATCH /messages/{message_id}`. Only `messageText` is read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTextUpdate {
    #[serde(default)]
    pub message_text: Option<String>,
}
