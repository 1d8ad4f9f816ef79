//! Storage interfaces consumed by the service layer.
//!
//! [`crate::Database`] implements both traits over SQLite and
//! [`crate::MemoryStore`] implements them over in-process maps, so services
//! can be exercised without a database file.

use chirp_types::models::{Account, Message, NewAccount, NewMessageRow};

use crate::Result;

pub trait AccountStore: Send + Sync {
    fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Exact, case-sensitive match on both fields.
    fn find_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>>;

    fn exists_by_id(&self, account_id: i64) -> Result<bool>;

    fn find_by_id(&self, account_id: i64) -> Result<Option<Account>>;

    /// Persist a new account and return it with its assigned id.
    /// Fails with [`crate::StoreError::DuplicateUsername`] if the username is taken.
    fn save(&self, account: &NewAccount) -> Result<Account>;
}

pub trait MessageStore: Send + Sync {
    fn find_by_id(&self, message_id: i64) -> Result<Option<Message>>;

    /// Messages authored by `account_id`, oldest id first.
    fn find_by_posted_by(&self, account_id: i64) -> Result<Vec<Message>>;

    /// Every message, oldest id first.
    fn find_all(&self) -> Result<Vec<Message>>;

    fn save(&self, message: &NewMessageRow) -> Result<Message>;

    /// Returns `false` if no message had that id.
    fn delete(&self, message_id: i64) -> Result<bool>;

    /// Replace the text of one message, leaving every other column untouched.
    /// Returns `false` if no message had that id.
    fn update_text(&self, message_id: i64, message_text: &str) -> Result<bool>;
}
