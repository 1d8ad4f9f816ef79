//! Validation rules layered over the stores.
//!
//! Services are synchronous and hold no state besides their store handles;
//! handlers call them from the blocking pool. Rejections are returned as
//! values (`None`, `false`, [`RegistrationError`]); only store faults travel
//! as errors.

use std::sync::Arc;

use tracing::{debug, warn};

use chirp_db::{AccountStore, MessageStore, StoreError};
use chirp_types::api::{AccountCredentials, NewMessage};
use chirp_types::models::{
    Account, MIN_USERNAME_LEN, Message, NewAccount, NewMessageRow, is_valid_message_text,
    is_valid_username,
};

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("username must be at least {} characters", MIN_USERNAME_LEN)]
    InvalidUsername,

    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// -- Accounts --

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Register a new account if the username is long enough and not taken.
    ///
    /// The duplicate pre-check and the write are separate store calls, so a
    /// concurrent registration can slip between them; the store's own
    /// uniqueness guard catches that case and it is reported the same way.
    pub fn register_account(
        &self,
        candidate: &AccountCredentials,
    ) -> Result<Account, RegistrationError> {
        let username = candidate
            .username
            .as_deref()
            .filter(|u| is_valid_username(u))
            .ok_or(RegistrationError::InvalidUsername)?;

        if self.store.find_by_username(username)?.is_some() {
            debug!("Registration rejected, username '{}' taken", username);
            return Err(RegistrationError::DuplicateUsername(username.to_string()));
        }

        let new_account = NewAccount {
            username: username.to_string(),
            password: candidate.password.clone().unwrap_or_default(),
        };

        match self.store.save(&new_account) {
            Ok(account) => Ok(account),
            Err(StoreError::DuplicateUsername(name)) => {
                warn!("Concurrent registration for '{}' rejected by store", name);
                Err(RegistrationError::DuplicateUsername(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Plaintext, case-sensitive match of both username and password.
    pub fn login(&self, credentials: &AccountCredentials) -> Result<Option<Account>, StoreError> {
        let (Some(username), Some(password)) = (&credentials.username, &credentials.password)
        else {
            return Ok(None);
        };

        self.store.find_by_username_and_password(username, password)
    }

    pub fn account_exists(&self, account_id: i64) -> Result<bool, StoreError> {
        self.store.exists_by_id(account_id)
    }
}

// -- Messages --

#[derive(Clone)]
pub struct MessageService {
    accounts: AccountService,
    store: Arc<dyn MessageStore>,
}

impl MessageService {
    pub fn new(accounts: AccountService, store: Arc<dyn MessageStore>) -> Self {
        Self { accounts, store }
    }

    /// Checks, in order: text non-empty, text within the length limit,
    /// author exists. Any failed check yields `None`.
    pub fn create_message(&self, candidate: &NewMessage) -> Result<Option<Message>, StoreError> {
        let Some(text) = candidate
            .message_text
            .as_deref()
            .filter(|t| is_valid_message_text(t))
        else {
            debug!("Message rejected, text empty or too long");
            return Ok(None);
        };

        let Some(posted_by) = candidate.posted_by else {
            debug!("Message rejected, no author");
            return Ok(None);
        };

        if !self.accounts.account_exists(posted_by)? {
            debug!("Message rejected, account {} does not exist", posted_by);
            return Ok(None);
        }

        let row = NewMessageRow {
            posted_by,
            message_text: text.to_string(),
            time_posted_epoch: candidate.time_posted_epoch.unwrap_or_default(),
        };

        self.store.save(&row).map(Some)
    }

    pub fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        self.store.find_all()
    }

    pub fn get_message(&self, message_id: i64) -> Result<Option<Message>, StoreError> {
        self.store.find_by_id(message_id)
    }

    /// `true` only if a stored row was actually removed.
    pub fn delete_message(&self, message_id: i64) -> Result<bool, StoreError> {
        self.store.delete(message_id)
    }

    pub fn update_message_text(
        &self,
        message_id: i64,
        new_text: Option<&str>,
    ) -> Result<bool, StoreError> {
        let Some(text) = new_text.filter(|t| is_valid_message_text(t)) else {
            debug!("Update of message {} rejected, text empty or too long", message_id);
            return Ok(false);
        };

        // Existence is decided by the write itself, so a row deleted by a
        // concurrent request is reported as not updated.
        self.store.update_text(message_id, text)
    }

    pub fn list_messages_by_account(&self, account_id: i64) -> Result<Vec<Message>, StoreError> {
        self.store.find_by_posted_by(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chirp_db::{Database, MemoryStore};
    use chirp_types::models::MAX_MESSAGE_LEN;

    fn memory_services() -> (AccountService, MessageService) {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        let messages = MessageService::new(accounts.clone(), store);
        (accounts, messages)
    }

    fn sqlite_services() -> (AccountService, MessageService) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let accounts = AccountService::new(db.clone());
        let messages = MessageService::new(accounts.clone(), db);
        (accounts, messages)
    }

    fn both() -> Vec<(AccountService, MessageService)> {
        vec![memory_services(), sqlite_services()]
    }

    /// Hides existing usernames from the pre-check, as if another request
    /// registered the same name between the check and the write.
    struct RacingStore(MemoryStore);

    impl AccountStore for RacingStore {
        fn find_by_username(&self, _username: &str) -> chirp_db::Result<Option<Account>> {
            Ok(None)
        }

        fn find_by_username_and_password(
            &self,
            username: &str,
            password: &str,
        ) -> chirp_db::Result<Option<Account>> {
            self.0.find_by_username_and_password(username, password)
        }

        fn exists_by_id(&self, account_id: i64) -> chirp_db::Result<bool> {
            self.0.exists_by_id(account_id)
        }

        fn find_by_id(&self, account_id: i64) -> chirp_db::Result<Option<Account>> {
            AccountStore::find_by_id(&self.0, account_id)
        }

        fn save(&self, account: &NewAccount) -> chirp_db::Result<Account> {
            AccountStore::save(&self.0, account)
        }
    }

    /// Reads return a message that another request has since deleted.
    struct StaleReadStore {
        inner: MemoryStore,
        stale: Message,
    }

    impl MessageStore for StaleReadStore {
        fn find_by_id(&self, _message_id: i64) -> chirp_db::Result<Option<Message>> {
            Ok(Some(self.stale.clone()))
        }

        fn find_by_posted_by(&self, account_id: i64) -> chirp_db::Result<Vec<Message>> {
            self.inner.find_by_posted_by(account_id)
        }

        fn find_all(&self) -> chirp_db::Result<Vec<Message>> {
            self.inner.find_all()
        }

        fn save(&self, message: &NewMessageRow) -> chirp_db::Result<Message> {
            MessageStore::save(&self.inner, message)
        }

        fn delete(&self, message_id: i64) -> chirp_db::Result<bool> {
            self.inner.delete(message_id)
        }

        fn update_text(&self, message_id: i64, message_text: &str) -> chirp_db::Result<bool> {
            self.inner.update_text(message_id, message_text)
        }
    }

    #[test]
    fn test_register_valid_account() {
        for (accounts, _) in both() {
            let account = accounts
                .register_account(&AccountCredentials::new("alice1", "pw123"))
                .unwrap();
            assert!(account.account_id > 0);
            assert_eq!(account.username, "alice1");
            assert_eq!(account.password, "pw123");
        }
    }

    #[test]
    fn test_register_short_or_missing_username() {
        for (accounts, _) in both() {
            for name in ["", "a", "abc"] {
                let err = accounts
                    .register_account(&AccountCredentials::new(name, "pw123"))
                    .unwrap_err();
                assert!(matches!(err, RegistrationError::InvalidUsername), "{name:?}");
            }

            let missing = AccountCredentials {
                password: Some("pw123".into()),
                ..Default::default()
            };
            assert!(matches!(
                accounts.register_account(&missing),
                Err(RegistrationError::InvalidUsername)
            ));
        }
    }

    #[test]
    fn test_register_duplicate_regardless_of_password() {
        for (accounts, _) in both() {
            accounts
                .register_account(&AccountCredentials::new("alice1", "pw123"))
                .unwrap();
            let err = accounts
                .register_account(&AccountCredentials::new("alice1", "different"))
                .unwrap_err();
            assert!(matches!(err, RegistrationError::DuplicateUsername(n) if n == "alice1"));
        }
    }

    #[test]
    fn test_register_duplicate_caught_by_store() {
        let accounts = AccountService::new(Arc::new(RacingStore(MemoryStore::new())));
        accounts
            .register_account(&AccountCredentials::new("alice1", "pw123"))
            .unwrap();
        let err = accounts
            .register_account(&AccountCredentials::new("alice1", "pw123"))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateUsername(_)));
    }

    #[test]
    fn test_login() {
        for (accounts, _) in both() {
            let stored = accounts
                .register_account(&AccountCredentials::new("alice1", "pw123"))
                .unwrap();

            let found = accounts
                .login(&AccountCredentials::new("alice1", "pw123"))
                .unwrap();
            assert_eq!(found, Some(stored));

            for (user, pass) in [("alice1", "wrong"), ("alice1", "PW123"), ("Alice1", "pw123")] {
                assert!(accounts.login(&AccountCredentials::new(user, pass)).unwrap().is_none());
            }

            let no_password = AccountCredentials {
                username: Some("alice1".into()),
                ..Default::default()
            };
            assert!(accounts.login(&no_password).unwrap().is_none());
        }
    }

    #[test]
    fn test_create_message_validation() {
        for (accounts, messages) in both() {
            let author = accounts
                .register_account(&AccountCredentials::new("alice1", "pw123"))
                .unwrap();
            let id = author.account_id;

            assert!(messages.create_message(&NewMessage::new(id, "", 1)).unwrap().is_none());
            let too_long = "x".repeat(MAX_MESSAGE_LEN + 1);
            assert!(messages.create_message(&NewMessage::new(id, too_long, 1)).unwrap().is_none());
            assert!(messages.create_message(&NewMessage::new(id + 100, "hi", 1)).unwrap().is_none());

            let no_text = NewMessage {
                posted_by: Some(id),
                ..Default::default()
            };
            assert!(messages.create_message(&no_text).unwrap().is_none());
            assert!(messages.list_messages().unwrap().is_empty());
        }
    }

    #[test]
    fn test_create_message_round_trips() {
        for (accounts, messages) in both() {
            let author = accounts
                .register_account(&AccountCredentials::new("alice1", "pw123"))
                .unwrap();

            let max_len = "x".repeat(MAX_MESSAGE_LEN);
            let created = messages
                .create_message(&NewMessage::new(author.account_id, max_len.clone(), 1669947792))
                .unwrap()
                .unwrap();
            assert_eq!(created.posted_by, author.account_id);
            assert_eq!(created.message_text, max_len);
            assert_eq!(created.time_posted_epoch, 1669947792);

            let fetched = messages.get_message(created.message_id).unwrap();
            assert_eq!(fetched, Some(created));
        }
    }

    #[test]
    fn test_update_message_text() {
        for (accounts, messages) in both() {
            let author = accounts
                .register_account(&AccountCredentials::new("alice1", "pw123"))
                .unwrap();
            let created = messages
                .create_message(&NewMessage::new(author.account_id, "before", 5))
                .unwrap()
                .unwrap();

            assert!(!messages.update_message_text(created.message_id + 1, Some("after")).unwrap());
            assert_eq!(messages.list_messages().unwrap().len(), 1);

            assert!(!messages.update_message_text(created.message_id, Some("")).unwrap());
            assert!(!messages.update_message_text(created.message_id, None).unwrap());
            let too_long = "x".repeat(MAX_MESSAGE_LEN + 1);
            assert!(!messages.update_message_text(created.message_id, Some(&too_long)).unwrap());

            assert!(messages.update_message_text(created.message_id, Some("after")).unwrap());
            let updated = messages.get_message(created.message_id).unwrap().unwrap();
            assert_eq!(updated.message_text, "after");
            assert_eq!(updated.message_id, created.message_id);
            assert_eq!(updated.posted_by, created.posted_by);
            assert_eq!(updated.time_posted_epoch, created.time_posted_epoch);
        }
    }

    #[test]
    fn test_delete_message() {
        for (accounts, messages) in both() {
            let author = accounts
                .register_account(&AccountCredentials::new("alice1", "pw123"))
                .unwrap();
            let created = messages
                .create_message(&NewMessage::new(author.account_id, "bye", 5))
                .unwrap()
                .unwrap();

            assert!(messages.delete_message(created.message_id).unwrap());
            assert!(messages.get_message(created.message_id).unwrap().is_none());
            assert!(!messages.delete_message(created.message_id).unwrap());
        }
    }

    #[test]
    fn test_list_messages_by_account() {
        for (accounts, messages) in both() {
            let alice = accounts
                .register_account(&AccountCredentials::new("alice1", "pw123"))
                .unwrap();
            let bob = accounts
                .register_account(&AccountCredentials::new("bobby", "pw123"))
                .unwrap();
            let carol = accounts
                .register_account(&AccountCredentials::new("carol", "pw123"))
                .unwrap();

            let mut alice_ids = Vec::new();
            for (author, text) in [(&alice, "a1"), (&bob, "b1"), (&alice, "a2")] {
                let m = messages
                    .create_message(&NewMessage::new(author.account_id, text, 1))
                    .unwrap()
                    .unwrap();
                if author.account_id == alice.account_id {
                    alice_ids.push(m.message_id);
                }
            }

            let listed = messages.list_messages_by_account(alice.account_id).unwrap();
            assert_eq!(
                listed.iter().map(|m| m.message_id).collect::<Vec<_>>(),
                alice_ids
            );
            assert!(listed.iter().all(|m| m.posted_by == alice.account_id));
            assert_eq!(messages.list_messages_by_account(bob.account_id).unwrap().len(), 1);
            assert!(messages.list_messages_by_account(carol.account_id).unwrap().is_empty());
            assert!(messages.list_messages_by_account(12345).unwrap().is_empty());
            assert_eq!(messages.list_messages().unwrap().len(), 3);
        }
    }

    #[test]
    fn test_update_and_delete_of_vanished_message_fail() {
        let inner = MemoryStore::new();
        let author = AccountStore::save(
            &inner,
            &NewAccount {
                username: "alice1".into(),
                password: "pw123".into(),
            },
        )
        .unwrap();
        let stale = MessageStore::save(
            &inner,
            &NewMessageRow {
                posted_by: author.account_id,
                message_text: "gone soon".into(),
                time_posted_epoch: 1,
            },
        )
        .unwrap();
        assert!(inner.delete(stale.message_id).unwrap());

        let store = Arc::new(StaleReadStore {
            inner,
            stale: stale.clone(),
        });
        let accounts = AccountService::new(Arc::new(MemoryStore::new()));
        let messages = MessageService::new(accounts, store.clone());

        assert!(!messages.update_message_text(stale.message_id, Some("edited")).unwrap());
        assert!(!messages.delete_message(stale.message_id).unwrap());
        assert!(store.find_all().unwrap().is_empty());
    }
}
