use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chirp_types::models::{Account, Message, NewAccount, NewMessageRow};

use crate::store::{AccountStore, MessageStore};
use crate::{Result, StoreError};

/// In-process store with the same semantics as [`crate::Database`]:
/// ids start at 1 and are never reused, usernames are unique.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    accounts: BTreeMap<i64, Account>,
    messages: BTreeMap<i64, Message>,
    last_account_id: i64,
    last_message_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl AccountStore for MemoryStore {
    fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let inner = self.lock()?;
        Ok(inner
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    fn find_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>> {
        let inner = self.lock()?;
        Ok(inner
            .accounts
            .values()
            .find(|a| a.username == username && a.password == password)
            .cloned())
    }

    fn exists_by_id(&self, account_id: i64) -> Result<bool> {
        Ok(self.lock()?.accounts.contains_key(&account_id))
    }

    fn find_by_id(&self, account_id: i64) -> Result<Option<Account>> {
        Ok(self.lock()?.accounts.get(&account_id).cloned())
    }

    fn save(&self, account: &NewAccount) -> Result<Account> {
        let mut inner = self.lock()?;

        // Same guarantee as the UNIQUE column in SQLite.
        if inner.accounts.values().any(|a| a.username == account.username) {
            return Err(StoreError::DuplicateUsername(account.username.clone()));
        }

        inner.last_account_id += 1;
        let stored = Account {
            account_id: inner.last_account_id,
            username: account.username.clone(),
            password: account.password.clone(),
        };
        inner.accounts.insert(stored.account_id, stored.clone());
        Ok(stored)
    }
}

impl MessageStore for MemoryStore {
    fn find_by_id(&self, message_id: i64) -> Result<Option<Message>> {
        Ok(self.lock()?.messages.get(&message_id).cloned())
    }

    fn find_by_posted_by(&self, account_id: i64) -> Result<Vec<Message>> {
        let inner = self.lock()?;
        Ok(inner
            .messages
            .values()
            .filter(|m| m.posted_by == account_id)
            .cloned()
            .collect())
    }

    fn find_all(&self) -> Result<Vec<Message>> {
        Ok(self.lock()?.messages.values().cloned().collect())
    }

    fn save(&self, message: &NewMessageRow) -> Result<Message> {
        let mut inner = self.lock()?;
        inner.last_message_id += 1;
        let stored = Message {
            message_id: inner.last_message_id,
            posted_by: message.posted_by,
            message_text: message.message_text.clone(),
            time_posted_epoch: message.time_posted_epoch,
        };
        inner.messages.insert(stored.message_id, stored.clone());
        Ok(stored)
    }

    fn delete(&self, message_id: i64) -> Result<bool> {
        Ok(self.lock()?.messages.remove(&message_id).is_some())
    }

    fn update_text(&self, message_id: i64, message_text: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        let Some(message) = inner.messages.get_mut(&message_id) else {
            return Ok(false);
        };
        message.message_text = message_text.to_string();
        Ok(true)
    }
}
