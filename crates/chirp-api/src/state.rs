use std::sync::Arc;

use chirp_db::{AccountStore, MessageStore};

use crate::error::ApiError;
use crate::service::{AccountService, MessageService};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub accounts: AccountService,
    pub messages: MessageService,
}

impl AppStateInner {
    /// Wire both services over the given stores. A single store value may
    /// back both sides.
    pub fn new(account_store: Arc<dyn AccountStore>, message_store: Arc<dyn MessageStore>) -> Self {
        let accounts = AccountService::new(account_store);
        let messages = MessageService::new(accounts.clone(), message_store);
        Self { accounts, messages }
    }
}

/// Run synchronous service work off the async runtime.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state)).await?
}
