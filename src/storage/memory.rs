//! In-memory account store for testing.

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::models::{Account, AccountName};

use super::AccountStore;

/// In-memory store for testing purposes.
#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<AccountName, Account>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AccountStore for MemoryStore {
    async fn load(&self, name: &AccountName) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(name).cloned())
    }

    async fn save(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.lock().await;
        accounts.insert(account.name().clone(), account.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AccountName>> {
        let accounts = self.accounts.lock().await;
        let mut names: Vec<AccountName> = accounts.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
