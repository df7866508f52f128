mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::Result;

use crate::models::{Account, AccountName};

/// Store for persisting accounts between sessions.
///
/// Implementations must round-trip balance, open lots, and closed lots
/// exactly; the account document is otherwise opaque to them.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    async fn load(&self, name: &AccountName) -> Result<Option<Account>>;
    async fn save(&self, account: &Account) -> Result<()>;
    async fn list(&self) -> Result<Vec<AccountName>>;
}
