use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::models::{Account, AccountName};

use super::AccountStore;

/// JSON file-based account store.
///
/// Directory structure:
/// ```text
/// data/
///   accounts/
///     {name}.json
/// ```
pub struct JsonFileStore {
    base_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn accounts_dir(&self) -> PathBuf {
        self.base_path.join("accounts")
    }

    fn account_file(&self, name: &AccountName) -> PathBuf {
        self.accounts_dir().join(format!("{name}.json"))
    }
}

#[async_trait::async_trait]
impl AccountStore for JsonFileStore {
    async fn load(&self, name: &AccountName) -> Result<Option<Account>> {
        let path = self.account_file(name);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read account file {}", path.display()))
            }
        };
        let account: Account = serde_json::from_str(&content)
            .with_context(|| format!("invalid account file {}", path.display()))?;
        Ok(Some(account))
    }

    async fn save(&self, account: &Account) -> Result<()> {
        let path = self.account_file(account.name());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("failed to create accounts directory")?;
        }
        let content =
            serde_json::to_string_pretty(account).context("failed to serialize account")?;
        // Write to a sibling temp file and rename so a crash mid-write
        // cannot truncate the account.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AccountName>> {
        let dir = self.accounts_dir();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to list {}", dir.display()))
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Skip files that could not have been written by `save`.
            if let Ok(name) = AccountName::new(stem) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
