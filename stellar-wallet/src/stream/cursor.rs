//! Persisted paging tokens

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Last handled paging token per account, stored as a JSON object
#[derive(Debug)]
pub struct CursorStore {
    path: PathBuf,
    cursors: BTreeMap<String, String>,
}

impl CursorStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let cursors = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                Error::Storage(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&contents).map_err(|e| {
                Error::Serialization(format!("Invalid cursor file {}: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, cursors })
    }

    /// File backing the store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last paging token saved for `account`
    pub fn get(&self, account: &str) -> Option<&str> {
        self.cursors.get(account).map(String::as_str)
    }

    /// Save the paging token for `account` and write the file
    pub fn set(&mut self, account: &str, token: &str) -> Result<()> {
        self.cursors.insert(account.to_string(), token.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let contents = serde_json::to_string_pretty(&self.cursors)
            .map_err(|e| Error::Serialization(format!("Failed to encode cursors: {}", e)))?;
        fs::write(&self.path, contents).map_err(|e| {
            Error::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        debug!(account, token, path = %self.path.display(), "Saved paging token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::open(dir.path().join("cursors.json")).unwrap();
        assert_eq!(store.get("GABC"), None);
    }

    #[test]
    fn test_tokens_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("cursors.json");

        let mut store = CursorStore::open(&path).unwrap();
        store.set("GABC", "100").unwrap();
        store.set("GABC", "101").unwrap();
        store.set("GDEF", "7").unwrap();

        let reopened = CursorStore::open(&path).unwrap();
        assert_eq!(reopened.get("GABC"), Some("101"));
        assert_eq!(reopened.get("GDEF"), Some("7"));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursors.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(CursorStore::open(&path), Err(Error::Serialization(_))));
    }
}
