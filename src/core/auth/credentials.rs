// ─── Plaintext Credential Store ───
// Last-used Ely.by login pair, kept only to prefill the login form.
//
// WARNING: the password is written unencrypted. Everything that touches the
// stored pair goes through this type so that moving to OS secure storage
// only changes this file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::core::error::{LauncherError, LauncherResult};

pub const CREDENTIALS_FILE: &str = "user_auth.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    pub last_email: String,
    pub last_password: String,
}

#[derive(Debug, Clone)]
pub struct PlaintextCredentialStore {
    path: PathBuf,
}

impl PlaintextCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the whole file with the given pair.
    pub async fn save(&self, email: &str, password: &str) -> LauncherResult<()> {
        let stored = StoredCredentials {
            last_email: email.to_string(),
            last_password: password.to_string(),
        };
        let json = serde_json::to_string_pretty(&stored)?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| LauncherError::Io {
                path: self.path.clone(),
                source,
            })?;

        info!("[AuthManager] Credentials saved to {:?}", self.path);
        Ok(())
    }

    /// Missing or unreadable files yield empty credentials.
    pub async fn load(&self) -> StoredCredentials {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return StoredCredentials::default()
            }
            Err(e) => {
                error!("[AuthManager] Cannot read {:?}: {e}", self.path);
                return StoredCredentials::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                error!("[AuthManager] Corrupt {:?}, returning empty: {e}", self.path);
                StoredCredentials::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_or_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaintextCredentialStore::new(dir.path().join(CREDENTIALS_FILE));
        assert_eq!(store.load().await, StoredCredentials::default());

        std::fs::write(store.path(), "[1, 2").unwrap();
        assert_eq!(store.load().await, StoredCredentials::default());
    }

    #[tokio::test]
    async fn save_overwrites_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaintextCredentialStore::new(dir.path().join(CREDENTIALS_FILE));

        store.save("old@example.com", "old").await.unwrap();
        store.save("new@example.com", "hunter2").await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(r#""lastEmail": "new@example.com""#));
        assert!(raw.contains(r#""lastPassword": "hunter2""#));
        assert!(!raw.contains("old@example.com"));
    }
}
