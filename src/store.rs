use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Opaque bearer token proving an authenticated session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header carrying this credential
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("credential store lock poisoned")]
    Poisoned,

    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value capability holding at most one session credential
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self) -> Result<Option<Credential>, StoreError>;

    async fn set(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Remove the credential; clearing an empty store is a no-op
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<Credential>, StoreError> {
        let slot = self.slot.read().map_err(|_| StoreError::Poisoned)?;
        Ok(slot.clone())
    }

    async fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        let mut slot = self.slot.write().map_err(|_| StoreError::Poisoned)?;
        *slot = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.slot.write().map_err(|_| StoreError::Poisoned)?;
        *slot = None;
        Ok(())
    }
}

/// On-disk layout of the credential file; only `key` is ever populated
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredEntries {
    entries: HashMap<String, StoredEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: Credential,
    saved_at: DateTime<Utc>,
}

/// JSON-file backed store holding one named entry in the config directory
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    key: String,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Store at `<config dir>/session.json` keyed by the configured entry name
    pub fn in_config_dir() -> Result<Self, StoreError> {
        let dir = get_config_dir()?;
        let key = crate::config::config().session.credential_key.clone();
        Ok(Self::new(dir.join("session.json"), key))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoredEntries, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoredEntries::default()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(StoredEntries::default());
        }
        let entries: StoredEntries = serde_json::from_str(&content)?;
        Ok(entries)
    }

    async fn save(&self, entries: &StoredEntries) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<Credential>, StoreError> {
        let entries = self.load().await?;
        Ok(entries.entries.get(&self.key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        let mut entries = match self.load().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Replacing unreadable credential file {}: {}", self.path.display(), e);
                StoredEntries::default()
            }
        };
        entries.entries.insert(
            self.key.clone(),
            StoredEntry {
                value: credential.clone(),
                saved_at: Utc::now(),
            },
        );
        self.save(&entries).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let (mut entries, reset) = match self.load().await {
            Ok(entries) => (entries, false),
            // An unreadable file cannot hold a usable credential; reset it
            Err(StoreError::Corrupt(_)) => (StoredEntries::default(), true),
            Err(e) => return Err(e),
        };
        if entries.entries.remove(&self.key).is_some() || reset {
            self.save(&entries).await?;
        }
        Ok(())
    }
}

pub fn get_config_dir() -> Result<PathBuf, StoreError> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CLIA_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| StoreError::Unavailable("HOME environment variable not set".to_string()))?;
        PathBuf::from(home).join(".config").join("clia")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}
