use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::{StoreError, StoreResult};

/// Durable key-value storage for serialized sessions.
#[async_trait]
pub trait SaveStorage: Send + Sync {
    /// `None` when nothing has been saved under `key`.
    async fn load(&self, key: &str) -> StoreResult<Option<String>>;
    async fn save(&self, key: &str, data: &str) -> StoreResult<()>;
    async fn remove(&self, key: &str) -> StoreResult<()>;
}

/// One JSON file per key inside a save directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<platform data dir>/creature-waves`, or the working directory when
    /// the platform has none.
    pub fn default_dir() -> PathBuf {
        dirs_next::data_dir()
            .map(|dir| dir.join("creature-waves"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn staging_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", key))
    }
}

#[async_trait]
impl SaveStorage for FileStorage {
    async fn load(&self, key: &str) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn save(&self, key: &str, data: &str) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                key: key.to_string(),
                source,
            })?;
        // Written aside and renamed over the save so a torn write never replaces it
        let staged = self.staging_path_for(key);
        let io_error = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        tokio::fs::write(&staged, data).await.map_err(io_error)?;
        tokio::fs::rename(&staged, self.path_for(key))
            .await
            .map_err(io_error)
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Volatile storage for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one entry.
    pub fn with_entry(key: &str, data: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), data.to_string());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait]
impl SaveStorage for MemoryStorage {
    async fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, data: &str) -> StoreResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), data.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
