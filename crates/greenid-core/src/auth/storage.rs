//! Persisted key-value storage for session state.
//!
//! The session store reads its keys once at startup and overwrites them on
//! every setter. Backends only need to move strings around; serialization of
//! identity and permissions happens in the session store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key for the serialized identity
pub const USER_KEY: &str = "user";

/// Storage key for the serialized permission list
pub const PERMISSIONS_KEY: &str = "permissions";

/// Legacy activity timestamp key, only ever removed
pub const LAST_ACTIVITY_KEY: &str = "lastActivityTime";

/// Key-value interface over whatever persists the session between runs.
pub trait SessionStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ============================================================================
// File storage
// ============================================================================

/// All keys in one JSON object file, rewritten on every change.
pub struct FileStorage {
    data_dir: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStorage {
    /// Open (or lazily create) the session file under `data_dir`.
    ///
    /// An unparsable file is treated as an empty session; the next write
    /// replaces it.
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        let mut storage = Self {
            data_dir,
            entries: HashMap::new(),
        };

        let path = storage.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            match serde_json::from_str(&contents) {
                Ok(entries) => {
                    storage.entries = entries;
                    debug!(?path, keys = storage.entries.len(), "Session file loaded");
                }
                Err(e) => warn!(?path, error = %e, "Ignoring unparsable session file"),
            }
        }

        Ok(storage)
    }

    fn save(&self) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session file: {}", path.display()))?;
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

// ============================================================================
// Memory storage
// ============================================================================

/// In-process storage. Clones share the same map, so a clone kept aside
/// outlives the store and can seed a fresh one (a simulated restart).
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("greenid-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let mut storage = MemoryStorage::new();
        let observer = storage.clone();

        storage.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(observer.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        storage.remove(TOKEN_KEY).unwrap();
        assert_eq!(observer.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = scratch_dir("file-reopen");

        let mut storage = FileStorage::open(dir.clone()).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(PERMISSIONS_KEY, r#"["dashboard"]"#).unwrap();
        storage.remove(PERMISSIONS_KEY).unwrap();

        let reopened = FileStorage::open(dir.clone()).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get(PERMISSIONS_KEY).unwrap(), None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_storage_recovers_from_corrupt_file() {
        let dir = scratch_dir("file-corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SESSION_FILE), r#"{"token": "abc""#).unwrap();

        let mut storage = FileStorage::open(dir.clone()).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);

        // Logout path removes keys without tripping over the bad file
        storage.remove(TOKEN_KEY).unwrap();
        storage.set(TOKEN_KEY, "fresh").unwrap();
        let reopened = FileStorage::open(dir.clone()).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
