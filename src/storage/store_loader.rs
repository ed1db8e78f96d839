//! Persistence layer for the local stores.
//!
//! This module provides the [`StoreLoader`] which loads and saves a store
//! snapshot as a JSON file between bot restarts.

use std::sync::Arc;

use log::{debug, error, warn};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, sync::Mutex};

/// Loads and persists one store snapshot to disk.
///
/// Loading never fails: a missing or corrupted file gives the default
/// snapshot, so the bot can always start.
///
/// Clones share the same write lock.
#[derive(Clone, Debug)]
pub struct StoreLoader {
    /// Path to the JSON file
    path: String,
    /// Held while a snapshot is written
    write_lock: Arc<Mutex<()>>,
}

impl StoreLoader {
    /// Creates a new `StoreLoader` for the specified file path.
    pub fn new(path: String) -> Self {
        StoreLoader {
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Loads the snapshot from disk.
    ///
    /// - If the file doesn't exist: logs a warning and returns the default snapshot
    /// - If deserialization fails: logs an error and returns the default snapshot
    pub async fn load<T: DeserializeOwned + Default>(&self) -> T {
        let Ok(serialized) = fs::read_to_string(&self.path).await else {
            warn!("no persisted data found in {}, starting empty", self.path);
            return T::default();
        };

        let Ok(snapshot) = serde_json::from_str(&serialized) else {
            error!("failed to deserialize {}, starting empty", self.path);
            return T::default();
        };

        debug!("loaded persisted data from {}", self.path);

        snapshot
    }

    /// Writes the snapshot to disk.
    ///
    /// The snapshot goes to a temporary file renamed over the previous one, so
    /// the file always holds a complete snapshot. Writes are done one at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or the file cannot
    /// be written.
    pub async fn persist<T: Serialize>(&self, snapshot: &T) -> Result<(), anyhow::Error> {
        let serialized = serde_json::to_string(snapshot)?;
        let temp_path = format!("{}.tmp", self.path);

        let _guard = self.write_lock.lock().await;
        fs::write(&temp_path, serialized).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!("persisted data to {}", self.path);

        Ok(())
    }
}
