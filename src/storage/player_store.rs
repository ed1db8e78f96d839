//! Per server store of linked accounts and cached player records.

use std::{collections::HashMap, sync::Arc, time::Duration};

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use tokio::{sync::Mutex, time};

use crate::{
    servers::{Mode, PlayerRecord},
    storage::{LocalAccount, SAVE_INTERVAL_SECS, StoreLoader},
};

/// Content of a [`PlayerStore`], as persisted on disk.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct PlayerData {
    /// Linked accounts indexed by chat sender id
    accounts: HashMap<String, LocalAccount>,
    /// Last known records indexed by [`record_key`]
    records: HashMap<String, PlayerRecord>,
}

/// Key of a record in [`PlayerData::records`].
fn record_key(player_id: &str, mode: Mode) -> String {
    format!("{}:{}", player_id, mode.index())
}

/// Local store of one server.
///
/// Holds the links between chat senders and server players, and the last
/// record fetched for each player and mode. Records may be stale; they are
/// refreshed whenever a profile is requested.
///
/// Cloning the store gives another handle on the same data. Writes are
/// visible to every handle as soon as the write method returns.
#[derive(Clone)]
pub struct PlayerStore {
    /// Shared store content
    data: Arc<Mutex<PlayerData>>,
    /// Loader used for persistence, `None` for a memory-only store
    loader: Option<StoreLoader>,
}

impl PlayerStore {
    /// Creates a store persisted to `path` and loads its previous content.
    pub async fn new(path: String) -> Self {
        let loader = StoreLoader::new(path);
        let data: PlayerData = loader.load().await;

        info!(
            "loaded {} linked accounts and {} records",
            data.accounts.len(),
            data.records.len()
        );

        PlayerStore {
            data: Arc::new(Mutex::new(data)),
            loader: Some(loader),
        }
    }

    /// Creates an empty store which is never written to disk.
    pub fn in_memory() -> Self {
        PlayerStore {
            data: Arc::new(Mutex::new(PlayerData::default())),
            loader: None,
        }
    }

    /// Starts a background task saving the store every [`SAVE_INTERVAL_SECS`].
    ///
    /// Does nothing for a memory-only store.
    pub fn start_persistence_task(&self) {
        let Some(loader) = self.loader.clone() else {
            return;
        };
        let data = Arc::clone(&self.data);

        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(SAVE_INTERVAL_SECS));
            loop {
                interval.tick().await;
                // Held during the write so it cannot overwrite a newer account write
                let snapshot = data.lock().await;
                if let Err(e) = loader.persist(&*snapshot).await {
                    error!("failed to persist player store: {}", e);
                }
            }
        });
    }

    /// Returns the account linked to `sender_id`.
    pub async fn get_account(&self, sender_id: &str) -> Option<LocalAccount> {
        self.data.lock().await.accounts.get(sender_id).cloned()
    }

    /// Links `sender_id` to a server player, replacing any previous link.
    ///
    /// The store is written to disk before returning. Nothing changes when the
    /// write fails.
    pub async fn set_account(
        &self,
        sender_id: &str,
        remote_id: &str,
        nickname: &str,
        mode: Option<Mode>,
    ) -> Result<(), anyhow::Error> {
        let account = LocalAccount {
            remote_id: remote_id.to_owned(),
            nickname: nickname.to_owned(),
            mode,
        };

        self.update(|data| {
            data.accounts.insert(sender_id.to_owned(), account);
            Some(())
        })
        .await?;

        info!("linked {} to player {} ({})", sender_id, nickname, remote_id);

        Ok(())
    }

    /// Sets the default mode of the account linked to `sender_id`.
    ///
    /// Returns `false` without writing anything when no account is linked.
    pub async fn set_mode(&self, sender_id: &str, mode: Mode) -> Result<bool, anyhow::Error> {
        let updated = self
            .update(|data| {
                let account = data.accounts.get_mut(sender_id)?;
                account.mode = Some(mode);
                Some(())
            })
            .await?;

        if updated.is_some() {
            info!("default mode of {} set to {}", sender_id, mode);
        }

        Ok(updated.is_some())
    }

    /// Removes the account linked to `sender_id`.
    ///
    /// Returns `false` when no account was linked.
    pub async fn remove_account(&self, sender_id: &str) -> Result<bool, anyhow::Error> {
        let removed = self.update(|data| data.accounts.remove(sender_id)).await?;

        if removed.is_some() {
            info!("unlinked account of {}", sender_id);
        }

        Ok(removed.is_some())
    }

    /// Applies `change` to a copy of the store, writes the copy to disk, then
    /// makes it the store content.
    ///
    /// The lock is held during the write, so concurrent writers land on disk
    /// in the same order as in memory. `change` returning `None` means there
    /// is nothing to write.
    ///
    /// # Errors
    ///
    /// Returns the write error, the store content is then left untouched.
    async fn update<R>(
        &self,
        change: impl FnOnce(&mut PlayerData) -> Option<R>,
    ) -> Result<Option<R>, anyhow::Error> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let Some(result) = change(&mut next) else {
            return Ok(None);
        };

        self.persist(&next).await?;
        *data = next;

        Ok(Some(result))
    }

    /// Finds the sender linked to the server player `remote_id`.
    pub async fn find_by_remote_id(&self, remote_id: &str) -> Option<(String, LocalAccount)> {
        self.data
            .lock()
            .await
            .accounts
            .iter()
            .find(|(_, account)| account.remote_id == remote_id)
            .map(|(sender_id, account)| (sender_id.clone(), account.clone()))
    }

    /// Returns the last known record of `player_id` in `mode`.
    pub async fn get_record(&self, player_id: &str, mode: Mode) -> Option<PlayerRecord> {
        self.data
            .lock()
            .await
            .records
            .get(&record_key(player_id, mode))
            .cloned()
    }

    /// Caches a freshly fetched record.
    ///
    /// Records are only persisted by the periodic task.
    pub async fn put_record(&self, record: PlayerRecord) {
        debug!("caching record {}", record);

        self.data
            .lock()
            .await
            .records
            .insert(record_key(&record.player_id, record.mode), record);
    }

    /// Writes a snapshot to disk when the store is persisted.
    async fn persist(&self, snapshot: &PlayerData) -> Result<(), anyhow::Error> {
        match &self.loader {
            Some(loader) => loader.persist(snapshot).await,
            None => Ok(()),
        }
    }
}
