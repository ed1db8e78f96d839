//! Per chat state: known members and the last beatmap shown.

use std::{collections::HashMap, sync::Arc, time::Duration};

use log::{debug, error};
use serde::{Deserialize, Serialize};
use tokio::{sync::Mutex, time};

use crate::storage::{SAVE_INTERVAL_SECS, StoreLoader};

/// Content of a [`ChatStore`], as persisted on disk.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct ChatData {
    /// Senders seen in each chat, in order of first appearance
    members: HashMap<String, Vec<String>>,
    /// Last beatmap shown in each chat
    last_beatmaps: HashMap<String, String>,
}

/// Store of chat scoped state, shared by every server.
///
/// The last beatmap of a chat is last-write-wins: concurrent writers for the
/// same chat race and the last one is kept.
#[derive(Clone)]
pub struct ChatStore {
    /// Shared store content
    data: Arc<Mutex<ChatData>>,
    /// Loader used for persistence, `None` for a memory-only store
    loader: Option<StoreLoader>,
}

impl ChatStore {
    /// Creates a store persisted to `path` and loads its previous content.
    pub async fn new(path: String) -> Self {
        let loader = StoreLoader::new(path);
        let data: ChatData = loader.load().await;

        ChatStore {
            data: Arc::new(Mutex::new(data)),
            loader: Some(loader),
        }
    }

    /// Creates an empty store which is never written to disk.
    pub fn in_memory() -> Self {
        ChatStore {
            data: Arc::new(Mutex::new(ChatData::default())),
            loader: None,
        }
    }

    /// Starts a background task saving the store every [`SAVE_INTERVAL_SECS`].
    pub fn start_persistence_task(&self) {
        let Some(loader) = self.loader.clone() else {
            return;
        };
        let data = Arc::clone(&self.data);

        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(SAVE_INTERVAL_SECS));
            loop {
                interval.tick().await;
                let snapshot = data.lock().await.clone();
                if let Err(e) = loader.persist(&snapshot).await {
                    error!("failed to persist chat store: {}", e);
                }
            }
        });
    }

    /// Records `sender_id` as a member of `chat_id`.
    pub async fn add_member(&self, chat_id: &str, sender_id: &str) {
        let mut data = self.data.lock().await;
        let members = data.members.entry(chat_id.to_owned()).or_default();

        if !members.iter().any(|member| member == sender_id) {
            debug!("new member {} in chat {}", sender_id, chat_id);
            members.push(sender_id.to_owned());
        }
    }

    /// Returns the known members of `chat_id`, in order of first appearance.
    pub async fn get_chat_members(&self, chat_id: &str) -> Vec<String> {
        self.data
            .lock()
            .await
            .members
            .get(chat_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Remembers the last beatmap shown in `chat_id`.
    pub async fn set_last_beatmap(&self, chat_id: &str, beatmap_id: &str) {
        debug!("last beatmap of chat {} is now {}", chat_id, beatmap_id);

        self.data
            .lock()
            .await
            .last_beatmaps
            .insert(chat_id.to_owned(), beatmap_id.to_owned());
    }

    /// Returns the last beatmap shown in `chat_id`.
    pub async fn get_last_beatmap(&self, chat_id: &str) -> Option<String> {
        self.data.lock().await.last_beatmaps.get(chat_id).cloned()
    }
}
