//! Local storage of the bot.
//!
//! - [`PlayerStore`]: one per server, links chat senders to server players
//!   and caches player records
//! - [`ChatStore`]: shared by every server, tracks chat members and the last
//!   beatmap shown in each chat
//! - [`StoreLoader`]: JSON persistence used by both stores
//!
//! Stores keep their content in memory behind a mutex and are saved to disk
//! periodically. Account writes are also saved immediately, so a confirmation
//! is only sent once the link is on disk.

mod chat_store;
mod player_store;
mod store_loader;

use serde::{Deserialize, Serialize};

pub use crate::storage::{chat_store::ChatStore, player_store::PlayerStore, store_loader::StoreLoader};
use crate::servers::Mode;

/// Interval in seconds between automatic store persistence operations.
const SAVE_INTERVAL_SECS: u64 = 60;

/// Link between a chat sender and a server player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    /// Server specific player id
    pub remote_id: String,
    /// Display name of the player when the link was made
    pub nickname: String,
    /// Default mode of the sender, if set
    pub mode: Option<Mode>,
}
