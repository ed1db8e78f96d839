//! Response structures of the leaderboard server API.
//!
//! This module contains structures for deserializing JSON responses of
//! [`HttpRemote`](crate::servers::HttpRemote), and their conversions to the
//! structures of [`structs`](crate::servers::structs).

use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::servers::{Mode, Mods, PlayerRecord, RankedEntry, Score};

/// Deserializes an id sent either as a JSON string or a JSON number.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(de::Error::custom(format!("invalid id {}", other))),
    }
}

/// Same as [`id_string`] for optional ids.
fn optional_id_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(id) => Ok(Some(id)),
        Value::Number(id) => Ok(Some(id.to_string())),
        other => Err(de::Error::custom(format!("invalid id {}", other))),
    }
}

/// Player from `/api/v1/users`.
#[derive(Deserialize, Debug)]
pub struct UserResponse {
    /// Player id
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Player name
    pub username: String,
    /// Country code
    #[serde(default)]
    pub country: Option<String>,
    /// Statistics in the requested mode
    pub stats: StatsResponse,
}

/// Statistics of a [`UserResponse`].
#[derive(Deserialize, Debug)]
pub struct StatsResponse {
    /// Global rank, `null` or 0 when unranked
    #[serde(default)]
    pub global_rank: Option<u64>,
    /// Performance points
    #[serde(default)]
    pub pp: f64,
    /// Accuracy between 0 and 100
    #[serde(default)]
    pub accuracy: f64,
    /// Number of plays
    #[serde(default)]
    pub play_count: u64,
}

impl UserResponse {
    /// Converts the response into the record of `mode`.
    pub fn into_record(self, mode: Mode) -> PlayerRecord {
        PlayerRecord {
            player_id: self.id,
            nickname: self.username,
            mode,
            rank: self.stats.global_rank.unwrap_or(0),
            performance: self.stats.pp,
            accuracy: self.stats.accuracy,
            play_count: self.stats.play_count,
            country: self.country,
        }
    }
}

/// Beatmap of a [`ScoreResponse`].
#[derive(Deserialize, Debug)]
pub struct BeatmapResponse {
    /// Beatmap id
    #[serde(deserialize_with = "id_string")]
    pub beatmap_id: String,
    /// Artist, title and difficulty name
    pub song_name: String,
}

/// Score from `/api/v1/users/scores/*` and `/api/v1/scores/{id}`.
#[derive(Deserialize, Debug)]
pub struct ScoreResponse {
    /// Score id, missing on servers which do not expose it
    #[serde(default, deserialize_with = "optional_id_string")]
    pub id: Option<String>,
    /// Beatmap of the score
    pub beatmap: BeatmapResponse,
    /// Modifiers bitmask
    #[serde(default)]
    pub mods: u32,
    /// Accuracy between 0 and 100
    pub accuracy: f64,
    /// Performance points, `null` for unranked plays
    #[serde(default)]
    pub pp: Option<f64>,
    /// Letter grade
    pub rank: String,
    /// Maximum combo
    #[serde(default)]
    pub max_combo: u32,
}

impl From<ScoreResponse> for Score {
    fn from(response: ScoreResponse) -> Self {
        Score {
            score_id: response.id,
            beatmap_id: response.beatmap.beatmap_id,
            title: response.beatmap.song_name,
            mods: Mods(response.mods),
            accuracy: response.accuracy,
            performance: response.pp,
            grade: response.rank,
            max_combo: response.max_combo,
        }
    }
}

/// List of scores. Servers send `null` instead of an empty list.
#[derive(Deserialize, Debug)]
pub struct ScoresResponse {
    /// The scores, best or most recent first
    #[serde(default)]
    pub scores: Option<Vec<ScoreResponse>>,
}

/// Entry of a [`LeaderboardResponse`].
#[derive(Deserialize, Debug)]
pub struct LeaderboardEntryResponse {
    /// Player id
    #[serde(deserialize_with = "id_string")]
    pub user_id: String,
    /// Player name
    pub username: String,
    /// Position on the beatmap
    pub position: u64,
    /// Performance points of the play
    #[serde(default)]
    pub pp: f64,
    /// Accuracy of the play
    pub accuracy: f64,
}

impl From<LeaderboardEntryResponse> for RankedEntry {
    fn from(response: LeaderboardEntryResponse) -> Self {
        RankedEntry {
            player_id: response.user_id,
            nickname: response.username,
            rank: response.position,
            performance: response.pp,
            accuracy: response.accuracy,
        }
    }
}

/// Beatmap leaderboard from `/api/v1/leaderboard`.
#[derive(Deserialize, Debug)]
pub struct LeaderboardResponse {
    /// Entries, best first
    #[serde(default)]
    pub entries: Option<Vec<LeaderboardEntryResponse>>,
}
