//! Data structures shared by every leaderboard server.
//!
//! These are the normalized shapes the bot works with, independent of the
//! JSON returned by a particular server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Game mode of a rhythm game server.
///
/// Servers number their modes from 0 to 3, the bot keeps the same numbering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Mode 0, the default one
    #[default]
    Standard,
    /// Mode 1
    Taiko,
    /// Mode 2, also known as catch the beat
    Fruits,
    /// Mode 3
    Mania,
}

impl Mode {
    /// Every mode, in index order.
    pub const ALL: [Mode; 4] = [Mode::Standard, Mode::Taiko, Mode::Fruits, Mode::Mania];

    /// Returns the mode for a server index, `None` outside of `[0, 3]`.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Returns the server index of the mode.
    pub fn index(self) -> u8 {
        match self {
            Mode::Standard => 0,
            Mode::Taiko => 1,
            Mode::Fruits => 2,
            Mode::Mania => 3,
        }
    }

    /// Parses a mode indicator typed by a user.
    ///
    /// Accepts the mode names and their usual synonyms (case-insensitive) and
    /// the integer literals `0` to `3`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scorebot::servers::Mode;
    /// assert_eq!(Mode::from_token("TAIKO"), Some(Mode::Taiko));
    /// assert_eq!(Mode::from_token("3"), Some(Mode::Mania));
    /// assert_eq!(Mode::from_token("4"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        if let Ok(index) = token.parse::<u8>() {
            return Self::from_index(index);
        }

        match token.to_lowercase().as_str() {
            "standard" | "std" | "osu" | "s" => Some(Mode::Standard),
            "taiko" | "drums" | "t" => Some(Mode::Taiko),
            "fruits" | "fruit" | "ctb" | "catch" | "c" | "f" => Some(Mode::Fruits),
            "mania" | "keys" | "m" => Some(Mode::Mania),
            _ => None,
        }
    }

    /// Canonical lowercase name, used in follow-up commands.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Taiko => "taiko",
            Mode::Fruits => "fruits",
            Mode::Mania => "mania",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Two letter abbreviations and their bits, in display order.
///
/// `NC` and `PF` carry the bit of the modifier they extend.
const MOD_TABLE: [(&str, u32); 15] = [
    ("NF", 1),
    ("EZ", 1 << 1),
    ("TD", 1 << 2),
    ("HD", 1 << 3),
    ("HR", 1 << 4),
    ("SD", 1 << 5),
    ("DT", 1 << 6),
    ("RX", 1 << 7),
    ("HT", 1 << 8),
    ("NC", (1 << 9) | (1 << 6)),
    ("FL", 1 << 10),
    ("AT", 1 << 11),
    ("SO", 1 << 12),
    ("AP", 1 << 13),
    ("PF", (1 << 14) | (1 << 5)),
];

/// Score modifiers combined into a bitmask.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mods(pub u32);

impl Mods {
    /// No modifier at all.
    pub const NONE: Mods = Mods(0);

    /// Parses one modifier token such as `+HDDT`.
    ///
    /// The token must start with `+` and contain only known letter pairs,
    /// case-insensitive. Returns `None` otherwise.
    pub fn from_token(token: &str) -> Option<Self> {
        let letters = token.strip_prefix('+')?.to_uppercase();
        if letters.is_empty() || letters.len() % 2 != 0 || !letters.is_ascii() {
            return None;
        }

        let mut bits = 0;
        for pair in letters.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair).ok()?;
            let (_, bit) = MOD_TABLE.iter().find(|(name, _)| *name == pair)?;
            bits |= bit;
        }

        Some(Mods(bits))
    }

    /// Combines every token of the list, ignoring the invalid ones.
    pub fn from_tokens(tokens: &[String]) -> Self {
        tokens
            .iter()
            .filter_map(|token| Self::from_token(token))
            .fold(Mods::NONE, |acc, mods| Mods(acc.0 | mods.0))
    }

    /// Returns `true` when no modifier is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Mods {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NM");
        }

        let mut shown = 0;
        let names: Vec<&str> = MOD_TABLE
            .iter()
            .rev()
            .filter(|(_, bit)| {
                if self.0 & bit == *bit && shown & bit != *bit {
                    shown |= bit;
                    true
                } else {
                    false
                }
            })
            .map(|(name, _)| *name)
            .collect();

        // Collected from the end of the table so NC and PF hide DT and SD
        write!(f, "{}", names.into_iter().rev().collect::<String>())
    }
}

/// Identifier form used to query a server about a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserQuery {
    /// Lookup by display name
    Name(String),
    /// Lookup by server specific player id
    Id(String),
}

impl fmt::Display for UserQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UserQuery::Name(name) => write!(f, "name={}", name),
            UserQuery::Id(id) => write!(f, "id={}", id),
        }
    }
}

/// Statistics of a player in one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Server specific player id
    pub player_id: String,
    /// Display name on the server
    pub nickname: String,
    /// Mode of the statistics
    pub mode: Mode,
    /// Global rank, lower is better, 0 when unranked
    pub rank: u64,
    /// Performance points
    pub performance: f64,
    /// Accuracy between 0 and 100
    pub accuracy: f64,
    /// Number of plays
    pub play_count: u64,
    /// Country code, if the server exposes it
    pub country: Option<String>,
}

impl fmt::Display for PlayerRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id={}, nickname={}, mode={}, rank={}, pp={}",
            self.player_id, self.nickname, self.mode, self.rank, self.performance
        )
    }
}

/// A single play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Score id, absent on servers which do not expose it
    pub score_id: Option<String>,
    /// Beatmap the score was set on
    pub beatmap_id: String,
    /// Human readable beatmap title
    pub title: String,
    /// Modifiers of the play
    pub mods: Mods,
    /// Accuracy between 0 and 100
    pub accuracy: f64,
    /// Performance points, absent for unranked plays
    pub performance: Option<f64>,
    /// Letter grade such as `S` or `A`
    pub grade: String,
    /// Maximum combo reached
    pub max_combo: u32,
}

/// One row of a leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    /// Server specific player id
    pub player_id: String,
    /// Display name on the server
    pub nickname: String,
    /// Position, lower is better
    pub rank: u64,
    /// Performance points
    pub performance: f64,
    /// Accuracy between 0 and 100
    pub accuracy: f64,
}

impl From<&PlayerRecord> for RankedEntry {
    fn from(record: &PlayerRecord) -> Self {
        RankedEntry {
            player_id: record.player_id.clone(),
            nickname: record.nickname.clone(),
            rank: record.rank,
            performance: record.performance,
            accuracy: record.accuracy,
        }
    }
}
