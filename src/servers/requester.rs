//! HTTP client for leaderboard server APIs.
//!
//! This module provides the [`Remote`] trait, the interface every server
//! accessor implements, and [`HttpRemote`], a JSON client for servers exposing
//! the `/api/v1` endpoints described below.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use log::{debug, info};
use mockall::automock;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::servers::{
    Capabilities, Mode, Mods, PlayerRecord, RankedEntry, Score, UserQuery,
    response_structs::{LeaderboardResponse, ScoreResponse, ScoresResponse, UserResponse},
};

/// Errors returned by a [`Remote`].
#[derive(Debug)]
pub enum RemoteError {
    /// The server has no matching player, score or beatmap
    NotFound,
    /// The server does not support the operation, or not with this query form
    Unsupported(&'static str),
    /// Network, status or decoding error
    Http(reqwest::Error),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RemoteError::NotFound => write!(f, "not found"),
            RemoteError::Unsupported(operation) => write!(f, "unsupported operation: {}", operation),
            RemoteError::Http(e) => write!(f, "http error: {}", e),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.status() == Some(StatusCode::NOT_FOUND) {
            RemoteError::NotFound
        } else {
            RemoteError::Http(error)
        }
    }
}

/// Operations a leaderboard server may offer.
///
/// Which operations, and with which [`UserQuery`] form, is described by the
/// [`Capabilities`] of the server module. Callers check the capabilities
/// before calling; an implementation may answer
/// [`RemoteError::Unsupported`] otherwise.
#[automock]
#[async_trait]
pub trait Remote: Send + Sync {
    /// Fetches the statistics of a player in `mode`.
    async fn get_user(&self, query: &UserQuery, mode: Mode) -> Result<PlayerRecord, RemoteError>;
    /// Fetches the best plays of a player, best first.
    async fn get_top(
        &self,
        query: &UserQuery,
        mode: Mode,
        limit: usize,
    ) -> Result<Vec<Score>, RemoteError>;
    /// Fetches the recent plays of a player, most recent first.
    async fn get_recent(&self, query: &UserQuery, mode: Mode) -> Result<Vec<Score>, RemoteError>;
    /// Fetches one score by its id.
    async fn get_score(&self, score_id: &str, mode: Mode) -> Result<Score, RemoteError>;
    /// Fetches the leaderboard of a beatmap restricted to `players`.
    async fn get_leaderboard(
        &self,
        beatmap_id: &str,
        players: &[String],
        mode: Mode,
        mods: Option<Mods>,
    ) -> Result<Vec<RankedEntry>, RemoteError>;
}

/// JSON client for one leaderboard server.
///
/// # Examples
///
/// ```no_run
/// # use scorebot::servers::{Capabilities, HttpRemote, Mode, Remote, UserQuery};
/// # async fn example() -> Result<(), anyhow::Error> {
/// let remote = HttpRemote::new("https://scores.example.com", None, Capabilities::default(), 10)?;
/// let record = remote.get_user(&UserQuery::Name("Alice".to_owned()), Mode::Standard).await?;
/// println!("{}", record);
/// # Ok(())
/// # }
/// ```
pub struct HttpRemote {
    /// Server url, without trailing slash
    url: String,
    /// Key sent in the `X-Api-Key` header, if the server requires one
    api_key: Option<String>,
    /// Operations the server supports
    capabilities: Capabilities,
    /// HTTP client
    client: Client,
}

impl HttpRemote {
    /// Creates a new [`HttpRemote`].
    ///
    /// # Arguments
    ///
    /// * `url` - Base url of the server
    /// * `api_key` - Optional API key
    /// * `capabilities` - Operations the server supports
    /// * `timeout` - Request timeout in seconds
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        url: &str,
        api_key: Option<String>,
        capabilities: Capabilities,
        timeout: u64,
    ) -> Result<Self, anyhow::Error> {
        let client = Client::builder().timeout(Duration::from_secs(timeout)).build()?;

        Ok(HttpRemote {
            url: url.trim_end_matches('/').to_owned(),
            api_key,
            capabilities,
            client,
        })
    }

    /// Sends a GET request to `path` and decodes the JSON body.
    ///
    /// A 404 status is mapped to [`RemoteError::NotFound`].
    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let url = format!("{}{}", &self.url, path);
        debug!("request {} {:?}", &url, query);

        let mut request = self.client.get(&url).query(query);
        if let Some(api_key) = &self.api_key {
            request = request.header("X-Api-Key", api_key);
        }

        let response = request.send().await?.error_for_status()?;
        let body: T = response.json().await?;

        Ok(body)
    }

    /// Query parameter for a player, if the query form is supported.
    fn user_param(
        query: &UserQuery,
        by_name: bool,
        by_id: bool,
        operation: &'static str,
    ) -> Result<(&'static str, String), RemoteError> {
        match query {
            UserQuery::Name(name) if by_name => Ok(("name", name.clone())),
            UserQuery::Id(id) if by_id => Ok(("id", id.clone())),
            _ => Err(RemoteError::Unsupported(operation)),
        }
    }
}

#[async_trait]
impl Remote for HttpRemote {
    /// Request `/api/v1/users?name={name}&mode={mode}` (or `id={id}`).
    ///
    /// ```json
    /// { "id": 42, "username": "Alice", "country": "FR",
    ///   "stats": { "global_rank": 120, "pp": 4321.5, "accuracy": 98.7, "play_count": 5000 } }
    /// ```
    async fn get_user(&self, query: &UserQuery, mode: Mode) -> Result<PlayerRecord, RemoteError> {
        info!("request user {}", query);

        let user_param = Self::user_param(
            query,
            self.capabilities.lookup_by_name,
            self.capabilities.lookup_by_id,
            "user lookup",
        )?;
        let user: UserResponse = self
            .request("/api/v1/users", &[user_param, ("mode", mode.index().to_string())])
            .await?;

        Ok(user.into_record(mode))
    }

    /// Request `/api/v1/users/scores/best?name={name}&mode={mode}&l={limit}`.
    ///
    /// ```json
    /// { "scores": [ { "id": 1, "beatmap": { "beatmap_id": 75, "song_name": "..." },
    ///   "mods": 72, "accuracy": 97.5, "pp": 310.2, "rank": "S", "max_combo": 314 } ] }
    /// ```
    async fn get_top(
        &self,
        query: &UserQuery,
        mode: Mode,
        limit: usize,
    ) -> Result<Vec<Score>, RemoteError> {
        info!("request top plays of {}", query);

        let user_param = Self::user_param(
            query,
            self.capabilities.top_by_name,
            self.capabilities.top_by_id,
            "top plays",
        )?;
        let scores: ScoresResponse = self
            .request(
                "/api/v1/users/scores/best",
                &[user_param, ("mode", mode.index().to_string()), ("l", limit.to_string())],
            )
            .await?;

        Ok(scores
            .scores
            .unwrap_or_default()
            .into_iter()
            .map(Score::from)
            .collect())
    }

    /// Request `/api/v1/users/scores/recent?name={name}&mode={mode}`.
    ///
    /// Same body as [`Self::get_top`].
    async fn get_recent(&self, query: &UserQuery, mode: Mode) -> Result<Vec<Score>, RemoteError> {
        info!("request recent plays of {}", query);

        let user_param = Self::user_param(
            query,
            self.capabilities.recent_by_name,
            self.capabilities.recent_by_id,
            "recent plays",
        )?;
        let scores: ScoresResponse = self
            .request(
                "/api/v1/users/scores/recent",
                &[user_param, ("mode", mode.index().to_string())],
            )
            .await?;

        Ok(scores
            .scores
            .unwrap_or_default()
            .into_iter()
            .map(Score::from)
            .collect())
    }

    /// Request `/api/v1/scores/{score_id}?mode={mode}`.
    async fn get_score(&self, score_id: &str, mode: Mode) -> Result<Score, RemoteError> {
        info!("request score {}", score_id);

        if !self.capabilities.score_by_id {
            return Err(RemoteError::Unsupported("score by id"));
        }

        let score: ScoreResponse = self
            .request(
                &format!("/api/v1/scores/{}", score_id),
                &[("mode", mode.index().to_string())],
            )
            .await?;

        Ok(score.into())
    }

    /// Request `/api/v1/leaderboard?b={beatmap}&mode={mode}&players={id,id}&mods={mods}`.
    ///
    /// ```json
    /// { "entries": [ { "user_id": 7, "username": "Alice", "position": 3, "pp": 250.0, "accuracy": 99.0 } ] }
    /// ```
    async fn get_leaderboard(
        &self,
        beatmap_id: &str,
        players: &[String],
        mode: Mode,
        mods: Option<Mods>,
    ) -> Result<Vec<RankedEntry>, RemoteError> {
        info!("request leaderboard of beatmap {}", beatmap_id);

        if !self.capabilities.leaderboard {
            return Err(RemoteError::Unsupported("leaderboard"));
        }

        let mut query = vec![
            ("b", beatmap_id.to_owned()),
            ("mode", mode.index().to_string()),
            ("players", players.join(",")),
        ];
        if let Some(mods) = mods {
            query.push(("mods", mods.0.to_string()));
        }

        let leaderboard: LeaderboardResponse = self.request("/api/v1/leaderboard", &query).await?;

        Ok(leaderboard
            .entries
            .unwrap_or_default()
            .into_iter()
            .map(RankedEntry::from)
            .collect())
    }
}
