//! Configuration file structures for the scorebot.
//!
//! The configuration is read from a YAML file, any value can be overridden by
//! an environment variable prefixed with `SCOREBOT_`, nested keys being
//! separated by `__`.
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Character starting every command
//! prefix: "!"
//!
//! # Timeout of every HTTP request, in seconds
//! http_timeout: 10
//!
//! # Optional YAML file overriding the built-in English texts
//! locale_path: "locale/ru.yaml"
//!
//! # Optional render service, the render command is disabled without it
//! render:
//!   url: "https://render.example.com/api/render"
//!
//! servers:
//!   - name: "Bancho"
//!     aliases: ["bancho", "банчо"]
//!     link: "https://osu.ppy.sh"
//!     url: "https://api.example.com"
//!     api_key: "secret"
//!     capabilities:
//!       lookup_by_name: true
//!       lookup_by_id: true
//!       top_by_id: true
//!       recent_by_id: true
//!       score_by_id: true
//!       leaderboard: true
//! ```
//!
//! # Environment Variable Overrides
//!
//! ```bash
//! export SCOREBOT_HTTP_TIMEOUT=30
//! export SCOREBOT_RENDER__URL="https://render.example.com/api/render"
//! ```

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::servers::Capabilities;

/// Root configuration structure.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Character starting every command
    #[serde(default = "default_prefix")]
    pub prefix: char,
    /// Timeout of every HTTP request, in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout: u64,
    /// YAML file overriding the built-in texts
    #[serde(default)]
    pub locale_path: Option<String>,
    /// Render service settings
    #[serde(default)]
    pub render: Render,
    /// Leaderboard servers, in help order
    pub servers: Vec<Server>,
}

/// Render service configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Render {
    /// Render endpoint, rendering is disabled when missing
    pub url: Option<String>,
}

/// Leaderboard server configuration.
#[derive(Debug, Deserialize)]
pub struct Server {
    /// Display name, shown as `[name]` before every reply
    pub name: String,
    /// Aliases used after the prefix, the first one is used in buttons
    pub aliases: Vec<String>,
    /// Website shown in the help
    pub link: String,
    /// Base url of the server API
    pub url: String,
    /// Key sent with every request
    #[serde(default)]
    pub api_key: Option<String>,
    /// Operations offered by the API
    #[serde(default)]
    pub capabilities: Capabilities,
}

fn default_prefix() -> char {
    '!'
}

fn default_http_timeout() -> u64 {
    10
}

impl Config {
    /// Loads the configuration from a YAML file and the `SCOREBOT_` environment
    /// variables. Environment variables win over the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or if a value is missing
    /// or has the wrong type.
    pub fn load(path: &str) -> Result<Self, anyhow::Error> {
        let config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("SCOREBOT_").split("__"))
            .extract()?;

        Ok(config)
    }
}
