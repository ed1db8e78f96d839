//! User facing texts.
//!
//! Handlers never write text inline: they ask a [`Localizer`] for a key and
//! its parameters. [`Catalog`] ships English texts and can load a YAML file
//! overriding any of them.

use std::collections::HashMap;

use figment::{
    Figment,
    providers::{Format, Serialized, Yaml},
};
use log::{info, warn};

/// Lookup service for user facing texts.
pub trait Localizer: Send + Sync {
    /// Returns the text of `key` with its `{name}` placeholders replaced by
    /// the matching `params` value.
    fn text(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Built-in English texts.
const ENGLISH: &[(&str, &str)] = &[
    ("unknown_command", "Unknown command `{command}`. Type `{help}` for the list of commands."),
    ("no_identity", "The player you replied to has not linked an account, give a nickname instead."),
    ("no_linked_account", "You have not linked an account, use `{set}` or give a nickname."),
    ("invalid_id", "Invalid player id."),
    ("not_found", "Not found on this server."),
    ("failure", "Something went wrong, please try again later."),
    ("unsupported", "This server does not support this request."),
    ("usage", "Usage: `{usage}`"),
    ("help_header", "Commands of {server} ({link}):"),
    ("help_line", "- `{usage}`: {description}"),
    ("help_help", "show this help message"),
    ("help_user", "show the profile of a player"),
    ("help_top", "show the best plays of a player"),
    ("help_recent", "show the most recent play of a player"),
    ("help_set", "link your chat account to a player"),
    ("help_unset", "unlink your chat account"),
    ("help_mode", "set your default mode"),
    ("help_chat", "show the leaderboard of the chat members"),
    ("help_lb", "show the leaderboard of a beatmap among the chat members"),
    ("help_score", "show a score by its id"),
    ("help_render", "render a score by its id"),
    (
        "profile",
        "**{nickname}** ({mode}, {country})\nRank: {rank}\nPerformance: {performance}pp\nAccuracy: {accuracy}%\nPlay count: {play_count}",
    ),
    ("unranked", "unranked"),
    ("button_top", "Top plays"),
    ("button_recent", "Recent"),
    ("button_lb", "Beatmap leaderboard"),
    ("button_render", "Render #{index}"),
    ("top_header", "Best plays of **{nickname}** ({mode}):"),
    ("top_empty", "**{nickname}** has no play in {mode}."),
    ("recent_header", "Most recent play of **{nickname}** ({mode}):"),
    ("recent_empty", "**{nickname}** has no recent play in {mode}."),
    ("score_header", "Score {score} ({mode}):"),
    ("score_line", "{index}. {title} +{mods} {accuracy}% {grade} x{combo} {performance}"),
    ("set_done", "Linked to **{nickname}** ({id})."),
    ("set_taken", "**{nickname}** is already linked to another chat account."),
    ("unset_done", "Your account is no longer linked."),
    ("unset_missing", "You have no linked account."),
    ("mode_done", "Default mode set to {mode}."),
    ("mode_invalid", "Unknown mode, use one of: {modes}."),
    ("chat_header", "Leaderboard of the chat ({mode}):"),
    ("chat_empty", "No ranked player in this chat."),
    ("chat_no_room", "Use this command in a chat, or give a chat id."),
    ("chat_invalid", "Invalid chat id `{chat}`."),
    ("leaderboard_line", "{index}. **{nickname}** #{rank} {performance}pp {accuracy}%"),
    ("lb_header", "Leaderboard of beatmap {beatmap} ({mode}, {mods}):"),
    ("lb_empty", "No chat member has played beatmap {beatmap}."),
    ("lb_no_map", "No beatmap given, and none was shown in this chat."),
    ("render_done", "Render of score {score}."),
];

/// Replaces the `{name}` placeholders of `template`.
///
/// The template is read once, so a value containing `{other}` is inserted
/// verbatim. Unknown placeholders are kept.
fn fill(template: &str, params: &[(&str, &str)]) -> String {
    let mut text = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        text.push_str(&rest[..start]);
        let tail = &rest[start..];

        let value = tail.find('}').and_then(|end| {
            let name = &tail[1..end];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                text.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                text.push('{');
                rest = &tail[1..];
            }
        }
    }
    text.push_str(rest);

    text
}

/// Key to text catalog.
///
/// # Examples
///
/// ```
/// # use scorebot::locale::{Catalog, Localizer};
/// let catalog = Catalog::english();
/// assert_eq!(catalog.text("mode_done", &[("mode", "taiko")]), "Default mode set to taiko.");
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Texts indexed by key
    texts: HashMap<String, String>,
}

impl Catalog {
    /// Creates a catalog with the built-in English texts.
    pub fn english() -> Self {
        Catalog {
            texts: ENGLISH
                .iter()
                .map(|(key, text)| (key.to_string(), text.to_string()))
                .collect(),
        }
    }

    /// Creates a catalog from the English texts overridden by a YAML file.
    ///
    /// The file is a flat map from keys to texts. Keys missing from the file
    /// keep their English text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a map of strings.
    pub fn load(path: &str) -> Result<Self, anyhow::Error> {
        let texts: HashMap<String, String> = Figment::from(Serialized::defaults(Self::english().texts))
            .merge(Yaml::file(path))
            .extract()?;

        info!("loaded {} texts from {}", texts.len(), path);

        Ok(Catalog { texts })
    }
}

impl Localizer for Catalog {
    fn text(&self, key: &str, params: &[(&str, &str)]) -> String {
        match self.texts.get(key) {
            Some(template) => fill(template, params),
            None => {
                warn!("missing text for key {}", key);
                key.to_owned()
            }
        }
    }
}
