//! Bot command parsing, routing and execution.
//!
//! # Overview
//!
//! Commands follow the format `!<server> <command> [args...]`. Routing happens
//! on two levels: the [`Commander`] routes the server alias to a
//! [`ServerModule`], which routes the command alias to a
//! [`command::Command`]. Aliases exist in Latin and Cyrillic scripts, so
//! `!bancho top` and `!банчо топ` are the same command.
//!
//! # Pipeline
//!
//! ```text
//! Message
//!    │
//!    ▼
//! Commander::parse ── unknown server ──▶ ignored
//!    │            └── unknown command ──▶ "unknown command" reply
//!    ▼
//! ArgumentBundle::parse (mode, modifiers, nickname)
//!    │
//!    ▼
//! identity::resolve (only when the command needs a player)
//!    │            └── failure ──▶ explanation reply, no server call
//!    ▼
//! handler ── error or panic ──▶ diagnostic reply
//!    │
//!    ▼
//! ReplyPayload prefixed with "[Server]"
//! ```
//!
//! # Available Commands
//!
//! | Command | Arguments | Requires |
//! |---------|-----------|----------|
//! | `help` | None | |
//! | `user` | `[mode] [nickname]` | |
//! | `top` | `[mode] [nickname]` | top plays |
//! | `recent` | `[mode] [nickname]` | recent plays |
//! | `set` | `[mode] <nickname>` | |
//! | `unset` | None | |
//! | `mode` | `<mode>` | |
//! | `chat` | `[mode] [chat_id]` | |
//! | `lb` | `[mode] [beatmap_id] [+mods]` | beatmap leaderboards |
//! | `score` | `[mode] <score_id>` | scores by id |
//! | `render` | `[mode] <score_id>` | scores by id, render service |
//!
//! # Module Organization
//!
//! - [`commander`] - Entry point, parsing and dispatch pipeline
//! - [`command`] - Command values and message parsing
//! - [`router`] - Alias routing table
//! - [`arguments`] - Argument parsing
//! - [`identity`] - Player resolution
//! - [`leaderboard`] - Chat leaderboard ranking
//! - [`reply`] - Reply structures
//! - [`actions`] - Command handlers
//! - [`markdown_response`] - Reply text formatting

use std::sync::Arc;

pub mod actions;
pub mod arguments;
pub mod command;
pub mod commander;
pub mod identity;
pub mod leaderboard;
pub mod markdown_response;
pub mod reply;
pub mod router;

pub use crate::commands::commander::Commander;
use crate::{
    commands::{arguments::ArgumentBundle, identity::PlayerReference},
    locale::Localizer,
    render::Renderer,
    servers::{Mode, ServerModule},
    storage::LocalAccount,
};

/// Where a message comes from, and where its reply goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOrigin {
    /// Chat room, `None` for a direct message
    pub room_id: Option<String>,
    /// Sender of the message
    pub sender_id: String,
    /// Sender of the message being replied to, if any
    pub reply_to: Option<String>,
}

/// Message received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Raw text
    pub body: String,
    /// Origin of the message
    pub origin: MessageOrigin,
}

/// Context handed to a command handler.
///
/// Built by the dispatch pipeline for each invocation.
pub struct CommandContext {
    /// Server the command is routed to
    pub module: Arc<ServerModule>,
    /// Origin of the message
    pub origin: MessageOrigin,
    /// Parsed arguments
    pub args: ArgumentBundle,
    /// Account linked to the sender, if any
    pub account: Option<LocalAccount>,
    /// Targeted player, only resolved for commands needing one
    pub reference: Option<PlayerReference>,
    /// Text lookup service
    pub localizer: Arc<dyn Localizer>,
    /// Score renderer, `None` when rendering is disabled
    pub renderer: Option<Arc<dyn Renderer>>,
    /// Command prefix
    pub prefix: char,
}

impl CommandContext {
    /// Mode of the invocation.
    ///
    /// The mode given in the arguments, else the default mode of the targeted
    /// account, else the default mode of the sender, else [`Mode::Standard`].
    pub fn mode(&self) -> Mode {
        let reference_mode = match &self.reference {
            Some(PlayerReference::LocalAccount(account)) => account.mode,
            _ => None,
        };

        self.args
            .mode
            .or(reference_mode)
            .or_else(|| self.account.as_ref().and_then(|account| account.mode))
            .unwrap_or_default()
    }

    /// Targeted player.
    ///
    /// # Errors
    ///
    /// Returns an error for commands registered without player resolution.
    pub fn reference(&self) -> Result<&PlayerReference, anyhow::Error> {
        self.reference
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("command called without player resolution"))
    }

    /// Looks a text up with the localizer.
    pub fn text(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.localizer.text(key, params)
    }

    /// Complete command line running `command` on the same server.
    ///
    /// Used as button payload, it goes through the same parsing and routing
    /// as a typed message.
    pub fn follow_up(&self, command: &str, args: &[&str]) -> String {
        follow_up_line(self.prefix, self.module.primary_alias(), command, args)
    }
}

/// Builds `<prefix><server> <command> <args...>`.
pub fn follow_up_line(prefix: char, server_alias: &str, command: &str, args: &[&str]) -> String {
    let mut line = format!("{}{} {}", prefix, server_alias, command);
    for arg in args.iter().filter(|arg| !arg.is_empty()) {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Errors that can occur during message parsing.
///
/// # Variants
///
/// * `NotForBot` - Message is not a command or names an unknown server.
///   Handled silently.
///
/// * `InvalidCommand` - Unknown command for a known server. Contains the
///   message to display.
#[derive(Debug)]
pub enum CommandParseError {
    /// Message is not for this bot (silent error)
    NotForBot,
    /// Invalid command with error message
    InvalidCommand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_up_line() {
        assert_eq!(follow_up_line('!', "bancho", "top", &["taiko", "Alice"]), "!bancho top taiko Alice");
        assert_eq!(follow_up_line('!', "bancho", "lb", &["", "75"]), "!bancho lb 75");
        assert_eq!(follow_up_line('.', "gatari", "user", &[]), ".gatari user");
    }
}
