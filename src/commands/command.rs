//! Commands and message parsing.
//!
//! A [`Command`] is a plain value: its aliases, two flags driving the dispatch
//! pipeline, and a handler function. [`parse_message`] splits a chat message
//! into the server alias, the command alias and the remaining tokens.

use futures::future::BoxFuture;
use log::debug;

use crate::commands::{CommandContext, reply::ReplyPayload};

/// Handler of a command.
///
/// Receives the context built by the dispatch pipeline and returns the reply.
/// Errors and panics are turned into a diagnostic reply by the caller.
pub type Handler = for<'a> fn(&'a CommandContext) -> BoxFuture<'a, Result<ReplyPayload, anyhow::Error>>;

/// A command offered by a server module.
#[derive(Clone, Copy)]
pub struct Command {
    /// Canonical name, also the first alias
    pub name: &'static str,
    /// Every alias routing to the command, Latin and Cyrillic
    pub aliases: &'static [&'static str],
    /// Arguments shown in the help, after the command name
    pub usage: &'static str,
    /// The player targeted by the command is resolved before the handler runs
    pub need_user_parse: bool,
    /// Modifier tokens are split off the arguments
    pub parse_mods: bool,
    /// Handler function
    pub handler: Handler,
}

/// Message split into its routing tokens.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Server alias, right after the prefix
    pub module: String,
    /// Command alias, `None` when the message only names the server
    pub command: Option<String>,
    /// Tokens following the command alias
    pub arguments: Vec<String>,
}

/// Parses a message body of the form `!<server> <command> [args...]`.
///
/// Tokens are separated by whitespace and kept verbatim, in order, whatever
/// they start with: `-GN` is a nickname, `-100` a chat id.
///
/// # Arguments
///
/// * `prefix` - Character starting every command
/// * `body` - Text of the message
///
/// # Returns
///
/// `None` when the message is not a command: no prefix, or nothing glued to
/// the prefix.
///
/// # Examples
///
/// ```
/// # use scorebot::commands::command::parse_message;
/// let message = parse_message('!', "!bancho top -GN").unwrap();
/// assert_eq!(message.module, "bancho");
/// assert_eq!(message.command.as_deref(), Some("top"));
/// assert_eq!(message.arguments, vec!["-GN"]);
/// ```
pub fn parse_message(prefix: char, body: &str) -> Option<ParsedMessage> {
    let rest = body.trim().strip_prefix(prefix)?;

    // Regular chat messages may start with the prefix too, like "! nice"
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return None;
    }

    let mut tokens = rest.split_whitespace().map(str::to_owned);
    let module = tokens.next()?;
    let command = tokens.next();
    let message = ParsedMessage {
        module,
        command,
        arguments: tokens.collect(),
    };

    debug!("parsing message: {:?}", message);

    Some(message)
}
