//! Chat platform boundary.
//!
//! The bot only knows [`IncomingMessage`] and [`ReplyPayload`]. A [`Transport`]
//! receives messages from a chat platform and sends replies back to where the
//! message came from. [`ConsoleTransport`] reads messages from stdin and
//! prints replies to stdout, which is enough to run the bot locally.
//!
//! # Console Format
//!
//! Each line is a message. Optional leading tokens set its origin:
//!
//! - `@name` - sender, the default sender otherwise
//! - `#room` - chat room, a direct message otherwise
//! - `^name` - sender of the replied message
//!
//! ```text
//! #-100 @alice ^bob !bancho user
//! ```

use async_trait::async_trait;
use log::{debug, info};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout},
    sync::Mutex,
};

use crate::commands::{IncomingMessage, MessageOrigin, reply::ReplyPayload};

/// Messaging platform the bot is connected to.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Waits for the next message, `None` once the platform is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot be read.
    async fn receive(&self) -> Result<Option<IncomingMessage>, anyhow::Error>;

    /// Sends `reply` to the chat `target` came from.
    ///
    /// # Errors
    ///
    /// Returns an error if the reply cannot be delivered.
    async fn send(&self, target: &MessageOrigin, reply: &ReplyPayload) -> Result<(), anyhow::Error>;
}

/// Transport over stdin and stdout.
pub struct ConsoleTransport {
    /// Lines read from stdin
    input: Mutex<Lines<BufReader<Stdin>>>,
    /// Replies written to stdout, one at a time
    output: Mutex<Stdout>,
    /// Sender of the lines without `@name` token
    default_sender: String,
}

impl ConsoleTransport {
    /// Creates a console transport.
    ///
    /// # Arguments
    ///
    /// * `default_sender` - Sender of the lines naming no sender
    pub fn new(default_sender: &str) -> Self {
        info!("reading messages from stdin as {}", default_sender);

        ConsoleTransport {
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            output: Mutex::new(tokio::io::stdout()),
            default_sender: default_sender.to_owned(),
        }
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn receive(&self) -> Result<Option<IncomingMessage>, anyhow::Error> {
        let mut input = self.input.lock().await;
        loop {
            let Some(line) = input.next_line().await? else {
                return Ok(None);
            };
            if !line.trim().is_empty() {
                return Ok(Some(parse_console_line(&line, &self.default_sender)));
            }
        }
    }

    async fn send(&self, target: &MessageOrigin, reply: &ReplyPayload) -> Result<(), anyhow::Error> {
        let text = format_console_reply(target, reply);
        debug!("console reply to {}", target.sender_id);

        let mut output = self.output.lock().await;
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;

        Ok(())
    }
}

/// Reads a console line, see the module documentation for its format.
pub fn parse_console_line(line: &str, default_sender: &str) -> IncomingMessage {
    let mut origin = MessageOrigin {
        room_id: None,
        sender_id: default_sender.to_owned(),
        reply_to: None,
    };

    let mut rest = line.trim_start();
    loop {
        let (token, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let value = token.get(1..).filter(|value| !value.is_empty());
        match (token.chars().next(), value) {
            (Some('@'), Some(_)) => origin.sender_id = token.to_owned(),
            (Some('#'), Some(room)) => origin.room_id = Some(room.to_owned()),
            (Some('^'), Some(name)) => origin.reply_to = Some(format!("@{}", name)),
            _ => break,
        }
        rest = tail.trim_start();
    }

    IncomingMessage {
        body: rest.trim_end().to_owned(),
        origin,
    }
}

/// Renders a reply as console text.
pub fn format_console_reply(target: &MessageOrigin, reply: &ReplyPayload) -> String {
    let mut text = match &target.room_id {
        Some(room) => format!("#{} {}: {}\n", room, target.sender_id, reply.text),
        None => format!("{}: {}\n", target.sender_id, reply.text),
    };

    for row in &reply.buttons {
        let buttons: Vec<String> = row
            .iter()
            .map(|button| format!("[{}] {}", button.label, button.command))
            .collect();
        text.push_str(&format!("  {}\n", buttons.join(" | ")));
    }

    if let Some(image) = &reply.image {
        text.push_str(&format!("  <{} image, {} bytes>\n", image.mime, image.data.len()));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::reply::{Button, Image};

    #[test]
    fn test_parse_plain_line() {
        let message = parse_console_line("!bancho top Alice", "@me");

        assert_eq!(message.body, "!bancho top Alice");
        assert_eq!(
            message.origin,
            MessageOrigin {
                room_id: None,
                sender_id: "@me".to_owned(),
                reply_to: None,
            }
        );
    }

    #[test]
    fn test_parse_line_with_origin() {
        let message = parse_console_line("#-100 @alice ^bob !bancho user", "@me");

        assert_eq!(message.body, "!bancho user");
        assert_eq!(message.origin.room_id.as_deref(), Some("-100"));
        assert_eq!(message.origin.sender_id, "@alice");
        assert_eq!(message.origin.reply_to.as_deref(), Some("@bob"));
    }

    #[test]
    fn test_parse_line_origin_tokens_only_lead() {
        let message = parse_console_line("#room !bancho user @bob", "@me");

        assert_eq!(message.body, "!bancho user @bob");
        assert_eq!(message.origin.sender_id, "@me");
    }

    #[test]
    fn test_parse_line_lone_marker_is_body() {
        let message = parse_console_line("# !bancho help", "@me");

        assert_eq!(message.body, "# !bancho help");
        assert_eq!(message.origin.room_id, None);
    }

    #[test]
    fn test_format_console_reply() {
        let target = MessageOrigin {
            room_id: Some("-100".to_owned()),
            sender_id: "@alice".to_owned(),
            reply_to: None,
        };
        let reply = ReplyPayload::text("[Bancho] hello")
            .with_row(vec![
                Button {
                    label: "Top plays".to_owned(),
                    command: "!bancho top standard Alice".to_owned(),
                },
                Button {
                    label: "Recent".to_owned(),
                    command: "!bancho recent standard Alice".to_owned(),
                },
            ])
            .with_image(Image {
                data: vec![0; 4],
                mime: mime::IMAGE_PNG,
            });

        assert_eq!(
            format_console_reply(&target, &reply),
            "#-100 @alice: [Bancho] hello\n  [Top plays] !bancho top standard Alice | [Recent] !bancho recent standard Alice\n  <image/png image, 4 bytes>\n"
        );
    }
}
