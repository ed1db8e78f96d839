//! Replies sent back to the chat.
//!
//! Every handled command produces exactly one [`ReplyPayload`]. Buttons hold a
//! complete command line; pressing one sends that line through the same
//! parsing and routing path as a typed message.

use mime::Mime;

/// Follow-up action attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Text shown on the button
    pub label: String,
    /// Command line dispatched when the button is pressed
    pub command: String,
}

/// Image attached to a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// Content type of `data`
    pub mime: Mime,
}

/// Reply to one command invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyPayload {
    /// Markdown text
    pub text: String,
    /// Rows of buttons
    pub buttons: Vec<Vec<Button>>,
    /// Optional image
    pub image: Option<Image>,
}

impl ReplyPayload {
    /// Creates a text only reply.
    pub fn text(text: impl Into<String>) -> Self {
        ReplyPayload {
            text: text.into(),
            ..ReplyPayload::default()
        }
    }

    /// Adds a row of buttons. Empty rows are skipped.
    pub fn with_row(mut self, row: Vec<Button>) -> Self {
        if !row.is_empty() {
            self.buttons.push(row);
        }
        self
    }

    /// Attaches an image.
    pub fn with_image(mut self, image: Image) -> Self {
        self.image = Some(image);
        self
    }

    /// Prefixes the text with the display name of a server, as `[Name] text`.
    pub fn prefixed(mut self, server_name: &str) -> Self {
        self.text = format!("[{}] {}", server_name, self.text);
        self
    }
}
