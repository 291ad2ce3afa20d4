//! The three UI handles a chat controller drives
//!
//! Frontends implement these for their own widgets and hand them to
//! [`ChatController::new`](crate::controller::ChatController::new).

use crate::types::Message;

/// Input placeholder while idle
pub const IDLE_PLACEHOLDER: &str = "Digite seus sintomas aqui...";
/// Input placeholder while a request is outstanding
pub const BUSY_PLACEHOLDER: &str = "Analisando...";

/// The text field the user types symptoms into
pub trait InputField {
    fn value(&self) -> String;
    fn clear(&mut self);
    fn set_enabled(&mut self, enabled: bool);
    fn set_placeholder(&mut self, placeholder: &str);
    fn focus(&mut self);
}

/// The send button
pub trait SendControl {
    fn set_enabled(&mut self, enabled: bool);
}

/// Where messages are displayed
pub trait MessageSink {
    fn append(&mut self, message: Message);
    /// Show the transient typing indicator. It is not a message.
    fn show_typing(&mut self);
    fn hide_typing(&mut self);
}

/// In-memory message list with a typing flag
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    typing: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageSink for Transcript {
    fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    fn show_typing(&mut self) {
        self.typing = true;
    }

    fn hide_typing(&mut self) {
        self.typing = false;
    }
}
