//! Inbound event types.
//!
//! A transport yields one [`Event`] per occurrence on the chat platform:
//!
//! ```text
//! Event
//! ├── Event::Command(CommandEvent)    text message, e.g. "/buy BTCUSD 100"
//! └── Event::Callback(CallbackEvent)  button press carrying an opaque payload
//! ```
//!
//! Events are plain data. They are moved into the dispatcher and never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of the user that originated an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of the chat an event arrived in and replies go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The user behind an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Platform user identifier.
    pub id: UserId,
    /// Optional public handle.
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// Creates a user without a username.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            username: None,
        }
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Handle identifying a callback on the platform side.
///
/// Used to acknowledge the button press and to edit the message the button
/// was attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckHandle {
    /// Platform callback query id.
    pub callback_id: String,
    /// Id of the message carrying the pressed button, if known.
    #[serde(default)]
    pub message_id: Option<i64>,
}

impl AckHandle {
    /// Creates a handle with no associated message.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            message_id: None,
        }
    }

    /// Associates the handle with a message.
    pub fn with_message(mut self, message_id: i64) -> Self {
        self.message_id = Some(message_id);
        self
    }
}

impl fmt::Display for AckHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.callback_id)
    }
}

/// A text message that may contain a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    pub user: User,
    pub chat: ChatId,
    pub raw_text: String,
}

/// A button press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackEvent {
    pub user: User,
    pub chat: ChatId,
    pub raw_payload: String,
    pub ack: AckHandle,
}

/// The kind of an [`Event`], used for logging and span fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Command,
    Callback,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Callback => "callback",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound occurrence from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Command(CommandEvent),
    Callback(CallbackEvent),
}

impl Event {
    /// Convenience constructor for a command-text event.
    pub fn command(user: impl Into<UserId>, chat: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self::Command(CommandEvent {
            user: User::new(user),
            chat: chat.into(),
            raw_text: text.into(),
        })
    }

    /// Convenience constructor for a callback event.
    pub fn callback(
        user: impl Into<UserId>,
        chat: impl Into<ChatId>,
        payload: impl Into<String>,
        ack: AckHandle,
    ) -> Self {
        Self::Callback(CallbackEvent {
            user: User::new(user),
            chat: chat.into(),
            raw_payload: payload.into(),
            ack,
        })
    }

    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Command(_) => EventKind::Command,
            Self::Callback(_) => EventKind::Callback,
        }
    }

    /// Returns the originating user.
    pub fn user(&self) -> &User {
        match self {
            Self::Command(e) => &e.user,
            Self::Callback(e) => &e.user,
        }
    }

    /// Returns the chat the event belongs to.
    pub fn chat(&self) -> ChatId {
        match self {
            Self::Command(e) => e.chat,
            Self::Callback(e) => e.chat,
        }
    }
}
