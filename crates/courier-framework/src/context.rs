//! Per-invocation handler context.
//!
//! A fresh [`Context`] is built for every dispatched event and never mutated
//! afterwards. Its variant always matches the event kind: commands and default
//! handler messages get [`MessageContext`], button presses get
//! [`CallbackContext`].

use std::fmt;

use courier_core::{
    AckHandle, BoxedTransport, ChatId, EventKind, ReplyOptions, TransportResult, User, UserId,
};

use crate::command::CommandArgs;

/// Context for a text message, with or without a matched command.
#[derive(Clone)]
pub struct MessageContext {
    user: User,
    chat: ChatId,
    text: String,
    command: Option<String>,
    args: CommandArgs,
    is_admin: bool,
    transport: BoxedTransport,
}

impl MessageContext {
    pub(crate) fn new(
        user: User,
        chat: ChatId,
        text: String,
        is_admin: bool,
        transport: BoxedTransport,
    ) -> Self {
        Self {
            user,
            chat,
            text,
            command: None,
            args: CommandArgs::default(),
            is_admin,
            transport,
        }
    }

    pub(crate) fn with_command(mut self, name: &str, args: CommandArgs) -> Self {
        self.command = Some(name.to_string());
        self.args = args;
        self
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat
    }

    /// The raw message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Name of the matched command; `None` inside the default handler.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Parsed command arguments; empty inside the default handler.
    pub fn args(&self) -> &CommandArgs {
        &self.args
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn transport(&self) -> &BoxedTransport {
        &self.transport
    }

    /// Sends plain text to the originating chat.
    pub async fn reply(&self, text: &str) -> TransportResult<()> {
        self.reply_with(text, &ReplyOptions::plain()).await
    }

    pub async fn reply_markdown(&self, text: &str) -> TransportResult<()> {
        self.reply_with(text, &ReplyOptions::markdown()).await
    }

    pub async fn reply_html(&self, text: &str) -> TransportResult<()> {
        self.reply_with(text, &ReplyOptions::html()).await
    }

    /// Sends text with explicit formatting and markup.
    pub async fn reply_with(&self, text: &str, options: &ReplyOptions) -> TransportResult<()> {
        self.transport.reply(self.chat, text, options).await
    }
}

impl fmt::Debug for MessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageContext")
            .field("user", &self.user)
            .field("chat", &self.chat)
            .field("text", &self.text)
            .field("command", &self.command)
            .field("args", &self.args)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

/// Context for a button press.
#[derive(Clone)]
pub struct CallbackContext {
    user: User,
    chat: ChatId,
    data: String,
    ack: AckHandle,
    is_admin: bool,
    transport: BoxedTransport,
}

impl CallbackContext {
    pub(crate) fn new(
        user: User,
        chat: ChatId,
        data: String,
        ack: AckHandle,
        is_admin: bool,
        transport: BoxedTransport,
    ) -> Self {
        Self {
            user,
            chat,
            data,
            ack,
            is_admin,
            transport,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat
    }

    /// The raw callback payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Returns the `index`-th `:`-separated segment of the payload.
    ///
    /// For `trade:buy:BTC`, segment 0 is `trade` and segment 2 is `BTC`.
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.data.split(':').nth(index)
    }

    pub fn ack(&self) -> &AckHandle {
        &self.ack
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn transport(&self) -> &BoxedTransport {
        &self.transport
    }

    /// Acknowledges the button press, optionally showing a notice.
    pub async fn answer(&self, text: Option<&str>) -> TransportResult<()> {
        self.transport.acknowledge(&self.ack, text).await
    }

    /// Replaces the text of the message that carried the button.
    pub async fn edit_message(&self, text: &str, options: &ReplyOptions) -> TransportResult<()> {
        self.transport.edit(&self.ack, text, options).await
    }

    /// Sends a new plain-text message to the chat.
    pub async fn reply(&self, text: &str) -> TransportResult<()> {
        self.reply_with(text, &ReplyOptions::plain()).await
    }

    pub async fn reply_with(&self, text: &str, options: &ReplyOptions) -> TransportResult<()> {
        self.transport.reply(self.chat, text, options).await
    }
}

impl fmt::Debug for CallbackContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackContext")
            .field("user", &self.user)
            .field("chat", &self.chat)
            .field("data", &self.data)
            .field("ack", &self.ack)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

/// The context handed to a handler.
#[derive(Debug, Clone)]
pub enum Context {
    Message(MessageContext),
    Callback(CallbackContext),
}

impl Context {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Command,
            Self::Callback(_) => EventKind::Callback,
        }
    }

    pub fn user(&self) -> &User {
        match self {
            Self::Message(c) => c.user(),
            Self::Callback(c) => c.user(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user().id
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            Self::Message(c) => c.chat_id(),
            Self::Callback(c) => c.chat_id(),
        }
    }

    pub fn is_admin(&self) -> bool {
        match self {
            Self::Message(c) => c.is_admin(),
            Self::Callback(c) => c.is_admin(),
        }
    }

    pub fn transport(&self) -> &BoxedTransport {
        match self {
            Self::Message(c) => c.transport(),
            Self::Callback(c) => c.transport(),
        }
    }

    pub fn as_message(&self) -> Option<&MessageContext> {
        match self {
            Self::Message(c) => Some(c),
            Self::Callback(_) => None,
        }
    }

    pub fn as_callback(&self) -> Option<&CallbackContext> {
        match self {
            Self::Callback(c) => Some(c),
            Self::Message(_) => None,
        }
    }

    /// Shows `text` to the user in the way that fits the event kind.
    ///
    /// Messages get a plain reply; button presses are acknowledged with the
    /// text as the notice.
    pub async fn notify(&self, text: &str) -> TransportResult<()> {
        match self {
            Self::Message(c) => c.reply(text).await,
            Self::Callback(c) => c.answer(Some(text)).await,
        }
    }
}

impl From<MessageContext> for Context {
    fn from(ctx: MessageContext) -> Self {
        Self::Message(ctx)
    }
}

impl From<CallbackContext> for Context {
    fn from(ctx: CallbackContext) -> Self {
        Self::Callback(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use courier_core::{ChannelTransport, Outgoing};

    #[tokio::test]
    async fn test_notify_replies_to_message() {
        let (transport, _tx) = ChannelTransport::new();
        let ctx = testing::message_context(transport.clone(), "hello");

        assert_eq!(ctx.kind(), EventKind::Command);
        ctx.notify("hi").await.unwrap();

        assert_eq!(
            transport.outgoing(),
            [Outgoing::Reply {
                chat: ChatId(100),
                text: "hi".to_string(),
                options: ReplyOptions::plain(),
            }]
        );
    }

    #[tokio::test]
    async fn test_notify_acknowledges_callback() {
        let (transport, _tx) = ChannelTransport::new();
        let ctx = testing::callback_context(transport.clone(), "trade:buy:BTC");

        assert_eq!(ctx.kind(), EventKind::Callback);
        ctx.notify("done").await.unwrap();

        assert!(matches!(
            transport.outgoing().as_slice(),
            [Outgoing::Ack { text: Some(text), .. }] if text == "done"
        ));
    }

    #[test]
    fn test_callback_segments() {
        let (transport, _tx) = ChannelTransport::new();
        let ctx = testing::callback_context(transport, "trade:buy:BTC");
        let cb = ctx.as_callback().unwrap();

        assert_eq!(cb.segment(0), Some("trade"));
        assert_eq!(cb.segment(2), Some("BTC"));
        assert_eq!(cb.segment(3), None);
        assert!(ctx.as_message().is_none());
    }
}
