//! Event dispatcher for the Courier framework.
//!
//! The [`Dispatcher`] takes one inbound [`Event`] at a time through the
//! pipeline:
//!
//! 1. Authorize the user against the [`AccessControl`]
//! 2. Route commands through the [`CommandRegistry`] and button presses
//!    through the [`CallbackRouter`]
//! 3. Build the matching [`Context`] variant
//! 4. Invoke the handler inside the isolation boundary of [`service::invoke`]
//!
//! ```rust,ignore
//! use courier_framework::{ArgType, Command, DispatcherBuilder};
//!
//! let dispatcher = DispatcherBuilder::new()
//!     .access(AccessControl::new().with_whitelist([42]))
//!     .command(Command::new("status", "Show status", status))
//!     .callback("trade:", on_trade)
//!     .help_command("help", "Show this help")
//!     .build(transport);
//!
//! let outcome = dispatcher.dispatch(event).await;
//! ```
//!
//! Registries are frozen when the dispatcher is built. Cloning a dispatcher is
//! cheap and every clone shares the same state.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, warn};

use courier_core::{
    BoxedTransport, CallbackEvent, CommandEvent, Event, ReplyOptions, TransportResult,
};

use crate::access::AccessControl;
use crate::callback::{CallbackMatcher, CallbackRouter};
use crate::command::{Command, CommandRegistry};
use crate::context::{CallbackContext, Context, MessageContext};
use crate::error::HandlerError;
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::service;

/// Default per-handler timeout.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

/// Default notice sent to users that are not whitelisted.
pub const DEFAULT_UNAUTHORIZED_MESSAGE: &str = "⛔ You are not authorized to use this bot.";

/// Default maximum length, in characters, of the detail in an error reply.
pub const DEFAULT_ERROR_REPLY_MAX_LEN: usize = 200;

/// Tunables of the dispatch pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Handlers running longer are cancelled. `None` disables the limit.
    pub handler_timeout: Option<Duration>,
    pub unauthorized_message: String,
    pub error_reply_max_len: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            handler_timeout: Some(DEFAULT_HANDLER_TIMEOUT),
            unauthorized_message: DEFAULT_UNAUTHORIZED_MESSAGE.to_string(),
            error_reply_max_len: DEFAULT_ERROR_REPLY_MAX_LEN,
        }
    }
}

/// How a single event was processed.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A handler ran to completion.
    Handled,
    /// The user is not authorized; a notice was sent.
    Unauthorized,
    /// Nothing matched the event.
    Ignored,
    /// A command matched but its arguments did not parse; usage was sent.
    InvalidArguments,
    /// The handler failed; an error reply was sent.
    Failed(HandlerError),
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Collects registrations and settings for a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    access: AccessControl,
    commands: CommandRegistry,
    callbacks: CallbackRouter,
    default_handler: Option<BoxedHandler>,
    settings: DispatchSettings,
    help: Option<Arc<OnceLock<String>>>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access(mut self, access: AccessControl) -> Self {
        self.access = access;
        self
    }

    /// Registers a command. A command with the same name is replaced.
    pub fn command(mut self, command: Command) -> Self {
        self.commands.register(command);
        self
    }

    /// Appends a callback route. Routes are tried in registration order.
    pub fn callback<H, T>(mut self, matcher: impl Into<CallbackMatcher>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.callbacks.register(matcher, handler);
        self
    }

    /// Sets the handler for messages that match no command.
    pub fn default_handler<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.default_handler = Some(into_handler(handler));
        self
    }

    pub fn settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn handler_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settings.handler_timeout = timeout;
        self
    }

    /// Registers a command that replies with the command listing.
    ///
    /// The listing is rendered when the dispatcher is built, so it includes
    /// commands registered after this call. Every help command shares the
    /// same rendered listing.
    pub fn help_command(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        let help = self.help.get_or_insert_with(Default::default).clone();
        self.commands.register(Command::new(name, description, move || {
            let help = help.clone();
            async move { help.get().cloned() }
        }));
        self
    }

    /// Freezes the registrations into a [`Dispatcher`].
    pub fn build(self, transport: BoxedTransport) -> Dispatcher {
        if let Some(help) = &self.help {
            let _ = help.set(self.commands.help_text());
        }

        debug!(
            commands = self.commands.len(),
            callbacks = self.callbacks.len(),
            restricted = self.access.is_restricted(),
            "Dispatcher built"
        );

        Dispatcher {
            inner: Arc::new(Inner {
                transport,
                access: self.access,
                commands: self.commands,
                callbacks: self.callbacks,
                default_handler: self.default_handler,
                settings: self.settings,
            }),
        }
    }
}

struct Inner {
    transport: BoxedTransport,
    access: AccessControl,
    commands: CommandRegistry,
    callbacks: CallbackRouter,
    default_handler: Option<BoxedHandler>,
    settings: DispatchSettings,
}

/// Routes events to handlers.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn transport(&self) -> &BoxedTransport {
        &self.inner.transport
    }

    pub fn access(&self) -> &AccessControl {
        &self.inner.access
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.inner.commands
    }

    pub fn callbacks(&self) -> &CallbackRouter {
        &self.inner.callbacks
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.inner.settings
    }

    /// Processes one event to completion.
    ///
    /// Never fails: every problem is reported to the user and folded into
    /// the returned [`DispatchOutcome`].
    pub async fn dispatch(&self, event: Event) -> DispatchOutcome {
        let span = tracing::debug_span!(
            "dispatch",
            kind = %event.kind(),
            user = %event.user().id,
            chat = %event.chat(),
        );
        self.dispatch_event(event).instrument(span).await
    }

    /// Processes one event on its own task.
    pub fn spawn(&self, event: Event) -> JoinHandle<DispatchOutcome> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(event).await })
    }

    async fn dispatch_event(&self, event: Event) -> DispatchOutcome {
        let user = event.user().id;
        if let Err(e) = self.inner.access.authorize(user) {
            warn!(error = %e, "Rejected unauthorized user");
            self.reject(&event).await;
            return DispatchOutcome::Unauthorized;
        }

        let is_admin = self.inner.access.is_admin(user);
        match event {
            Event::Command(event) => self.dispatch_command(event, is_admin).await,
            Event::Callback(event) => self.dispatch_callback(event, is_admin).await,
        }
    }

    async fn reject(&self, event: &Event) {
        let notice = self.inner.settings.unauthorized_message.as_str();
        let result = match event {
            Event::Command(e) => {
                self.inner
                    .transport
                    .reply(e.chat, notice, &ReplyOptions::plain())
                    .await
            }
            Event::Callback(e) => self.inner.transport.acknowledge(&e.ack, Some(notice)).await,
        };
        log_delivery(result);
    }

    async fn dispatch_command(&self, event: CommandEvent, is_admin: bool) -> DispatchOutcome {
        let CommandEvent {
            user,
            chat,
            raw_text,
        } = event;
        let transport = self.inner.transport.clone();

        let parsed = match self.inner.commands.parse(&raw_text) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => {
                let Some(handler) = self.inner.default_handler.clone() else {
                    debug!("No command matched, ignoring");
                    return DispatchOutcome::Ignored;
                };
                debug!("No command matched, using default handler");
                let ctx = MessageContext::new(user, chat, raw_text, is_admin, transport);
                return self.run(handler, ctx.into()).await;
            }
            Err(e) => {
                debug!(command = e.command(), error = %e, "Invalid command arguments");
                let usage = self
                    .inner
                    .commands
                    .get(e.command())
                    .map(Command::usage)
                    .unwrap_or_default();
                let reply = format!("❌ {e}\nUsage: {usage}");
                log_delivery(transport.reply(chat, &reply, &ReplyOptions::plain()).await);
                return DispatchOutcome::InvalidArguments;
            }
        };

        debug!(command = parsed.command.name(), "Command matched");
        let handler = parsed.command.handler().clone();
        let ctx = MessageContext::new(user, chat, raw_text, is_admin, transport)
            .with_command(parsed.command.name(), parsed.args);
        self.run(handler, ctx.into()).await
    }

    async fn dispatch_callback(&self, event: CallbackEvent, is_admin: bool) -> DispatchOutcome {
        let Some(route) = self.inner.callbacks.route(&event.raw_payload) else {
            debug!(payload = %event.raw_payload, "No callback route matched, dropping");
            return DispatchOutcome::Ignored;
        };

        debug!(matcher = ?route.matcher(), "Callback matched");
        let handler = route.handler().clone();
        let ctx = CallbackContext::new(
            event.user,
            event.chat,
            event.raw_payload,
            event.ack,
            is_admin,
            self.inner.transport.clone(),
        );
        self.run(handler, ctx.into()).await
    }

    async fn run(&self, handler: BoxedHandler, ctx: Context) -> DispatchOutcome {
        let settings = &self.inner.settings;
        match service::invoke(handler, ctx.clone(), settings.handler_timeout).await {
            Ok(()) => DispatchOutcome::Handled,
            Err(e) => {
                error!(error = ?e, "Handler failed");
                let reply = error_reply(&e, settings.error_reply_max_len);
                log_delivery(ctx.notify(&reply).await);
                DispatchOutcome::Failed(e)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("access", &self.inner.access)
            .field("commands", &self.inner.commands)
            .field("callbacks", &self.inner.callbacks)
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

fn log_delivery(result: TransportResult<()>) {
    if let Err(e) = result {
        warn!(error = %e, "Failed to deliver message");
    }
}

/// Renders the user-visible reply for a handler failure.
///
/// Control characters are flattened to spaces and the detail is cut to
/// `max_len` characters.
fn error_reply(err: &HandlerError, max_len: usize) -> String {
    let detail: String = err
        .to_string()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if detail.chars().count() > max_len {
        let cut: String = detail.chars().take(max_len).collect();
        format!("❌ Error: {cut}…")
    } else {
        format!("❌ Error: {detail}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::command::{ArgType, CommandArgs};
    use crate::error::{BoxError, ExtractError};
    use crate::extractor::Admin;
    use courier_core::{AckHandle, ChannelTransport, Outgoing};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn counting(count: &Arc<AtomicUsize>) -> impl Fn() -> futures::future::Ready<()> + Clone + Send + Sync + 'static {
        let count = count.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(())
        }
    }

    fn texts(transport: &ChannelTransport) -> Vec<String> {
        transport
            .outgoing()
            .iter()
            .filter_map(|o| o.text().map(str::to_string))
            .collect()
    }

    fn trading_builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
            .command(Command::new("status", "Show status", || async { "ok".to_string() }))
            .command(
                Command::new("buy", "Buy an asset", |args: CommandArgs| async move {
                    Ok::<_, BoxError>(format!(
                        "bought {} {}",
                        args.int("amount")?,
                        args.str("symbol")?
                    ))
                })
                .arg("symbol", ArgType::String)
                .arg("amount", ArgType::Int),
            )
            .command(Command::new("fail", "Always fails", || async {
                Err::<(), _>("boom")
            }))
    }

    #[tokio::test]
    async fn test_command_with_typed_args() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = trading_builder().build(transport.clone());

        let outcome = dispatcher.dispatch(Event::command(1, 100, "/buy BTCUSD 100")).await;

        assert!(outcome.is_handled());
        assert_eq!(texts(&transport), ["bought 100 BTCUSD"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_next_event() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = trading_builder().build(transport.clone());

        let first = dispatcher.dispatch(Event::command(1, 100, "/fail")).await;
        let second = dispatcher.dispatch(Event::command(1, 100, "/status")).await;

        assert!(matches!(first, DispatchOutcome::Failed(HandlerError::Failed(_))));
        assert!(second.is_handled());
        assert_eq!(texts(&transport), ["❌ Error: boom", "ok"]);
    }

    #[tokio::test]
    async fn test_unauthorized_command_is_rejected_before_lookup() {
        let (transport, _tx) = ChannelTransport::new();
        let calls = counter();
        let dispatcher = DispatcherBuilder::new()
            .access(AccessControl::new().with_whitelist([1]))
            .command(Command::new("status", "Show status", counting(&calls)))
            .build(transport.clone());

        let outcome = dispatcher.dispatch(Event::command(2, 100, "/status")).await;

        assert!(matches!(outcome, DispatchOutcome::Unauthorized));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(texts(&transport), [DEFAULT_UNAUTHORIZED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_unauthorized_callback_is_acknowledged() {
        let (transport, _tx) = ChannelTransport::new();
        let calls = counter();
        let dispatcher = DispatcherBuilder::new()
            .access(AccessControl::new().with_whitelist([1]))
            .callback("trade:", counting(&calls))
            .build(transport.clone());

        let outcome = dispatcher
            .dispatch(Event::callback(7, 100, "trade:buy:BTC", AckHandle::new("cb-1")))
            .await;

        assert!(matches!(outcome, DispatchOutcome::Unauthorized));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            transport.outgoing(),
            [Outgoing::Ack {
                ack: AckHandle::new("cb-1"),
                text: Some(DEFAULT_UNAUTHORIZED_MESSAGE.to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_callback_first_match_wins() {
        let (transport, _tx) = ChannelTransport::new();
        let (a, b) = (counter(), counter());
        let dispatcher = DispatcherBuilder::new()
            .callback("trade:", counting(&a))
            .callback(CallbackMatcher::pattern("trade:buy:.*").unwrap(), counting(&b))
            .build(transport.clone());

        let outcome = dispatcher
            .dispatch(Event::callback(1, 100, "trade:buy:BTC", AckHandle::new("cb")))
            .await;

        assert!(outcome.is_handled());
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unmatched_callback_is_dropped() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = DispatcherBuilder::new()
            .callback("trade:", || async {})
            .build(transport.clone());

        let outcome = dispatcher
            .dispatch(Event::callback(1, 100, "menu:main", AckHandle::new("cb")))
            .await;

        assert!(matches!(outcome, DispatchOutcome::Ignored));
        assert!(transport.outgoing().is_empty());
    }

    #[tokio::test]
    async fn test_callback_failure_is_acknowledged() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = DispatcherBuilder::new()
            .callback("trade:", |cb: CallbackContext| async move {
                Err::<(), _>(format!("unknown side {}", cb.segment(1).unwrap_or_default()))
            })
            .build(transport.clone());

        let outcome = dispatcher
            .dispatch(Event::callback(1, 100, "trade:hold:BTC", AckHandle::new("cb")))
            .await;

        assert!(outcome.is_failed());
        assert!(matches!(
            transport.outgoing().as_slice(),
            [Outgoing::Ack { text: Some(text), .. }] if text == "❌ Error: unknown side hold"
        ));
    }

    #[tokio::test]
    async fn test_default_handler_receives_raw_text() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = trading_builder()
            .default_handler(|msg: MessageContext| async move {
                assert!(msg.command().is_none());
                assert!(msg.args().is_empty());
                format!("echo: {}", msg.text())
            })
            .build(transport.clone());

        let outcome = dispatcher.dispatch(Event::command(1, 100, "hello there")).await;

        assert!(outcome.is_handled());
        assert_eq!(texts(&transport), ["echo: hello there"]);
    }

    #[tokio::test]
    async fn test_unmatched_command_without_default_is_ignored() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = trading_builder().build(transport.clone());

        let outcome = dispatcher.dispatch(Event::command(1, 100, "/unknown x")).await;

        assert!(matches!(outcome, DispatchOutcome::Ignored));
        assert!(transport.outgoing().is_empty());
    }

    #[tokio::test]
    async fn test_argument_errors_reply_with_usage() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = trading_builder().build(transport.clone());

        let missing = dispatcher.dispatch(Event::command(1, 100, "/buy ETH")).await;
        let invalid = dispatcher.dispatch(Event::command(1, 100, "/buy ETH lots")).await;

        assert!(matches!(missing, DispatchOutcome::InvalidArguments));
        assert!(matches!(invalid, DispatchOutcome::InvalidArguments));
        assert_eq!(
            texts(&transport),
            [
                "❌ missing argument: amount\nUsage: /buy <symbol> <amount>",
                "❌ invalid value for amount: 'lots' is not a valid int\nUsage: /buy <symbol> <amount>",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_reported() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = DispatcherBuilder::new()
            .command(Command::new("slow", "Never finishes", || async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }))
            .handler_timeout(Some(Duration::from_secs(2)))
            .build(transport.clone());

        let outcome = dispatcher.dispatch(Event::command(1, 100, "/slow")).await;

        assert!(matches!(outcome, DispatchOutcome::Failed(ref e) if e.is_timeout()));
        assert_eq!(texts(&transport), ["❌ Error: handler timed out after 2s"]);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = trading_builder()
            .command(Command::new("crash", "Panics", || async {
                if true {
                    panic!("index out of bounds");
                }
            }))
            .build(transport.clone());

        let crashed = dispatcher.dispatch(Event::command(1, 100, "/crash")).await;
        let next = dispatcher.dispatch(Event::command(1, 100, "/status")).await;

        assert!(matches!(crashed, DispatchOutcome::Failed(HandlerError::Panicked(_))));
        assert!(next.is_handled());
        assert_eq!(
            texts(&transport),
            ["❌ Error: handler panicked: index out of bounds", "ok"]
        );
    }

    #[tokio::test]
    async fn test_admin_guard() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = DispatcherBuilder::new()
            .access(AccessControl::new().with_admins([1]))
            .command(Command::new("halt", "Stop trading", |Admin(user): Admin| async move {
                format!("halted by {}", user.id)
            }))
            .build(transport.clone());

        let admin = dispatcher.dispatch(Event::command(1, 100, "/halt")).await;
        let other = dispatcher.dispatch(Event::command(2, 100, "/halt")).await;

        assert!(admin.is_handled());
        assert!(matches!(
            other,
            DispatchOutcome::Failed(HandlerError::Extract(ExtractError::NotAdmin { .. }))
        ));
        assert_eq!(
            texts(&transport),
            ["halted by 1", "❌ Error: admin privileges required"]
        );
    }

    #[tokio::test]
    async fn test_error_reply_is_sanitized_and_truncated() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = DispatcherBuilder::new()
            .command(Command::new("leak", "Long error", || async {
                Err::<(), _>("line one\nline two and a lot more detail")
            }))
            .settings(DispatchSettings {
                error_reply_max_len: 16,
                ..Default::default()
            })
            .build(transport.clone());

        dispatcher.dispatch(Event::command(1, 100, "/leak")).await;

        assert_eq!(texts(&transport), ["❌ Error: line one line tw…"]);
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_abort_dispatch() {
        let (transport, _tx) = ChannelTransport::new();
        transport.set_fail_outbound(true);
        let dispatcher = trading_builder().build(transport.clone());

        let failed = dispatcher.dispatch(Event::command(1, 100, "/fail")).await;
        let ok = dispatcher.dispatch(Event::command(1, 100, "/status")).await;

        assert!(failed.is_failed());
        assert!(ok.is_handled());
    }

    #[tokio::test]
    async fn test_help_command_lists_all_commands() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = trading_builder()
            .help_command("help", "Show this help")
            .build(transport.clone());

        dispatcher.dispatch(Event::command(1, 100, "/help")).await;

        assert_eq!(texts(&transport), [dispatcher.commands().help_text()]);
        assert!(texts(&transport)[0].ends_with("/help - Show this help"));
    }

    #[tokio::test]
    async fn test_every_help_command_replies() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = trading_builder()
            .help_command("help", "Show this help")
            .help_command("commands", "List commands")
            .build(transport.clone());

        let help = dispatcher.dispatch(Event::command(1, 100, "/help")).await;
        let commands = dispatcher.dispatch(Event::command(1, 100, "/commands")).await;

        assert!(help.is_handled() && commands.is_handled());
        let listing = dispatcher.commands().help_text();
        assert!(listing.contains("/help - Show this help"));
        assert!(listing.contains("/commands - List commands"));
        assert_eq!(texts(&transport), [listing.clone(), listing]);
    }

    #[tokio::test]
    async fn test_callback_edits_the_pressed_message() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = DispatcherBuilder::new()
            .callback("trade:", |cb: CallbackContext| async move {
                let text = format!("confirmed {}", cb.segment(2).unwrap_or_default());
                cb.edit_message(&text, &ReplyOptions::plain()).await?;
                cb.answer(None).await
            })
            .build(transport.clone());

        let ack = AckHandle::new("cb-9").with_message(55);
        let outcome = dispatcher
            .dispatch(Event::callback(1, 100, "trade:buy:BTC", ack.clone()))
            .await;

        assert!(outcome.is_handled());
        assert_eq!(
            transport.outgoing(),
            [
                Outgoing::Edit {
                    ack: ack.clone(),
                    text: "confirmed BTC".to_string(),
                    options: ReplyOptions::plain(),
                },
                Outgoing::Ack { ack, text: None },
            ]
        );
    }

    #[tokio::test]
    async fn test_spawn() {
        let (transport, _tx) = ChannelTransport::new();
        let dispatcher = trading_builder().build(transport.clone());

        let outcome = dispatcher
            .spawn(Event::command(1, 100, "/status"))
            .await
            .unwrap();

        assert!(outcome.is_handled());
    }

    #[test]
    fn test_error_reply_short_detail_untouched() {
        let err = HandlerError::Failed("bad\tinput".into());
        assert_eq!(error_reply(&err, 200), "❌ Error: bad input");
    }
}
