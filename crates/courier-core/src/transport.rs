//! The transport seam and an in-memory implementation.
//!
//! A [`Transport`] is the only thing Courier knows about the chat platform.
//! It yields inbound events one at a time and accepts outbound replies,
//! callback acknowledgements and message edits.
//!
//! [`ChannelTransport`] feeds events through a tokio channel and records every
//! outbound call, which makes it suitable for embedding Courier behind another
//! event source and for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};
use tracing::trace;

use crate::error::{TransportError, TransportResult};
use crate::event::{AckHandle, ChatId, Event};
use crate::markup::ReplyOptions;

/// Contract between the dispatcher and a chat platform.
///
/// Implementations must be shareable across tasks: every dispatched event
/// holds an [`Arc`] to the transport so that handlers can reply.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Waits for the next inbound event.
    ///
    /// Returns `Ok(None)` once the event stream has ended.
    async fn receive(&self) -> TransportResult<Option<Event>>;

    /// Sends a message to a chat.
    async fn reply(&self, chat: ChatId, text: &str, options: &ReplyOptions) -> TransportResult<()>;

    /// Acknowledges a callback, optionally showing a transient notice.
    async fn acknowledge(&self, ack: &AckHandle, text: Option<&str>) -> TransportResult<()>;

    /// Replaces the content of the message a callback was attached to.
    async fn edit(&self, ack: &AckHandle, text: &str, options: &ReplyOptions) -> TransportResult<()>;
}

/// A shared transport trait object.
pub type BoxedTransport = Arc<dyn Transport>;

/// An outbound call recorded by [`ChannelTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Reply {
        chat: ChatId,
        text: String,
        options: ReplyOptions,
    },
    Ack {
        ack: AckHandle,
        text: Option<String>,
    },
    Edit {
        ack: AckHandle,
        text: String,
        options: ReplyOptions,
    },
}

impl Outgoing {
    /// Returns the visible text of this call, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Reply { text, .. } | Self::Edit { text, .. } => Some(text),
            Self::Ack { text, .. } => text.as_deref(),
        }
    }
}

/// Sending half of a [`ChannelTransport`].
///
/// Dropping every sender ends the event stream.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Queues an event for the transport to yield.
    pub fn send(&self, event: Event) -> TransportResult<()> {
        self.tx
            .send(event)
            .map_err(|_| TransportError::closed("event receiver dropped"))
    }
}

/// In-memory [`Transport`] backed by a tokio channel.
pub struct ChannelTransport {
    events: tokio::sync::Mutex<mpsc::UnboundedReceiver<Event>>,
    outgoing: Mutex<Vec<Outgoing>>,
    notify: Notify,
    fail_outbound: AtomicBool,
}

impl ChannelTransport {
    /// Creates a transport and the sender that feeds it.
    pub fn new() -> (Arc<Self>, EventSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            events: tokio::sync::Mutex::new(rx),
            outgoing: Mutex::new(Vec::new()),
            notify: Notify::new(),
            fail_outbound: AtomicBool::new(false),
        });
        (transport, EventSender { tx })
    }

    /// Makes every subsequent outbound call fail with [`TransportError::SendFailed`].
    pub fn set_fail_outbound(&self, fail: bool) {
        self.fail_outbound.store(fail, Ordering::SeqCst);
    }

    /// Returns a snapshot of all recorded outbound calls.
    pub fn outgoing(&self) -> Vec<Outgoing> {
        self.outgoing.lock().clone()
    }

    /// Removes and returns all recorded outbound calls.
    pub fn take_outgoing(&self) -> Vec<Outgoing> {
        std::mem::take(&mut *self.outgoing.lock())
    }

    /// Waits until at least `count` outbound calls have been recorded.
    ///
    /// Returns `None` if `timeout` elapses first.
    pub async fn wait_for_outgoing(&self, count: usize, timeout: Duration) -> Option<Vec<Outgoing>> {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                {
                    let outgoing = self.outgoing.lock();
                    if outgoing.len() >= count {
                        return outgoing.clone();
                    }
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.ok()
    }

    fn record(&self, call: Outgoing) -> TransportResult<()> {
        if self.fail_outbound.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed("outbound disabled".to_string()));
        }
        trace!(?call, "Recording outbound call");
        self.outgoing.lock().push(call);
        self.notify.notify_waiters();
        Ok(())
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn receive(&self) -> TransportResult<Option<Event>> {
        Ok(self.events.lock().await.recv().await)
    }

    async fn reply(&self, chat: ChatId, text: &str, options: &ReplyOptions) -> TransportResult<()> {
        self.record(Outgoing::Reply {
            chat,
            text: text.to_string(),
            options: options.clone(),
        })
    }

    async fn acknowledge(&self, ack: &AckHandle, text: Option<&str>) -> TransportResult<()> {
        self.record(Outgoing::Ack {
            ack: ack.clone(),
            text: text.map(str::to_string),
        })
    }

    async fn edit(&self, ack: &AckHandle, text: &str, options: &ReplyOptions) -> TransportResult<()> {
        self.record(Outgoing::Edit {
            ack: ack.clone(),
            text: text.to_string(),
            options: options.clone(),
        })
    }
}

impl std::fmt::Debug for ChannelTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelTransport")
            .field("outgoing", &self.outgoing.lock().len())
            .finish_non_exhaustive()
    }
}
