//! # Courier Core
//!
//! Protocol-neutral building blocks shared by every Courier crate:
//!
//! - [`Event`] and its two variants, the unit of work handed to the dispatcher
//! - [`UserId`], [`ChatId`] and [`User`] identifiers
//! - [`ReplyOptions`], [`ParseMode`] and [`InlineKeyboard`] for outbound messages
//! - The [`Transport`] trait, the seam to a concrete chat platform
//! - [`ChannelTransport`], an in-memory transport used for embedding and tests
//!
//! Nothing in this crate makes routing decisions; that lives in
//! `courier-framework`.

pub mod error;
pub mod event;
pub mod markup;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use event::{AckHandle, CallbackEvent, ChatId, CommandEvent, Event, EventKind, User, UserId};
pub use markup::{ButtonAction, InlineButton, InlineKeyboard, InlineKeyboardBuilder, ParseMode, ReplyOptions};
pub use transport::{BoxedTransport, ChannelTransport, EventSender, Outgoing, Transport};
