//! # Courier
//!
//! A small, type-safe dispatch engine for chat bots.
//!
//! ## Overview
//!
//! Courier sits between a chat platform and your handlers. It decides who may
//! talk to the bot, turns `/commands` into typed arguments, routes inline
//! button presses by payload, and runs every handler inside an isolation
//! boundary so one failing, panicking or stuck handler never takes the bot
//! down.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────────────────────┐     ┌─────────────────────────┐
//! │  Transport  │────▶│ Runtime (one tracked task/event) │────▶│ Dispatcher              │
//! │ (platform)  │◀──┐ └──────────────────────────────────┘     │  access → route → invoke│
//! └─────────────┘   │                                          └────────────┬────────────┘
//!                   └─────────── replies / acks / edits ◀──── handlers ◀────┘
//! ```
//!
//! - **Transport**: yields events, carries replies back (`courier-core`)
//! - **Dispatcher**: access control, command and callback routing, handler
//!   isolation (`courier-framework`)
//! - **Runtime**: configuration, logging and the receive loop
//!   (`courier-runtime`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! async fn price(ctx: MessageContext, args: CommandArgs) -> HandlerResult {
//!     let symbol = args.str("symbol")?;
//!     ctx.reply(&format!("{symbol}: 42.00")).await?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = CourierRuntime::new();
//!     let (transport, events) = ChannelTransport::new();
//!
//!     let dispatcher = runtime.dispatcher(
//!         DispatcherBuilder::new()
//!             .command(Command::new("price", "Show a price", price).arg("symbol", ArgType::String))
//!             .help_command("help", "Show this help"),
//!         transport,
//!     );
//!
//!     runtime.run(dispatcher).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: Load `courier.toml` configuration files (default)
//! - `json-log`: Enable the JSON log format

pub use courier_core as core;
pub use courier_framework as framework;
pub use courier_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use courier_runtime::{CourierConfig, CourierRuntime, RuntimeError, RuntimeResult};

    // Dispatch pipeline
    pub use courier_framework::{
        AccessControl, CallbackMatcher, DispatchOutcome, Dispatcher, DispatcherBuilder,
    };

    // Commands
    pub use courier_framework::{ArgType, ArgValue, Command, CommandArgs};

    // Handlers and extractors
    pub use courier_framework::{
        Admin, BoxError, CallbackContext, Context, ExtractError, FromContext, HandlerResult,
        MessageContext,
    };

    // Platform types
    pub use courier_core::{
        AckHandle, BoxedTransport, ChannelTransport, ChatId, Event, InlineKeyboard, ParseMode,
        ReplyOptions, Transport, TransportError, TransportResult, User, UserId,
    };
}
