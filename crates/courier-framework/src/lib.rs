//! # Courier Framework
//!
//! The dispatch engine of Courier.
//!
//! This layer provides:
//! - [`AccessControl`] for whitelist and admin decisions
//! - [`CommandRegistry`] with typed argument schemas
//! - [`CallbackRouter`] with first-match-wins button routing
//! - Axum-style [`Handler`]s with [`FromContext`] extractors
//! - The [`Dispatcher`], which isolates every handler invocation so that a
//!   failing, panicking or stuck handler never affects other events

pub mod access;
pub mod callback;
pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod service;

pub use access::AccessControl;
pub use callback::{CallbackMatcher, CallbackRoute, CallbackRouter};
pub use command::{
    ArgKey, ArgSpec, ArgType, ArgValue, Command, CommandArgs, CommandRegistry, ParsedCommand,
};
pub use context::{CallbackContext, Context, MessageContext};
pub use dispatcher::{
    DEFAULT_ERROR_REPLY_MAX_LEN, DEFAULT_HANDLER_TIMEOUT, DEFAULT_UNAUTHORIZED_MESSAGE,
    DispatchOutcome, DispatchSettings, Dispatcher, DispatcherBuilder,
};
pub use error::{
    ArgumentParseError, AuthorizationError, BoxError, ExtractError, ExtractResult, HandlerError,
    HandlerResult,
};
pub use extractor::{Admin, FromContext};
pub use handler::{BoxedHandler, ErasedHandler, Handler, HandlerFn, HandlerResponse, into_handler};
pub use service::HandlerService;
