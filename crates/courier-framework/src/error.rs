//! Error types for the Courier framework.
//!
//! Every failure on the dispatch path is an explicit value:
//!
//! - [`AuthorizationError`]: the user may not use the bot; raised before lookup
//! - [`ArgumentParseError`]: a command argument failed coercion or is missing
//! - [`ExtractError`]: a handler asked for data its context does not carry
//! - [`HandlerError`]: anything that went wrong inside a handler invocation

use std::time::Duration;

use thiserror::Error;

use crate::command::ArgType;
use courier_core::UserId;

pub use tower::BoxError;

/// What a handler body returns once its response has been processed.
pub type HandlerResult = Result<(), BoxError>;

/// The user is not on the whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user {user} is not authorized")]
pub struct AuthorizationError {
    pub user: UserId,
}

/// A command argument could not be parsed.
///
/// Parsing stops at the first failing argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentParseError {
    /// The token could not be coerced into the declared type.
    #[error("invalid value for {name}: '{token}' is not a valid {expected}")]
    Invalid {
        /// Command the argument belongs to.
        command: String,
        /// Declared argument name.
        name: String,
        /// The offending token.
        token: String,
        /// Declared type.
        expected: ArgType,
    },

    /// A required argument was not supplied.
    #[error("missing argument: {name}")]
    Missing {
        /// Command the argument belongs to.
        command: String,
        /// Declared argument name.
        name: String,
    },
}

impl ArgumentParseError {
    /// Returns the name of the command whose arguments failed to parse.
    pub fn command(&self) -> &str {
        match self {
            Self::Invalid { command, .. } | Self::Missing { command, .. } => command,
        }
    }
}

/// Errors that can occur during context extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The handler asked for the other context variant.
    #[error("context mismatch: expected {expected} context, got {got}")]
    ContextMismatch {
        expected: &'static str,
        got: &'static str,
    },

    /// A named command argument was not present.
    #[error("argument '{name}' was not supplied")]
    MissingArgument { name: String },

    /// A command argument has a different type than requested.
    #[error("argument '{name}' is not a {expected}")]
    ArgumentType { name: String, expected: ArgType },

    /// The handler requires an admin and the user is not one.
    #[error("admin privileges required")]
    NotAdmin { user: UserId },

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// A failure contained by the dispatcher's isolation boundary.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("{0}")]
    Failed(#[source] BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// The handler did not finish within the configured timeout.
    #[error("handler timed out after {0:?}")]
    Timeout(Duration),

    /// A handler parameter could not be extracted.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl HandlerError {
    /// Returns `true` if the handler was cancelled by the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
