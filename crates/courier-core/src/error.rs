//! Transport error types.
//!
//! Routing and handler errors are defined in `courier-framework`; this module
//! only covers failures talking to the chat platform.

use thiserror::Error;

/// Errors that can occur in transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The event stream or outbound channel has been closed.
    #[error("transport closed: {reason}")]
    Closed {
        /// Reason for closure.
        reason: String,
    },

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Acknowledging a callback failed.
    #[error("failed to acknowledge callback '{ack}': {reason}")]
    AckFailed {
        /// The callback handle that could not be acknowledged.
        ack: String,
        /// Reason for failure.
        reason: String,
    },

    /// Editing the message behind a callback failed.
    #[error("failed to edit message: {0}")]
    EditFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Creates a closed error with the given reason.
    pub fn closed(reason: impl Into<String>) -> Self {
        Self::Closed {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
