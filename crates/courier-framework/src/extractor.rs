//! Extractor system for the Courier framework.
//!
//! This module provides the [`FromContext`] trait, which defines how types
//! can be extracted from a [`Context`] for use as handler parameters.

use courier_core::{BoxedTransport, ChatId, User, UserId};

use crate::command::CommandArgs;
use crate::context::{CallbackContext, Context, MessageContext};
use crate::error::{ExtractError, ExtractResult};

/// A trait for types that can be extracted from a [`Context`].
///
/// Types implementing this trait can be used directly as handler function
/// parameters. A failed extraction aborts the invocation and is reported to
/// the user like any other handler failure.
///
/// # Example
///
/// ```rust,ignore
/// use courier::prelude::*;
///
/// struct Symbol(String);
///
/// impl FromContext for Symbol {
///     fn from_context(ctx: &Context) -> ExtractResult<Self> {
///         let msg = MessageContext::from_context(ctx)?;
///         Ok(Symbol(msg.args().str("symbol")?.to_uppercase()))
///     }
/// }
/// ```
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &Context) -> ExtractResult<Self>;
}

impl FromContext for Context {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(ctx.clone())
    }
}

impl FromContext for MessageContext {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        ctx.as_message()
            .cloned()
            .ok_or_else(|| ExtractError::ContextMismatch {
                expected: "command",
                got: ctx.kind().as_str(),
            })
    }
}

impl FromContext for CallbackContext {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        ctx.as_callback()
            .cloned()
            .ok_or_else(|| ExtractError::ContextMismatch {
                expected: "callback",
                got: ctx.kind().as_str(),
            })
    }
}

/// Extracts the parsed arguments of the matched command.
impl FromContext for CommandArgs {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        MessageContext::from_context(ctx).map(|msg| msg.args().clone())
    }
}

impl FromContext for User {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(ctx.user().clone())
    }
}

impl FromContext for UserId {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(ctx.user_id())
    }
}

impl FromContext for ChatId {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(ctx.chat_id())
    }
}

/// Implementation for extracting the transport, for sending beyond the
/// originating chat.
impl FromContext for BoxedTransport {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(ctx.transport().clone())
    }
}

/// Implementation for `Option<T>` where `T: FromContext`.
///
/// This allows handlers to have optional parameters that may or may not
/// be extractable from the context.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

/// Guard extractor that only succeeds for admin users.
///
/// ```rust,ignore
/// async fn shutdown(Admin(user): Admin) -> String {
///     format!("Shutting down on behalf of {}", user.id)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin(pub User);

impl FromContext for Admin {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        if ctx.is_admin() {
            Ok(Admin(ctx.user().clone()))
        } else {
            Err(ExtractError::NotAdmin {
                user: ctx.user_id(),
            })
        }
    }
}
