//! Handler system for the Courier framework.
//!
//! Handlers are plain async functions. Every parameter is extracted from the
//! invocation [`Context`] through [`FromContext`], and the return value is
//! turned into a reply through [`HandlerResponse`]:
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! async fn status() -> String {
//!     "All systems nominal".to_string()
//! }
//!
//! async fn buy(msg: MessageContext, args: CommandArgs) -> HandlerResult {
//!     let amount = args.int("amount")?;
//!     msg.reply(&format!("Bought {amount}")).await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::Context;
use crate::error::{BoxError, HandlerResult};
use crate::extractor::FromContext;

/// The core trait for event handlers.
///
/// Automatically implemented for async functions that take up to four
/// [`FromContext`] parameters and return a [`HandlerResponse`]. An extraction
/// failure ends the call with the [`ExtractError`](crate::error::ExtractError)
/// as its error.
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// The type of future calling this handler returns.
    type Future: Future<Output = HandlerResult> + Send + 'static;

    /// Call the handler with the given context.
    fn call(self, ctx: Context) -> Self::Future;
}

/// Values a handler may return.
#[async_trait]
pub trait HandlerResponse: Send {
    /// Delivers the value to the user, if it carries anything to deliver.
    async fn respond(self, ctx: &Context) -> HandlerResult;
}

#[async_trait]
impl HandlerResponse for () {
    async fn respond(self, _ctx: &Context) -> HandlerResult {
        Ok(())
    }
}

/// A returned string is sent back to the user.
///
/// Transport failures are logged and not treated as handler failures.
#[async_trait]
impl HandlerResponse for String {
    async fn respond(self, ctx: &Context) -> HandlerResult {
        if let Err(e) = ctx.notify(&self).await {
            tracing::warn!(error = %e, "Failed to deliver handler response");
        }
        Ok(())
    }
}

#[async_trait]
impl HandlerResponse for &'static str {
    async fn respond(self, ctx: &Context) -> HandlerResult {
        self.to_string().respond(ctx).await
    }
}

#[async_trait]
impl<T: HandlerResponse> HandlerResponse for Option<T> {
    async fn respond(self, ctx: &Context) -> HandlerResult {
        match self {
            Some(value) => value.respond(ctx).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<T, E> HandlerResponse for Result<T, E>
where
    T: HandlerResponse,
    E: Into<BoxError> + Send,
{
    async fn respond(self, ctx: &Context) -> HandlerResult {
        match self {
            Ok(value) => value.respond(ctx).await,
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Type erasure
// ============================================================================

/// A wrapper that converts a function into a boxed handler.
pub struct HandlerFn<F, T> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> HandlerFn<F, T> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F: Clone, T> Clone for HandlerFn<F, T> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

/// A type-erased handler that can be stored in registries.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync>;

/// Type-erased handler trait for dynamic dispatch.
pub trait ErasedHandler: Send + Sync {
    /// Execute the handler with the given context.
    fn call(&self, ctx: Context) -> BoxFuture<'static, HandlerResult>;
}

impl<F, T> ErasedHandler for HandlerFn<F, T>
where
    F: Handler<T>,
    T: 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture<'static, HandlerResult> {
        let f = self.f.clone();
        Box::pin(f.call(ctx))
    }
}

/// Convert a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(HandlerFn::new(f))
}

// ============================================================================
// Handler implementations for functions
// ============================================================================

impl<F, Fut, R> Handler<((), R)> for F
where
    F: FnOnce() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: HandlerResponse + 'static,
{
    type Future = BoxFuture<'static, HandlerResult>;

    fn call(self, ctx: Context) -> Self::Future {
        Box::pin(async move { (self)().await.respond(&ctx).await })
    }
}

/// Generates [`Handler`] implementations for functions with extractor parameters.
macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        impl<F, Fut, R, $($ty,)*> Handler<(($($ty,)*), R)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: HandlerResponse + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            type Future = BoxFuture<'static, HandlerResult>;

            fn call(self, ctx: Context) -> Self::Future {
                Box::pin(async move {
                    $(
                        let $ty = $ty::from_context(&ctx)?;
                    )*

                    (self)($($ty,)*).await.respond(&ctx).await
                })
            }
        }
    };
}

impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
