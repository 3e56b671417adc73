//! The isolation boundary around a single handler invocation.
//!
//! [`HandlerService`] adapts a [`BoxedHandler`] into a
//! `tower::Service<Context>` that also catches panics. [`invoke`] stacks the
//! optional timeout on top and folds every failure into a [`HandlerError`].

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::task::Poll;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower::{BoxError, Service, ServiceBuilder, ServiceExt};

use crate::context::Context;
use crate::error::{ExtractError, HandlerError};
use crate::handler::BoxedHandler;

/// Raised in place of a panic that escaped a handler.
#[derive(Debug)]
struct PanicError(String);

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for PanicError {}

/// A tower [`Service`] that runs one boxed handler with panics caught.
#[derive(Clone)]
pub struct HandlerService {
    handler: BoxedHandler,
}

impl HandlerService {
    pub fn new(handler: BoxedHandler) -> Self {
        Self { handler }
    }
}

impl Service<Context> for HandlerService {
    type Response = ();
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<(), BoxError>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: Context) -> Self::Future {
        let handler = self.handler.clone();
        Box::pin(async move {
            match AssertUnwindSafe(async move { handler.call(ctx).await })
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => Err(Box::new(PanicError(panic_message(payload))) as BoxError),
            }
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Runs `handler` against `ctx`, bounded by `timeout` when set.
pub async fn invoke(
    handler: BoxedHandler,
    ctx: Context,
    timeout: Option<Duration>,
) -> Result<(), HandlerError> {
    let service = ServiceBuilder::new()
        .option_layer(timeout.map(TimeoutLayer::new))
        .service(HandlerService::new(handler));

    service
        .oneshot(ctx)
        .await
        .map_err(|e| classify(e, timeout))
}

fn classify(err: BoxError, timeout: Option<Duration>) -> HandlerError {
    if err.is::<Elapsed>() {
        return HandlerError::Timeout(timeout.unwrap_or_default());
    }
    let err = match err.downcast::<ExtractError>() {
        Ok(e) => return HandlerError::Extract(*e),
        Err(err) => err,
    };
    match err.downcast::<PanicError>() {
        Ok(panic) => HandlerError::Panicked(panic.0),
        Err(err) => HandlerError::Failed(err),
    }
}
