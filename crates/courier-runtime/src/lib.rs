//! Courier Runtime - configuration, logging and the event loop.
//!
//! This crate provides:
//! - Layered configuration (`courier.toml`, profile files, `COURIER_*` env)
//! - Logging setup over `tracing-subscriber`
//! - [`CourierRuntime`], which pulls events from a transport and dispatches
//!   each on a tracked task until the stream ends or a shutdown signal arrives
//!
//! ```ignore
//! use courier_runtime::CourierRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = CourierRuntime::new();
//!     let dispatcher = runtime.dispatcher(build_handlers(), transport);
//!
//!     // Run until the stream ends or Ctrl+C
//!     runtime.run(dispatcher).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, CourierConfig, Profile};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{CourierRuntime, RuntimeBuilder, RuntimeStats, StatsSnapshot, shutdown_signal};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
