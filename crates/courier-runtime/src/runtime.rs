//! The event loop that feeds a transport into a dispatcher.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use courier_runtime::CourierRuntime;
//!
//! // Auto-loads courier.toml from the current directory
//! let runtime = CourierRuntime::new();
//!
//! let dispatcher = runtime.dispatcher(
//!     DispatcherBuilder::new().command(Command::new("status", "Show status", status)),
//!     transport,
//! );
//!
//! // Runs until the event stream ends or Ctrl+C
//! runtime.run(dispatcher).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::signal;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use courier_core::BoxedTransport;
use courier_framework::{AccessControl, DispatchOutcome, Dispatcher, DispatcherBuilder};

use crate::config::{ConfigLoader, ConfigResult, CourierConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Receives events from a transport and dispatches each on its own task.
///
/// # Custom Configuration
///
/// ```rust,ignore
/// let runtime = CourierRuntime::builder()
///     .config_file("config/courier.toml")
///     .profile("production")
///     .set("access.admins", vec![42])
///     .build()?;
/// ```
pub struct CourierRuntime {
    config: CourierConfig,
    stats: Arc<RuntimeStats>,
    /// Tracks in-flight dispatch tasks.
    tracker: TaskTracker,
}

impl CourierRuntime {
    /// Creates a new runtime with automatic configuration loading.
    ///
    /// If no configuration can be loaded, default settings are used.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                CourierConfig::default()
            });

        Self::from_config(config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a new runtime from configuration and initializes logging.
    pub fn from_config(config: CourierConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            restricted = config.access.whitelist.is_some(),
            admins = config.access.admins.len(),
            "Runtime initialized from configuration"
        );

        Self {
            config,
            stats: Arc::new(RuntimeStats::default()),
            tracker: TaskTracker::new(),
        }
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// Returns the live event counters.
    pub fn stats(&self) -> &Arc<RuntimeStats> {
        &self.stats
    }

    /// Number of events currently being dispatched.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Finalizes a dispatcher with the configured access control and
    /// dispatch settings.
    ///
    /// Any access control or settings set on `builder` are replaced.
    pub fn dispatcher(&self, builder: DispatcherBuilder, transport: BoxedTransport) -> Dispatcher {
        builder
            .access(AccessControl::from(&self.config.access))
            .settings(self.config.dispatch.settings())
            .build(transport)
    }

    /// Runs until the event stream ends or a shutdown signal (Ctrl+C or
    /// SIGTERM) is received.
    pub async fn run(&self, dispatcher: Dispatcher) -> RuntimeResult<()> {
        info!("Courier runtime is now running. Press Ctrl+C to stop.");
        self.run_until(dispatcher, shutdown_signal()).await
    }

    /// Runs until the event stream ends or `shutdown` completes.
    ///
    /// In both cases the loop stops receiving and waits for in-flight
    /// handlers, bounded by `dispatch.shutdown_grace_ms`. A receive error
    /// stops the loop the same way and is then returned.
    pub async fn run_until<F>(&self, dispatcher: Dispatcher, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.tracker.reopen();
        let transport = dispatcher.transport().clone();
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break Ok(());
                }
                received = transport.receive() => match received {
                    Ok(Some(event)) => {
                        self.stats.received.fetch_add(1, Ordering::Relaxed);
                        let dispatcher = dispatcher.clone();
                        let stats = Arc::clone(&self.stats);
                        self.tracker.spawn(async move {
                            let outcome = dispatcher.dispatch(event).await;
                            stats.record(&outcome);
                        });
                    }
                    Ok(None) => {
                        info!("Event stream ended");
                        break Ok(());
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to receive event");
                        break Err(RuntimeError::from(e));
                    }
                },
            }
        };

        self.drain().await;
        result
    }

    async fn drain(&self) {
        self.tracker.close();
        let grace = self.config.dispatch.shutdown_grace();
        debug!(in_flight = self.tracker.len(), ?grace, "Waiting for in-flight handlers");

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!(
                in_flight = self.tracker.len(),
                ?grace,
                "Shutdown grace period elapsed with handlers still running"
            );
        }

        let stats = self.stats.snapshot();
        info!(
            received = stats.received,
            handled = stats.handled,
            failed = stats.failed,
            "Runtime stopped"
        );
    }
}

impl Default for CourierRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Completes on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Counters of processed events, grouped by [`DispatchOutcome`].
#[derive(Debug, Default)]
pub struct RuntimeStats {
    received: AtomicU64,
    handled: AtomicU64,
    failed: AtomicU64,
    unauthorized: AtomicU64,
    ignored: AtomicU64,
    invalid: AtomicU64,
}

impl RuntimeStats {
    fn record(&self, outcome: &DispatchOutcome) {
        let counter = match outcome {
            DispatchOutcome::Handled => &self.handled,
            DispatchOutcome::Failed(_) => &self.failed,
            DispatchOutcome::Unauthorized => &self.unauthorized,
            DispatchOutcome::Ignored => &self.ignored,
            DispatchOutcome::InvalidArguments => &self.invalid,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            handled: self.handled.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            unauthorized: self.unauthorized.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`RuntimeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub handled: u64,
    pub failed: u64,
    pub unauthorized: u64,
    pub ignored: u64,
    /// Commands rejected for bad arguments.
    pub invalid: u64,
}

impl StatsSnapshot {
    /// Events whose dispatch has finished.
    pub fn completed(&self) -> u64 {
        self.handled + self.failed + self.unauthorized + self.ignored + self.invalid
    }
}

/// Builder for creating a [`CourierRuntime`] with custom configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Replaces the built-in defaults.
    pub fn defaults(mut self, config: CourierConfig) -> Self {
        self.config_loader = self.config_loader.defaults(config);
        self
    }

    /// Overrides a single value by dotted key.
    pub fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> ConfigResult<CourierRuntime> {
        let config = self.config_loader.load()?;
        Ok(CourierRuntime::from_config(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
