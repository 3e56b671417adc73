//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use courier_framework::{
    AccessControl, DEFAULT_ERROR_REPLY_MAX_LEN, DEFAULT_HANDLER_TIMEOUT,
    DEFAULT_UNAUTHORIZED_MESSAGE, DispatchSettings,
};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Logging output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Whitelist and admin users.
    #[serde(default)]
    pub access: AccessConfig,

    /// Dispatch pipeline settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// How often the log file is rotated when writing to a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level, overridden by `RUST_LOG` when set.
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Log file, required for `output = "file"`.
    pub file_path: Option<PathBuf>,
    pub rotation: LogRotation,
    /// Include thread ids in log lines.
    pub thread_ids: bool,
    /// Include source file and line in log lines.
    pub file_location: bool,
    pub span_events: SpanEventConfig,
    /// Per-module levels, e.g. `courier_framework = "debug"`.
    pub filters: BTreeMap<String, LogLevel>,
}

// =============================================================================
// Access
// =============================================================================

/// Access control configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Allowed user ids. Absent means everyone is allowed.
    pub whitelist: Option<Vec<i64>>,
    /// Admin user ids.
    pub admins: Vec<i64>,
}

impl From<&AccessConfig> for AccessControl {
    fn from(config: &AccessConfig) -> Self {
        let access = AccessControl::new().with_admins(config.admins.iter().copied());
        match &config.whitelist {
            Some(ids) => access.with_whitelist(ids.iter().copied()),
            None => access,
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatch pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Per-handler timeout in milliseconds. `None` disables the timeout.
    pub handler_timeout_ms: Option<u64>,
    /// Notice sent to users outside the whitelist.
    pub unauthorized_message: String,
    /// Maximum length of the detail shown in error replies.
    pub error_reply_max_len: usize,
    /// How long shutdown waits for in-flight handlers.
    pub shutdown_grace_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            handler_timeout_ms: Some(DEFAULT_HANDLER_TIMEOUT.as_millis() as u64),
            unauthorized_message: DEFAULT_UNAUTHORIZED_MESSAGE.to_string(),
            error_reply_max_len: DEFAULT_ERROR_REPLY_MAX_LEN,
            shutdown_grace_ms: 5000,
        }
    }
}

impl DispatchConfig {
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Converts into the settings consumed by the dispatcher.
    pub fn settings(&self) -> DispatchSettings {
        DispatchSettings {
            handler_timeout: self.handler_timeout(),
            unauthorized_message: self.unauthorized_message.clone(),
            error_reply_max_len: self.error_reply_max_len,
        }
    }
}
