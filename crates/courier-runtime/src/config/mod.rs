//! Configuration module for the Courier runtime.
//!
//! This module provides layered, figment-based configuration loading and
//! validation for logging, access control and dispatch settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    AccessConfig, CourierConfig, DispatchConfig, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, SpanEventConfig,
};
pub use validation::validate_config;
