//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CourierConfig, DispatchConfig, LogOutput, LoggingConfig};

/// Smallest accepted `dispatch.error_reply_max_len`.
pub const MIN_ERROR_REPLY_LEN: usize = 16;

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_dispatch_config(&config.dispatch)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid logging filter module: {module:?}"
        )));
    }

    Ok(())
}

fn validate_dispatch_config(dispatch: &DispatchConfig) -> ConfigResult<()> {
    if dispatch.handler_timeout_ms == Some(0) {
        return Err(ConfigError::validation(
            "Handler timeout must be greater than 0",
        ));
    }

    if dispatch.shutdown_grace_ms == 0 {
        return Err(ConfigError::validation(
            "Shutdown grace period must be greater than 0",
        ));
    }

    if dispatch.error_reply_max_len < MIN_ERROR_REPLY_LEN {
        return Err(ConfigError::validation(format!(
            "Error reply length must be at least {MIN_ERROR_REPLY_LEN}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&CourierConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = CourierConfig::default();
        config.dispatch.handler_timeout_ms = Some(0);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.dispatch.handler_timeout_ms = None;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_grace() {
        let mut config = CourierConfig::default();
        config.dispatch.shutdown_grace_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_short_error_reply() {
        let mut config = CourierConfig::default();
        config.dispatch.error_reply_max_len = 15;
        assert!(validate_config(&config).is_err());
        config.dispatch.error_reply_max_len = MIN_ERROR_REPLY_LEN;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_file_output_without_path() {
        let mut config = CourierConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());
        config.logging.file_path = Some("courier.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
