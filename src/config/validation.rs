//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and required notifier credentials
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    #[error("request timeout must be positive")]
    ZeroRequestTimeout,

    #[error("api_key must not be empty when set")]
    EmptyApiKey,

    #[error("notifier is enabled but {0} is empty")]
    MissingNotifierOption(&'static str),

    #[error("notifier timeout must be positive")]
    ZeroNotifierTimeout,
}

/// Validate `config`, reporting every violation.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if matches!(&config.api_key, Some(key) if key.is_empty()) {
        errors.push(ValidationError::EmptyApiKey);
    }

    if config.notifier.enabled {
        let required = [
            ("endpoint", &config.notifier.endpoint),
            ("publish_key", &config.notifier.publish_key),
            ("subscribe_key", &config.notifier.subscribe_key),
            ("channel", &config.notifier.channel),
        ];
        for (name, value) in required {
            if value.is_empty() {
                errors.push(ValidationError::MissingNotifierOption(name));
            }
        }
        if config.notifier.timeout_secs == 0 {
            errors.push(ValidationError::ZeroNotifierTimeout);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn all_errors_are_reported() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nonsense".into();
        config.api_key = Some(String::new());
        config.notifier.enabled = true;
        config.notifier.channel = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidBindAddress("nonsense".into())));
        assert!(errors.contains(&ValidationError::EmptyApiKey));
        assert!(errors.contains(&ValidationError::MissingNotifierOption("endpoint")));
        assert!(errors.contains(&ValidationError::MissingNotifierOption("channel")));
        assert!(errors.len() >= 5);
    }
}
