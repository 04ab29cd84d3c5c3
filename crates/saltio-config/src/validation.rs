// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty identifiers, known log levels, and
//! positive scheduler intervals.

use crate::diagnostic::ConfigError;
use crate::model::SaltioConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SaltioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.service.log_level
            ),
        });
    }

    if config.facility.company_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "facility.company_id must not be empty".to_string(),
        });
    }

    if config.facility.hourly_rate < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "facility.hourly_rate must be non-negative, got {}",
                config.facility.hourly_rate
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.reconcile.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "reconcile.sweep_interval_secs must be at least 1".to_string(),
        });
    }

    if config.reconcile.cleanup_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "reconcile.cleanup_interval_secs must be at least 1".to_string(),
        });
    }

    if config.reconcile.suppression_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "reconcile.suppression_ttl_secs must be at least 1".to_string(),
        });
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
    use crate::model::SaltioConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&SaltioConfig::default()).is_ok());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = SaltioConfig::default();
        config.service.log_level = "loud".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("log_level"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = SaltioConfig::default();
        config.facility.company_id = "  ".into();
        config.storage.database_path = String::new();
        config.reconcile.sweep_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_negative_hourly_rate() {
        let mut config = SaltioConfig::default();
        config.facility.hourly_rate = -1.0;
        assert!(validate_config(&config).is_err());
    }
}
