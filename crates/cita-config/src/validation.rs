// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid hosts, non-empty paths, and page size bounds.

use crate::diagnostic::ConfigError;
use crate::model::CitaConfig;

/// Hard ceiling for listing page sizes.
pub const PAGE_SIZE_CEILING: u32 = 100;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CitaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be non-zero".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.server.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.log_level `{}` must be one of {}",
                config.server.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let scheduling = &config.scheduling;
    if scheduling.max_page_size == 0 || scheduling.max_page_size > PAGE_SIZE_CEILING {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduling.max_page_size must be between 1 and {PAGE_SIZE_CEILING}, got {}",
                scheduling.max_page_size
            ),
        });
    }

    if scheduling.default_page_size == 0 || scheduling.default_page_size > scheduling.max_page_size
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduling.default_page_size must be between 1 and max_page_size ({}), got {}",
                scheduling.max_page_size, scheduling.default_page_size
            ),
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

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = CitaConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = CitaConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn bad_host_fails_validation() {
        let mut config = CitaConfig::default();
        config.server.host = "not a host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "server.host"));
    }

    #[test]
    fn zero_port_fails_validation() {
        let mut config = CitaConfig::default();
        config.server.port = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "server.port"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = CitaConfig::default();
        config.server.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "log_level"));
    }

    #[test]
    fn page_sizes_must_be_ordered_and_bounded() {
        let mut config = CitaConfig::default();
        config.scheduling.max_page_size = 500;
        config.scheduling.default_page_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_message(&errors, "max_page_size must be between"));
        assert!(has_message(&errors, "default_page_size"));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = CitaConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 9000;
        config.storage.database_path = "/tmp/test.db".to_string();
        config.scheduling.default_page_size = 25;
        config.scheduling.max_page_size = 50;
        assert!(validate_config(&config).is_ok());
    }
}
