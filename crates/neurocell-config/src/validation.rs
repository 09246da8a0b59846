// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! All problems are collected before failing so a user sees every bad value
//! at once.

use crate::{ConfigError, ConfigResult, NeurocellConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &NeurocellConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every problem in `config`, in table order
pub fn collect_errors(config: &NeurocellConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_cell(config, &mut errors);
    validate_discretization(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_cell(config: &NeurocellConfig, errors: &mut Vec<ConfigValidationError>) {
    if let Some(name) = &config.cell.name {
        if name.trim().is_empty() {
            errors.push(ConfigValidationError::InvalidValue {
                field: "cell.name".to_string(),
                reason: "must not be empty when given".to_string(),
            });
        }
    }
    if config.cell.morphology.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "cell.morphology".to_string(),
        });
    }
    if config.cell.offset.iter().any(|c| !c.is_finite()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "cell.offset".to_string(),
            reason: format!("{:?} contains a non-finite coordinate", config.cell.offset),
        });
    }
}

fn validate_discretization(config: &NeurocellConfig, errors: &mut Vec<ConfigValidationError>) {
    let length = config.discretization.segment_length_um;
    if !(length.is_finite() && length > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "discretization.segment_length_um".to_string(),
            reason: format!("{} must be a positive number", length),
        });
    }
}

fn validate_logging(config: &NeurocellConfig, errors: &mut Vec<ConfigValidationError>) {
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join("/")),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_default_config() {
        assert!(collect_errors(&NeurocellConfig::default()).is_empty());
    }

    #[test]
    fn test_all_errors_collected() {
        let mut config = NeurocellConfig::default();
        config.cell.name = Some("  ".to_string());
        config.cell.morphology = PathBuf::new();
        config.cell.offset = [0.0, f64::INFINITY, 0.0];
        config.discretization.segment_length_um = 0.0;
        config.logging.level = "verbose".to_string();

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 5);
        assert_eq!(
            errors[1],
            ConfigValidationError::MissingRequired {
                field: "cell.morphology".to_string()
            }
        );

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("discretization.segment_length_um"));
        assert!(message.contains("logging.level"));
    }

    #[test]
    fn test_nan_segment_length_rejected() {
        let mut config = NeurocellConfig::default();
        config.discretization.segment_length_um = f64::NAN;
        assert!(matches!(validate_config(&config), Err(ConfigError::ValidationError(_))));
    }
}
