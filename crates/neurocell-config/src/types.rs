// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a table in `neurocell.toml`. Every table and key is
//! optional; missing values take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Morphology used when none is configured
pub const DEFAULT_MORPHOLOGY: &str = "Rorb-IRES2-Cre-D_Ai14_IVSCC_-171056.05.01.01_470521767_m.swc";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeurocellConfig {
    pub cell: CellConfig,
    pub discretization: DiscretizationConfig,
    pub logging: LoggingConfig,
}

/// Which cell to build and where to put it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CellConfig {
    /// Cell identifier; the builder's default name when absent
    pub name: Option<String>,
    pub morphology: PathBuf,
    /// Translation applied to every traced point (µm)
    pub offset: [f64; 3],
    /// Fitted-parameter JSON replacing the built-in table
    pub parameters: Option<PathBuf>,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            name: None,
            morphology: PathBuf::from(DEFAULT_MORPHOLOGY),
            offset: [0.0; 3],
            parameters: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscretizationConfig {
    pub segment_length_um: f64,
}

impl Default for DiscretizationConfig {
    fn default() -> Self {
        Self {
            segment_length_um: 40.0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_logging: bool,
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: PathBuf::from("./logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_tables_fill_defaults() {
        let config: NeurocellConfig = toml::from_str(
            r#"
            [cell]
            name = "cell_a"
            offset = [1.0, 2.0, 3.0]

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.cell.name.as_deref(), Some("cell_a"));
        assert_eq!(config.cell.offset, [1.0, 2.0, 3.0]);
        assert_eq!(config.cell.morphology, PathBuf::from(DEFAULT_MORPHOLOGY));
        assert!(config.cell.parameters.is_none());
        assert_eq!(config.discretization.segment_length_um, 40.0);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.file_logging);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(NeurocellConfig::default()).unwrap();
        assert_eq!(json["discretization"]["segment_length_um"], 40.0);
        assert_eq!(json["logging"]["log_dir"], "./logs");
        assert!(json["cell"]["name"].is_null());
    }
}
