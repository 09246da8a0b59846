// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurocell
//!
//! Builds a biophysically detailed single-neuron model from an SWC
//! reconstruction: traced soma and dendrites, a standard axon stub, eleven
//! active ion-channel mechanisms in the soma, a fitted parameter table and a
//! length-based discretization. The finished [`CellModel`](cell::CellModel)
//! is plain data that a compartmental simulator instantiates through
//! [`SimulationSubstrate`](cell::SimulationSubstrate).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neurocell::prelude::*;
//!
//! let config = load_config(None, None)?;
//! let cell = neurocell::build_from_config(&config)?;
//! for section in cell.soma() {
//!     println!("{} has {} mechanisms", section.name(), section.mechanisms().len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crates
//! - [`morphology`]: SWC parsing into an immutable section tree
//! - [`cell`]: sections, mechanisms, parameters, builder, substrate seam
//! - [`config`]: `neurocell.toml` with environment and CLI overrides
//! - [`observability`]: logging setup and `--debug-<crate>` flags

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use neurocell_cell as cell;
pub use neurocell_config as config;
pub use neurocell_morphology as morphology;
pub use neurocell_observability as observability;

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use tracing::info;

use neurocell_cell::{CellError, CellModel, CellModelBuilder, ParameterSet, Point3, SegmentRule};
use neurocell_config::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config, validate_config,
    ConfigError, LoggingConfig, NeurocellConfig,
};
use neurocell_morphology::SwcLoader;
use neurocell_observability::LoggingOptions;

pub mod prelude {
    pub use crate::cell::{
        load_cell, CellError, CellModel, CellModelBuilder, Field, Mechanism, ParameterSet, Point3,
        RecordingSubstrate, Section, SectionGroup, SimulationSubstrate,
    };
    pub use crate::config::{load_config, validate_config, NeurocellConfig};
    pub use crate::morphology::{LoadOptions, MorphologyLoader, MorphologyTree, SwcLoader};
    pub use crate::NeurocellError;
}

/// Errors from configuration-driven construction
#[derive(Debug, thiserror::Error)]
pub enum NeurocellError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cell(#[from] CellError),
}

/// Configuration plus the file it came from, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: NeurocellConfig,
    pub source: Option<PathBuf>,
}

/// Resolve the effective configuration for a tool run
///
/// An explicit `config_path`, or a `NEUROCELL_CONFIG_PATH` naming a missing
/// file, is an error when it cannot be loaded. Only when nothing was named
/// and the search finds no `neurocell.toml` do built-in defaults apply, with
/// environment and `cli_args` overrides on top.
pub fn resolve_config(
    config_path: Option<&Path>,
    cli_args: &HashMap<String, String>,
) -> Result<ResolvedConfig, NeurocellError> {
    let source = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => match find_config_file() {
            Ok(path) => Some(path),
            Err(err) if env::var_os("NEUROCELL_CONFIG_PATH").is_some() => return Err(err.into()),
            Err(_) => None,
        },
    };

    let config = match &source {
        Some(path) => load_config(Some(path), Some(cli_args))?,
        None => {
            let mut config = NeurocellConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, cli_args);
            config
        }
    };
    Ok(ResolvedConfig { config, source })
}

/// Validate `config` and build the cell it describes
///
/// Uses the fitted-parameter file from `[cell].parameters` when given,
/// otherwise the built-in table.
pub fn build_from_config(config: &NeurocellConfig) -> Result<CellModel, NeurocellError> {
    validate_config(config)?;

    let parameters = match &config.cell.parameters {
        Some(path) => ParameterSet::from_fit_file(path)?,
        None => ParameterSet::builtin(),
    };

    let mut builder = CellModelBuilder::new()
        .with_offset(Point3::from(config.cell.offset))
        .with_parameters(parameters)
        .with_segment_rule(SegmentRule::new(config.discretization.segment_length_um));
    if let Some(name) = &config.cell.name {
        builder = builder.with_name(name.clone());
    }

    let model = builder.build_from_file(&SwcLoader::new(), &config.cell.morphology)?;
    info!(
        target: "neurocell",
        "Cell {} ready from {} ({} sections)",
        model,
        config.cell.morphology.display(),
        model.all_ids().len()
    );
    Ok(model)
}

/// Logging setup described by the `[logging]` table
pub fn logging_options(logging: &LoggingConfig) -> LoggingOptions {
    LoggingOptions {
        level: logging.level.clone(),
        file_logging: logging.file_logging,
        log_dir: logging.log_dir.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_resolve_config_env_path_missing_is_error() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("neurocell.toml");

        env::set_var("NEUROCELL_CONFIG_PATH", &missing);
        let result = resolve_config(None, &HashMap::new());
        env::remove_var("NEUROCELL_CONFIG_PATH");

        assert!(matches!(
            result,
            Err(NeurocellError::Config(ConfigError::FileNotFound(_)))
        ));
    }

    #[test]
    fn test_resolve_config_env_path_loaded() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("neurocell.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "[cell]").unwrap();
        writeln!(file, "name = \"from_file\"").unwrap();

        let mut cli_args = HashMap::new();
        cli_args.insert("morphology".to_string(), "cli.swc".to_string());

        env::set_var("NEUROCELL_CONFIG_PATH", &path);
        let resolved = resolve_config(None, &cli_args);
        env::remove_var("NEUROCELL_CONFIG_PATH");

        let resolved = resolved.unwrap();
        assert_eq!(resolved.source.as_deref(), Some(path.as_path()));
        assert_eq!(resolved.config.cell.name.as_deref(), Some("from_file"));
        assert_eq!(resolved.config.cell.morphology, PathBuf::from("cli.swc"));
    }

    #[test]
    fn test_resolve_config_explicit_missing_is_error() {
        let dir = tempdir().unwrap();
        let result = resolve_config(Some(&dir.path().join("absent.toml")), &HashMap::new());
        assert!(matches!(result, Err(NeurocellError::Config(ConfigError::IoError(_)))));
    }

    #[test]
    fn test_invalid_config_rejected_before_loading() {
        let mut config = NeurocellConfig::default();
        config.discretization.segment_length_um = -1.0;
        config.cell.morphology = PathBuf::from("/nonexistent/cell.swc");
        let err = build_from_config(&config).unwrap_err();
        assert!(matches!(err, NeurocellError::Config(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_morphology_is_cell_error() {
        let mut config = NeurocellConfig::default();
        config.cell.morphology = PathBuf::from("/nonexistent/cell.swc");
        let err = build_from_config(&config).unwrap_err();
        assert!(matches!(err, NeurocellError::Cell(CellError::Morphology(_))));
    }

    #[test]
    fn test_logging_options_from_config() {
        let options = logging_options(&LoggingConfig::default());
        assert_eq!(options, LoggingOptions::default());
    }
}
