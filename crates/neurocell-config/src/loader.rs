// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, NeurocellConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "neurocell.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `NEUROCELL_CONFIG_PATH` environment variable
/// 2. Current working directory: `./neurocell.toml`
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NEUROCELL_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NEUROCELL_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(cwd.ancestors().skip(1).take(5).map(|dir| dir.join(CONFIG_FILE_NAME)));
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet NEUROCELL_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Validation is a separate step (see [`crate::validate_config`]).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NeurocellConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NeurocellConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEUROCELL_CELL_NAME` -> `cell.name`
/// - `NEUROCELL_MORPHOLOGY` -> `cell.morphology`
/// - `NEUROCELL_PARAMETERS` -> `cell.parameters`
/// - `NEUROCELL_OFFSET` -> `cell.offset` (`x,y,z`)
/// - `NEUROCELL_SEGMENT_LENGTH` -> `discretization.segment_length_um`
/// - `NEUROCELL_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut NeurocellConfig) {
    let lookup = |key: &str| env::var(key).ok();
    apply_overrides(config, |key| match key {
        "name" => lookup("NEUROCELL_CELL_NAME"),
        "morphology" => lookup("NEUROCELL_MORPHOLOGY"),
        "parameters" => lookup("NEUROCELL_PARAMETERS"),
        "offset" => lookup("NEUROCELL_OFFSET"),
        "segment_length" => lookup("NEUROCELL_SEGMENT_LENGTH"),
        "log_level" => lookup("NEUROCELL_LOG_LEVEL"),
        _ => None,
    });
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"name": "cell_1", "offset": "0,0,10"}`)
pub fn apply_cli_overrides(config: &mut NeurocellConfig, cli_args: &HashMap<String, String>) {
    apply_overrides(config, |key| cli_args.get(key).cloned());
}

fn apply_overrides(config: &mut NeurocellConfig, get: impl Fn(&str) -> Option<String>) {
    if let Some(value) = get("name") {
        config.cell.name = Some(value);
    }
    if let Some(value) = get("morphology") {
        config.cell.morphology = PathBuf::from(value);
    }
    if let Some(value) = get("parameters") {
        config.cell.parameters = Some(PathBuf::from(value));
    }
    if let Some(value) = get("offset") {
        if let Some(offset) = parse_offset(&value) {
            config.cell.offset = offset;
        }
    }
    if let Some(value) = get("segment_length") {
        if let Ok(length) = value.trim().parse::<f64>() {
            config.discretization.segment_length_um = length;
        }
    }
    if let Some(value) = get("log_level") {
        config.logging.level = value.to_lowercase();
    }
}

/// Parse `x,y,z`
pub fn parse_offset(value: &str) -> Option<[f64; 3]> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [x, y, z] => Some([*x, *y, *z]),
        _ => None,
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

    const OVERRIDE_VARS: [&str; 6] = [
        "NEUROCELL_CELL_NAME",
        "NEUROCELL_MORPHOLOGY",
        "NEUROCELL_PARAMETERS",
        "NEUROCELL_OFFSET",
        "NEUROCELL_SEGMENT_LENGTH",
        "NEUROCELL_LOG_LEVEL",
    ];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        File::create(&config_path).unwrap();

        env::set_var("NEUROCELL_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("NEUROCELL_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        env::set_var("NEUROCELL_CONFIG_PATH", missing.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("NEUROCELL_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[cell]").unwrap();
        writeln!(file, "morphology = \"cells/a.swc\"").unwrap();
        writeln!(file, "[discretization]").unwrap();
        writeln!(file, "segment_length_um = 20.0").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.cell.morphology, PathBuf::from("cells/a.swc"));
        assert_eq!(config.discretization.segment_length_um, 20.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("absent.toml")), None);
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let mut config = NeurocellConfig::default();

        env::set_var("NEUROCELL_CELL_NAME", "env_cell");
        env::set_var("NEUROCELL_OFFSET", "1, 2.5, -3");
        env::set_var("NEUROCELL_SEGMENT_LENGTH", "not-a-number");
        env::set_var("NEUROCELL_LOG_LEVEL", "DEBUG");

        apply_environment_overrides(&mut config);
        clear_override_vars();

        assert_eq!(config.cell.name.as_deref(), Some("env_cell"));
        assert_eq!(config.cell.offset, [1.0, 2.5, -3.0]);
        assert_eq!(config.discretization.segment_length_um, 40.0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = NeurocellConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("morphology".to_string(), "b.swc".to_string());
        cli_args.insert("parameters".to_string(), "fit.json".to_string());
        cli_args.insert("offset".to_string(), "1,2".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.cell.morphology, PathBuf::from("b.swc"));
        assert_eq!(config.cell.parameters, Some(PathBuf::from("fit.json")));
        assert_eq!(config.cell.offset, [0.0; 3]);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[cell]").unwrap();
        writeln!(file, "name = \"file_cell\"").unwrap();
        writeln!(file, "offset = [9.0, 9.0, 9.0]").unwrap();

        env::set_var("NEUROCELL_CELL_NAME", "env_cell");
        env::set_var("NEUROCELL_OFFSET", "1,1,1");

        let mut cli_args = HashMap::new();
        cli_args.insert("name".to_string(), "cli_cell".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();
        clear_override_vars();

        // CLI wins for name, env wins for offset (no CLI override)
        assert_eq!(config.cell.name.as_deref(), Some("cli_cell"));
        assert_eq!(config.cell.offset, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("0,0,0"), Some([0.0; 3]));
        assert_eq!(parse_offset(" -1.5 ,2,3e1"), Some([-1.5, 2.0, 30.0]));
        assert_eq!(parse_offset("1,2,3,4"), None);
        assert_eq!(parse_offset("a,b,c"), None);
    }
}
