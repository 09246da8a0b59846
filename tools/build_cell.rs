// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Cell Build Tool

Builds a cell model from configuration and prints it as JSON, or with
`--plan` prints the ordered substrate calls a simulator would receive.

Usage:
  cargo run --bin build_cell -- [--config neurocell.toml] [--morphology cell.swc]
      [--name NAME] [--offset X,Y,Z] [--parameters fit.json] [--plan] [--debug-all]

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use neurocell::cell::RecordingSubstrate;
use neurocell::observability::{debug_flags_help, init_logging, parse_debug_flags};

/// Build a biophysical cell model from an SWC reconstruction
#[derive(Parser, Debug)]
#[command(name = "build_cell", version, author, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Configuration file (default: search for neurocell.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SWC morphology file
    #[arg(short, long)]
    morphology: Option<PathBuf>,

    /// Cell name
    #[arg(short, long)]
    name: Option<String>,

    /// Translation applied to the morphology, "x,y,z" in µm
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<String>,

    /// Fitted-parameter JSON replacing the built-in table
    #[arg(short, long)]
    parameters: Option<PathBuf>,

    /// Segment length for discretization in µm
    #[arg(long)]
    segment_length: Option<f64>,

    /// Print substrate calls instead of the model
    #[arg(long, default_value_t = false)]
    plan: bool,
}

impl Args {
    fn cli_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(name) = &self.name {
            overrides.insert("name".to_string(), name.clone());
        }
        if let Some(path) = &self.morphology {
            overrides.insert("morphology".to_string(), path.display().to_string());
        }
        if let Some(offset) = &self.offset {
            overrides.insert("offset".to_string(), offset.clone());
        }
        if let Some(path) = &self.parameters {
            overrides.insert("parameters".to_string(), path.display().to_string());
        }
        if let Some(length) = self.segment_length {
            overrides.insert("segment_length".to_string(), length.to_string());
        }
        overrides
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // --debug-* flags belong to the logging layer, not to clap
    let args = Args::parse_from(env::args().filter(|a| !a.starts_with("--debug-")));
    let debug_flags = parse_debug_flags();
    let overrides = args.cli_overrides();

    let neurocell::ResolvedConfig { config, source } =
        neurocell::resolve_config(args.config.as_deref(), &overrides)?;

    let _logging = init_logging(&debug_flags, &neurocell::logging_options(&config.logging))?;
    match &source {
        Some(path) => info!(target: "neurocell", "Using configuration {}", path.display()),
        None => info!(target: "neurocell", "No configuration file found, using defaults"),
    }
    debug!(target: "neurocell", "Effective configuration: {:?}", config);

    let model = neurocell::build_from_config(&config)?;

    let output = if args.plan {
        let mut substrate = RecordingSubstrate::new();
        model.instantiate(&mut substrate)?;
        info!(target: "neurocell", "Recorded {} substrate calls", substrate.calls().len());
        serde_json::to_string_pretty(substrate.calls())?
    } else {
        serde_json::to_string_pretty(&model)?
    };
    println!("{}", output);

    Ok(())
}
