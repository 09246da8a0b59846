// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for cell construction

use std::path::PathBuf;

use neurocell_morphology::MorphologyError;

#[derive(Debug, thiserror::Error)]
pub enum CellError {
    #[error(transparent)]
    Morphology(#[from] MorphologyError),

    #[error("Morphology has no soma section; the axon stub cannot be attached")]
    MissingSoma,

    #[error("Unknown mechanism: {0}")]
    UnknownMechanism(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Unknown section scope: {0}")]
    UnknownScope(String),

    #[error("Section {section} has no mechanism {mechanism} (insert it before assigning its parameters)")]
    MechanismNotInserted { section: String, mechanism: String },

    #[error("Section {section} has no {field} (no inserted mechanism uses that ion)")]
    IonNotPresent { section: String, field: String },

    #[error("Invalid parameter set: {0}")]
    InvalidParameterSet(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for cell operations
pub type CellResult<T> = Result<T, CellError>;
