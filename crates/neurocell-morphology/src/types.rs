// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for morphology loading

use std::path::PathBuf;

/// Errors raised while reading or assembling a morphology
#[derive(Debug, thiserror::Error)]
pub enum MorphologyError {
    #[error("Failed to read morphology file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: expected 7 columns (id type x y z radius parent), found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("Line {line}: invalid {column} value '{value}'")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Line {line}: {column} must be finite")]
    NonFinite { line: usize, column: &'static str },

    #[error("Line {line}: negative radius {radius}")]
    NegativeRadius { line: usize, radius: f64 },

    #[error("Line {line}: sample id {id} already defined on line {first_line}")]
    DuplicateId {
        line: usize,
        id: i64,
        first_line: usize,
    },

    #[error("Line {line}: sample {id} references parent {parent}, which is not defined on an earlier line")]
    UndefinedParent { line: usize, id: i64, parent: i64 },

    #[error("Line {line}: sample {id} is its own parent")]
    SelfParent { line: usize, id: i64 },

    #[error("Morphology contains no samples")]
    Empty,
}

/// Result type for morphology operations
pub type MorphologyResult<T> = Result<T, MorphologyError>;
