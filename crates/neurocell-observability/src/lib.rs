// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurocell-observability
//!
//! Logging setup shared by the neurocell binaries, with per-crate debug flag
//! support. Library crates only emit `tracing` events under their own target;
//! this crate decides where they go.
//!
//! ## Features
//! - `file-logging`: daily-rolling JSON log file next to console output

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Log targets that accept a `--debug-<crate>` flag
pub const KNOWN_CRATES: &[&str] = &[
    "neurocell",
    "neurocell-morphology",
    "neurocell-cell",
    "neurocell-config",
];
