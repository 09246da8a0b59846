// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Neuronal Morphology

Reads reconstructed neuronal geometry (SWC) into an immutable tree of
unbranched sections.

## Pipeline

```text
SWC text ──► swc::parse_swc ──► Vec<SwcRecord>
                                     │
                      tree::MorphologyTree::from_records
                                     │
                                     ▼
                  MorphologyTree (soma / dend / apic / axon sections)
```

The tree is never mutated after loading. Consumers that need to change the
geometry (the cell builder, for one) copy what they need into their own
structures.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod geometry;
pub mod loader;
pub mod swc;
pub mod tree;
pub mod types;

pub use geometry::{Point3, Sample};
pub use loader::{LoadOptions, MorphologyLoader, SwcLoader};
pub use swc::{parse_swc, StructureType, SwcRecord};
pub use tree::{Attachment, MorphologySection, MorphologyTree};
pub use types::{MorphologyError, MorphologyResult};
