// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Compartmental Cell Model

Turns an immutable morphology tree into an owned, fully parameterized cell
model that a multi-compartment simulator can instantiate.

## Construction

```text
MorphologyTree ──► CellModelBuilder
                     1. drop reconstructed axon
                     2. add two-section axon stub (30 µm × 1 µm)
                     3. name the cell
                     4. insert `pas` everywhere, 11 active mechanisms in soma[0]
                     5. apply the parameter table
                     6. nseg = 1 + 2 * floor(L / 40)
                 ──► CellModel ──► SimulationSubstrate
```

## Usage

```rust,no_run
use std::path::Path;
use neurocell_cell::{load_cell, Point3};

let cell = load_cell(Path::new("cell.swc"), None, Point3::ORIGIN)?;
println!("{}: {} sections", cell, cell.all().count());
# Ok::<(), neurocell_cell::CellError>(())
```

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builder;
pub mod discretization;
pub mod field;
pub mod mechanism;
pub mod model;
pub mod parameters;
pub mod section;
pub mod substrate;
pub mod types;

pub use builder::{load_cell, CellModelBuilder, AXON_STUB_DIAMETER_UM, AXON_STUB_LENGTH_UM};
pub use discretization::SegmentRule;
pub use field::Field;
pub use mechanism::{Ion, Mechanism, MechanismParameters, SOMATIC_MECHANISMS};
pub use model::{CellModel, DEFAULT_CELL_NAME};
pub use parameters::{ParameterAssignment, ParameterScope, ParameterSet, SimulationConditions};
pub use section::{Connection, Geometry, Section, SectionGroup, SectionId};
pub use substrate::{RecordingSubstrate, SimulationSubstrate, SubstrateCall};
pub use types::{CellError, CellResult};

/// Re-export for convenience
pub use neurocell_morphology::Point3;
