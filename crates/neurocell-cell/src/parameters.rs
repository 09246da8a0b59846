// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Biophysical parameter sets.

A parameter set is an ordered list of `(scope, field, value)` assignments.
Assignments run after mechanism insertion, since most fields only exist once
their mechanism is present.

The built-in set is the fitted table for this cell. Sets can also be read
from the fitted-parameter JSON format used by published single-cell models:

```json
{
  "passive":    [{ "ra": 100.0, "e_pas": -82.69, "cm": [{ "section": "soma", "cm": 1.0 }] }],
  "conditions": [{ "celsius": 34.0, "v_init": -82.69,
                   "erev": [{ "section": "soma", "ena": 53.0, "ek": -107.0 }] }],
  "genome":     [{ "section": "soma", "name": "gbar_Im", "value": "0.00685129", "mechanism": "Im" }]
}
```

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::field::Field;
use crate::mechanism::{Ion, Mechanism};
use crate::model::CellModel;
use crate::section::SectionGroup;
use crate::types::{CellError, CellResult};

/// Which sections an assignment touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterScope {
    All,
    Group(SectionGroup),
}

impl ParameterScope {
    /// Parse a section label from a parameter file
    pub fn parse(label: &str) -> CellResult<Self> {
        match label {
            "all" => Ok(ParameterScope::All),
            "soma" => Ok(ParameterScope::Group(SectionGroup::Soma)),
            "axon" => Ok(ParameterScope::Group(SectionGroup::Axon)),
            "dend" | "apic" | "dendrite" => Ok(ParameterScope::Group(SectionGroup::Dendrite)),
            other => Err(CellError::UnknownScope(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterAssignment {
    pub scope: ParameterScope,
    pub field: Field,
    pub value: f64,
}

impl ParameterAssignment {
    pub const fn new(scope: ParameterScope, field: Field, value: f64) -> Self {
        Self {
            scope,
            field,
            value,
        }
    }
}

/// Run conditions carried alongside fitted parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationConditions {
    /// Temperature (°C)
    pub celsius: Option<f64>,
    /// Initial membrane potential (mV)
    pub v_init: Option<f64>,
}

const ALL: ParameterScope = ParameterScope::All;
const SOMA: ParameterScope = ParameterScope::Group(SectionGroup::Soma);
const DEND: ParameterScope = ParameterScope::Group(SectionGroup::Dendrite);
const AXON: ParameterScope = ParameterScope::Group(SectionGroup::Axon);

const G_PAS: Field = Field::mechanism(Mechanism::Passive, "g");
const E_PAS: Field = Field::mechanism(Mechanism::Passive, "e");

const BUILTIN: [ParameterAssignment; 22] = [
    ParameterAssignment::new(ALL, Field::AxialResistivity, 100.0),
    ParameterAssignment::new(ALL, E_PAS, -82.6876653035),
    ParameterAssignment::new(AXON, Field::MembraneCapacitance, 1.0),
    ParameterAssignment::new(AXON, G_PAS, 0.000759461803864),
    ParameterAssignment::new(DEND, Field::MembraneCapacitance, 1.0),
    ParameterAssignment::new(DEND, G_PAS, 0.000200030582037),
    ParameterAssignment::new(SOMA, Field::MembraneCapacitance, 1.0),
    ParameterAssignment::new(SOMA, Field::Reversal(Ion::Sodium), 53.0),
    ParameterAssignment::new(SOMA, Field::Reversal(Ion::Potassium), -107.0),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::Im), 0.00685129),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::Ih), 1.59635e-05),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::NaTs), 0.243367),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::Nap), 0.000164535),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::KP), 0.0),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::KT), 0.0),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::SK), 0.000900349),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::Kv31), 0.00270852),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::CaHva), 0.000489083),
    ParameterAssignment::new(SOMA, Field::gbar(Mechanism::CaLva), 0.00630378),
    ParameterAssignment::new(SOMA, Field::mechanism(Mechanism::CaDynamics, "gamma"), 0.000889512),
    ParameterAssignment::new(SOMA, Field::mechanism(Mechanism::CaDynamics, "decay"), 477.172),
    ParameterAssignment::new(SOMA, G_PAS, 0.000831418),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    assignments: Vec<ParameterAssignment>,
    conditions: Option<SimulationConditions>,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ParameterSet {
    /// The fitted table for this cell
    pub fn builtin() -> Self {
        Self {
            assignments: BUILTIN.to_vec(),
            conditions: None,
        }
    }

    pub fn new(assignments: Vec<ParameterAssignment>) -> Self {
        Self {
            assignments,
            conditions: None,
        }
    }

    pub fn assignments(&self) -> &[ParameterAssignment] {
        &self.assignments
    }

    pub fn conditions(&self) -> Option<&SimulationConditions> {
        self.conditions.as_ref()
    }

    pub fn from_fit_file(path: &Path) -> CellResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| CellError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_fit_json(&json)?;
        info!(
            target: "neurocell-cell",
            "Loaded {} parameter assignments from {}",
            set.assignments.len(),
            path.display()
        );
        Ok(set)
    }

    pub fn from_fit_json(json: &str) -> CellResult<Self> {
        let raw: RawFitFile = serde_json::from_str(json)?;
        let mut assignments = Vec::new();

        if raw.passive.len() > 1 {
            return Err(CellError::InvalidParameterSet(format!(
                "expected at most one passive block, found {}",
                raw.passive.len()
            )));
        }
        for passive in &raw.passive {
            if let Some(ra) = passive.ra {
                assignments.push(ParameterAssignment::new(ALL, Field::AxialResistivity, ra));
            }
            if let Some(e_pas) = passive.e_pas {
                assignments.push(ParameterAssignment::new(ALL, E_PAS, e_pas));
            }
            for entry in &passive.cm {
                assignments.push(ParameterAssignment::new(
                    ParameterScope::parse(&entry.section)?,
                    Field::MembraneCapacitance,
                    entry.cm.as_f64()?,
                ));
            }
        }

        let mut conditions = None;
        if let Some(block) = raw.conditions.first() {
            for erev in &block.erev {
                let scope = ParameterScope::parse(&erev.section)?;
                if let Some(ena) = erev.ena {
                    assignments.push(ParameterAssignment::new(scope, Field::Reversal(Ion::Sodium), ena));
                }
                if let Some(ek) = erev.ek {
                    assignments.push(ParameterAssignment::new(scope, Field::Reversal(Ion::Potassium), ek));
                }
            }
            conditions = Some(SimulationConditions {
                celsius: block.celsius,
                v_init: block.v_init,
            });
        }

        for entry in &raw.genome {
            let name = qualified_name(&entry.name, &entry.mechanism);
            assignments.push(ParameterAssignment::new(
                ParameterScope::parse(&entry.section)?,
                Field::parse(&name)?,
                entry.value.as_f64()?,
            ));
        }

        Ok(Self {
            assignments,
            conditions,
        })
    }

    /// Apply every assignment to every section in its scope, in order
    pub fn apply(&self, model: &mut CellModel) -> CellResult<()> {
        for assignment in &self.assignments {
            let ids = model.scope_ids(assignment.scope).to_vec();
            for id in ids {
                model.section_mut(id).set(&assignment.field, assignment.value)?;
            }
        }
        model.set_conditions(self.conditions);
        debug!(
            target: "neurocell-cell",
            "Applied {} parameter assignments",
            self.assignments.len()
        );
        Ok(())
    }
}

/// Parameter files name fields either qualified (`gbar_Im`) or bare (`gbar`)
/// next to a mechanism column
fn qualified_name(name: &str, mechanism: &str) -> String {
    if mechanism.is_empty() || name.ends_with(&format!("_{}", mechanism)) {
        name.to_string()
    } else {
        format!("{}_{}", name, mechanism)
    }
}

#[derive(Debug, Deserialize)]
struct RawFitFile {
    #[serde(default)]
    passive: Vec<RawPassive>,
    #[serde(default)]
    conditions: Vec<RawConditions>,
    #[serde(default)]
    genome: Vec<RawGenomeEntry>,
}

#[derive(Debug, Deserialize)]
struct RawPassive {
    ra: Option<f64>,
    e_pas: Option<f64>,
    #[serde(default)]
    cm: Vec<RawCm>,
}

#[derive(Debug, Deserialize)]
struct RawCm {
    section: String,
    cm: RawValue,
}

#[derive(Debug, Deserialize)]
struct RawConditions {
    celsius: Option<f64>,
    v_init: Option<f64>,
    #[serde(default)]
    erev: Vec<RawErev>,
}

#[derive(Debug, Deserialize)]
struct RawErev {
    section: String,
    ena: Option<f64>,
    ek: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawGenomeEntry {
    section: String,
    name: String,
    value: RawValue,
    #[serde(default)]
    mechanism: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn as_f64(&self) -> CellResult<f64> {
        match self {
            RawValue::Number(value) => Ok(*value),
            RawValue::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                CellError::InvalidParameterSet(format!("'{}' is not a number", text))
            }),
        }
    }
}
