// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Membrane Mechanisms
//!
//! A mechanism is an ion-channel or ion-dynamics model that can be inserted
//! into a section. Inserting one gives the section the mechanism's parameter
//! fields (seeded with defaults) and the reversal potentials of the ions it
//! uses. Fields that a section does not have cannot be assigned.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::types::CellError;

/// Ion species whose reversal potential a mechanism depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Ion {
    #[serde(rename = "na")]
    Sodium,
    #[serde(rename = "k")]
    Potassium,
    #[serde(rename = "ca")]
    Calcium,
}

impl Ion {
    /// Section-level field holding the reversal potential (mV)
    pub fn reversal_field(&self) -> &'static str {
        match self {
            Ion::Sodium => "ena",
            Ion::Potassium => "ek",
            Ion::Calcium => "eca",
        }
    }

    /// Reversal potential a section starts with when the ion first appears
    pub fn default_reversal(&self) -> f64 {
        match self {
            Ion::Sodium => 50.0,
            Ion::Potassium => -77.0,
            Ion::Calcium => 132.4579,
        }
    }

    pub fn from_reversal_field(name: &str) -> Option<Ion> {
        match name {
            "ena" => Some(Ion::Sodium),
            "ek" => Some(Ion::Potassium),
            "eca" => Some(Ion::Calcium),
            _ => None,
        }
    }
}

/// Known mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Mechanism {
    /// Passive leak
    #[serde(rename = "pas")]
    Passive,
    /// Intracellular calcium buffering
    CaDynamics,
    /// High-voltage-activated calcium
    #[serde(rename = "Ca_HVA")]
    CaHva,
    /// Low-voltage-activated calcium
    #[serde(rename = "Ca_LVA")]
    CaLva,
    /// Hyperpolarization-activated cation current
    Ih,
    /// Muscarinic (M) potassium current
    Im,
    /// Persistent potassium
    #[serde(rename = "K_P")]
    KP,
    /// Transient potassium
    #[serde(rename = "K_T")]
    KT,
    /// Kv3.1 fast delayed rectifier
    #[serde(rename = "Kv3_1")]
    Kv31,
    /// Fast transient sodium
    NaTs,
    /// Persistent sodium
    Nap,
    /// Small-conductance calcium-activated potassium
    SK,
}

/// Active mechanisms inserted into the first soma section, in insertion order
pub const SOMATIC_MECHANISMS: [Mechanism; 11] = [
    Mechanism::CaDynamics,
    Mechanism::CaHva,
    Mechanism::CaLva,
    Mechanism::Ih,
    Mechanism::Im,
    Mechanism::KP,
    Mechanism::KT,
    Mechanism::Kv31,
    Mechanism::NaTs,
    Mechanism::Nap,
    Mechanism::SK,
];

const GBAR_DEFAULT: &[(&str, f64)] = &[("gbar", 0.00001)];

impl Mechanism {
    pub const ALL: [Mechanism; 12] = [
        Mechanism::Passive,
        Mechanism::CaDynamics,
        Mechanism::CaHva,
        Mechanism::CaLva,
        Mechanism::Ih,
        Mechanism::Im,
        Mechanism::KP,
        Mechanism::KT,
        Mechanism::Kv31,
        Mechanism::NaTs,
        Mechanism::Nap,
        Mechanism::SK,
    ];

    /// Name used by simulators and parameter files
    pub fn name(&self) -> &'static str {
        match self {
            Mechanism::Passive => "pas",
            Mechanism::CaDynamics => "CaDynamics",
            Mechanism::CaHva => "Ca_HVA",
            Mechanism::CaLva => "Ca_LVA",
            Mechanism::Ih => "Ih",
            Mechanism::Im => "Im",
            Mechanism::KP => "K_P",
            Mechanism::KT => "K_T",
            Mechanism::Kv31 => "Kv3_1",
            Mechanism::NaTs => "NaTs",
            Mechanism::Nap => "Nap",
            Mechanism::SK => "SK",
        }
    }

    pub fn from_name(name: &str) -> Option<Mechanism> {
        Mechanism::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Parameter fields and their values right after insertion
    pub fn default_fields(&self) -> &'static [(&'static str, f64)] {
        match self {
            Mechanism::Passive => &[("g", 0.001), ("e", -70.0)],
            Mechanism::CaDynamics => &[
                ("gamma", 0.05),
                ("decay", 80.0),
                ("depth", 0.1),
                ("minCai", 1e-4),
            ],
            _ => GBAR_DEFAULT,
        }
    }

    /// Static name of one of this mechanism's fields
    pub fn field_name(&self, name: &str) -> Option<&'static str> {
        self.default_fields()
            .iter()
            .map(|(field, _)| *field)
            .find(|field| *field == name)
    }

    pub fn ions(&self) -> &'static [Ion] {
        match self {
            Mechanism::Passive | Mechanism::Ih => &[],
            Mechanism::CaDynamics | Mechanism::CaHva | Mechanism::CaLva => &[Ion::Calcium],
            Mechanism::Im | Mechanism::KP | Mechanism::KT | Mechanism::Kv31 | Mechanism::SK => {
                &[Ion::Potassium]
            }
            Mechanism::NaTs | Mechanism::Nap => &[Ion::Sodium],
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mechanism {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mechanism::from_name(s).ok_or_else(|| CellError::UnknownMechanism(s.to_string()))
    }
}

/// Field values of one inserted mechanism
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MechanismParameters {
    values: BTreeMap<&'static str, f64>,
}

impl MechanismParameters {
    pub fn defaults(mechanism: Mechanism) -> Self {
        Self {
            values: mechanism.default_fields().iter().copied().collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    /// Returns false when the mechanism has no such field
    pub fn set(&mut self, field: &str, value: f64) -> bool {
        match self.values.get_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
