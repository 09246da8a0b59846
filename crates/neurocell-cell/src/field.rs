// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Addressable section fields
//!
//! Names follow the simulator convention: `Ra` and `cm` are section-level,
//! `ena`/`ek`/`eca` are ion reversal potentials, and mechanism fields are
//! qualified as `<field>_<mechanism>` (`gbar_NaTs`, `g_pas`).

use std::fmt;
use std::str::FromStr;

use crate::mechanism::{Ion, Mechanism};
use crate::types::{CellError, CellResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `Ra` (Ω·cm)
    AxialResistivity,
    /// `cm` (µF/cm²)
    MembraneCapacitance,
    /// Ion reversal potential (mV)
    Reversal(Ion),
    /// Field owned by an inserted mechanism
    Mechanism {
        mechanism: Mechanism,
        name: &'static str,
    },
}

impl Field {
    pub const fn mechanism(mechanism: Mechanism, name: &'static str) -> Self {
        Field::Mechanism { mechanism, name }
    }

    pub const fn gbar(mechanism: Mechanism) -> Self {
        Field::Mechanism {
            mechanism,
            name: "gbar",
        }
    }

    /// Parse a qualified field name
    pub fn parse(name: &str) -> CellResult<Field> {
        match name {
            "Ra" => return Ok(Field::AxialResistivity),
            "cm" => return Ok(Field::MembraneCapacitance),
            _ => {}
        }
        if let Some(ion) = Ion::from_reversal_field(name) {
            return Ok(Field::Reversal(ion));
        }

        let (field, mechanism) = name
            .split_once('_')
            .ok_or_else(|| CellError::UnknownParameter(name.to_string()))?;
        let mechanism = Mechanism::from_name(mechanism)
            .ok_or_else(|| CellError::UnknownParameter(name.to_string()))?;
        let field = mechanism
            .field_name(field)
            .ok_or_else(|| CellError::UnknownParameter(name.to_string()))?;

        Ok(Field::mechanism(mechanism, field))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::AxialResistivity => f.write_str("Ra"),
            Field::MembraneCapacitance => f.write_str("cm"),
            Field::Reversal(ion) => f.write_str(ion.reversal_field()),
            Field::Mechanism { mechanism, name } => write!(f, "{}_{}", name, mechanism.name()),
        }
    }
}

impl FromStr for Field {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_section_and_ion_fields() {
        assert_eq!(Field::parse("Ra").unwrap(), Field::AxialResistivity);
        assert_eq!(Field::parse("cm").unwrap(), Field::MembraneCapacitance);
        assert_eq!(Field::parse("ena").unwrap(), Field::Reversal(Ion::Sodium));
    }

    #[test]
    fn test_parse_mechanism_fields_with_underscored_names() {
        assert_eq!(Field::parse("g_pas").unwrap(), Field::mechanism(Mechanism::Passive, "g"));
        assert_eq!(Field::parse("gbar_K_P").unwrap(), Field::gbar(Mechanism::KP));
        assert_eq!(Field::parse("gbar_Kv3_1").unwrap(), Field::gbar(Mechanism::Kv31));
        assert_eq!(
            Field::parse("decay_CaDynamics").unwrap(),
            Field::mechanism(Mechanism::CaDynamics, "decay")
        );
    }

    #[test]
    fn test_display_matches_parse() {
        for name in ["Ra", "cm", "ek", "e_pas", "gbar_Ca_HVA", "gamma_CaDynamics", "gbar_SK"] {
            assert_eq!(Field::parse(name).unwrap().to_string(), name);
        }
    }

    #[test]
    fn test_unknown_fields() {
        for name in ["diam", "gbar_hh", "gamma_NaTs", "gbar"] {
            assert!(matches!(Field::parse(name), Err(CellError::UnknownParameter(_))), "{name}");
        }
    }
}
