// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Simulation Substrate Seam
//!
//! The cell model does not simulate anything. A simulator receives it through
//! [`SimulationSubstrate`], which exposes the primitives a compartmental
//! engine offers: create a section, give it a shape, insert a mechanism,
//! connect two sections and set a named parameter.
//!
//! ## Replay Order
//!
//! ```text
//! for each section in `all`:  create_section, define_shape
//! for each section in `all`:  insert_mechanism (sorted), connect
//! for each section in `all`:  set nseg, Ra, cm, ion reversals, mechanism fields
//! ```

use std::convert::Infallible;

use serde::Serialize;
use tracing::debug;

use crate::field::Field;
use crate::model::CellModel;
use crate::section::Geometry;

pub trait SimulationSubstrate {
    /// Engine-side reference to a created section
    type Handle: Copy;
    type Error: std::error::Error;

    fn create_section(&mut self, name: &str) -> Result<Self::Handle, Self::Error>;

    fn define_shape(&mut self, section: Self::Handle, geometry: &Geometry) -> Result<(), Self::Error>;

    fn insert_mechanism(&mut self, section: Self::Handle, mechanism: &str) -> Result<(), Self::Error>;

    /// Join `child` at `child_location` to `parent` at `parent_location`
    fn connect(
        &mut self,
        child: Self::Handle,
        child_location: f64,
        parent: Self::Handle,
        parent_location: f64,
    ) -> Result<(), Self::Error>;

    fn set_parameter(&mut self, section: Self::Handle, field: &str, value: f64) -> Result<(), Self::Error>;
}

impl CellModel {
    /// Replay the model into `substrate`; returns handles in `all` order
    pub fn instantiate<S: SimulationSubstrate>(&self, substrate: &mut S) -> Result<Vec<S::Handle>, S::Error> {
        let mut slots: Vec<Option<S::Handle>> = vec![None; self.section_count()];
        let mut handles = Vec::with_capacity(self.all_ids().len());

        for &id in self.all_ids() {
            let Some(section) = self.section(id) else { continue };
            let handle = substrate.create_section(section.name())?;
            substrate.define_shape(handle, section.geometry())?;
            slots[id.0] = Some(handle);
            handles.push(handle);
        }

        for (&id, &handle) in self.all_ids().iter().zip(&handles) {
            let Some(section) = self.section(id) else { continue };
            for mechanism in section.mechanisms().keys() {
                substrate.insert_mechanism(handle, mechanism.name())?;
            }
            if let Some(connection) = section.connection() {
                if let Some(parent) = slots[connection.parent.0] {
                    substrate.connect(handle, connection.child_location, parent, connection.parent_location)?;
                }
            }
        }

        for (&id, &handle) in self.all_ids().iter().zip(&handles) {
            let Some(section) = self.section(id) else { continue };
            substrate.set_parameter(handle, "nseg", f64::from(section.segments()))?;
            substrate.set_parameter(handle, "Ra", section.axial_resistivity())?;
            substrate.set_parameter(handle, "cm", section.membrane_capacitance())?;
            for (ion, value) in section.ions() {
                substrate.set_parameter(handle, ion.reversal_field(), *value)?;
            }
            for (mechanism, params) in section.mechanisms() {
                for (name, value) in params.iter() {
                    let field = Field::mechanism(*mechanism, name);
                    substrate.set_parameter(handle, &field.to_string(), value)?;
                }
            }
        }

        debug!(
            target: "neurocell-cell",
            "Instantiated {} sections of {} in substrate",
            handles.len(),
            self
        );
        Ok(handles)
    }
}

/// One recorded substrate call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SubstrateCall {
    CreateSection {
        handle: usize,
        name: String,
    },
    DefineShape {
        section: usize,
        length: f64,
        diameter: f64,
        samples: usize,
    },
    InsertMechanism {
        section: usize,
        mechanism: String,
    },
    Connect {
        child: usize,
        child_location: f64,
        parent: usize,
        parent_location: f64,
    },
    SetParameter {
        section: usize,
        field: String,
        value: f64,
    },
}

/// Substrate that only records what it is asked to do
#[derive(Debug, Clone, Default)]
pub struct RecordingSubstrate {
    calls: Vec<SubstrateCall>,
    sections: usize,
}

impl RecordingSubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SubstrateCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<SubstrateCall> {
        self.calls
    }
}

impl SimulationSubstrate for RecordingSubstrate {
    type Handle = usize;
    type Error = Infallible;

    fn create_section(&mut self, name: &str) -> Result<usize, Infallible> {
        let handle = self.sections;
        self.sections += 1;
        self.calls.push(SubstrateCall::CreateSection {
            handle,
            name: name.to_string(),
        });
        Ok(handle)
    }

    fn define_shape(&mut self, section: usize, geometry: &Geometry) -> Result<(), Infallible> {
        self.calls.push(SubstrateCall::DefineShape {
            section,
            length: geometry.length(),
            diameter: geometry.diameter(),
            samples: geometry.samples().len(),
        });
        Ok(())
    }

    fn insert_mechanism(&mut self, section: usize, mechanism: &str) -> Result<(), Infallible> {
        self.calls.push(SubstrateCall::InsertMechanism {
            section,
            mechanism: mechanism.to_string(),
        });
        Ok(())
    }

    fn connect(
        &mut self,
        child: usize,
        child_location: f64,
        parent: usize,
        parent_location: f64,
    ) -> Result<(), Infallible> {
        self.calls.push(SubstrateCall::Connect {
            child,
            child_location,
            parent,
            parent_location,
        });
        Ok(())
    }

    fn set_parameter(&mut self, section: usize, field: &str, value: f64) -> Result<(), Infallible> {
        self.calls.push(SubstrateCall::SetParameter {
            section,
            field: field.to_string(),
            value,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CellModelBuilder;
    use neurocell_morphology::{LoadOptions, SwcLoader};

    fn model() -> CellModel {
        let tree = SwcLoader::new()
            .load_str("1 1 0 0 0 5 -1\n2 3 10 0 0 1 1\n3 3 60 0 0 1 2\n", &LoadOptions::default())
            .unwrap();
        CellModelBuilder::new().build(&tree).unwrap()
    }

    #[test]
    fn test_sections_created_before_connections() {
        let model = model();
        let mut substrate = RecordingSubstrate::new();
        let handles = model.instantiate(&mut substrate).unwrap();
        assert_eq!(handles, vec![0, 1, 2, 3]);

        let calls = substrate.calls();
        let last_create = calls
            .iter()
            .rposition(|c| matches!(c, SubstrateCall::CreateSection { .. }))
            .unwrap();
        let first_connect = calls
            .iter()
            .position(|c| matches!(c, SubstrateCall::Connect { .. }))
            .unwrap();
        assert!(last_create < first_connect);
    }

    #[test]
    fn test_connections_replayed() {
        let mut substrate = RecordingSubstrate::new();
        model().instantiate(&mut substrate).unwrap();
        let connects: Vec<&SubstrateCall> = substrate
            .calls()
            .iter()
            .filter(|c| matches!(c, SubstrateCall::Connect { .. }))
            .collect();
        assert_eq!(
            connects,
            vec![
                &SubstrateCall::Connect { child: 1, child_location: 0.0, parent: 0, parent_location: 0.5 },
                &SubstrateCall::Connect { child: 2, child_location: 0.0, parent: 0, parent_location: 0.5 },
                &SubstrateCall::Connect { child: 3, child_location: 0.0, parent: 2, parent_location: 1.0 },
            ]
        );
    }

    #[test]
    fn test_soma_parameters_replayed() {
        let mut substrate = RecordingSubstrate::new();
        model().instantiate(&mut substrate).unwrap();
        let calls = substrate.into_calls();

        let inserted = calls
            .iter()
            .filter(|c| matches!(c, SubstrateCall::InsertMechanism { section: 0, .. }))
            .count();
        assert_eq!(inserted, 12);

        assert!(calls.contains(&SubstrateCall::SetParameter {
            section: 0,
            field: "gbar_NaTs".to_string(),
            value: 0.243367,
        }));
        assert!(calls.contains(&SubstrateCall::SetParameter {
            section: 0,
            field: "ek".to_string(),
            value: -107.0,
        }));
        assert!(calls.contains(&SubstrateCall::SetParameter {
            section: 1,
            field: "nseg".to_string(),
            value: 3.0,
        }));
    }
}
