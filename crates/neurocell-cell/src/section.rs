// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Cable Sections
//!
//! A section is an unbranched cable with its own geometry, passive
//! properties and inserted mechanisms.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use neurocell_morphology::geometry::{mean_diameter, path_length};
use neurocell_morphology::{Sample, StructureType};

use crate::field::Field;
use crate::mechanism::{Ion, Mechanism, MechanismParameters};
use crate::types::{CellError, CellResult};

/// Axial resistivity a section is created with (Ω·cm)
pub const DEFAULT_AXIAL_RESISTIVITY: f64 = 35.4;
/// Membrane capacitance a section is created with (µF/cm²)
pub const DEFAULT_MEMBRANE_CAPACITANCE: f64 = 1.0;

/// Index of a section inside its [`crate::CellModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SectionId(pub usize);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Named section collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionGroup {
    Soma,
    Dendrite,
    Axon,
}

impl SectionGroup {
    /// Group for a reconstructed structure; every non-soma, non-axon type
    /// (basal, apical, custom, undefined) is treated as dendrite
    pub fn from_structure(kind: StructureType) -> Self {
        match kind {
            StructureType::Soma => SectionGroup::Soma,
            StructureType::Axon => SectionGroup::Axon,
            _ => SectionGroup::Dendrite,
        }
    }
}

impl fmt::Display for SectionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionGroup::Soma => f.write_str("soma"),
            SectionGroup::Dendrite => f.write_str("dendrite"),
            SectionGroup::Axon => f.write_str("axon"),
        }
    }
}

/// Section shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Geometry {
    /// 3D samples from a reconstruction
    Traced { samples: Vec<Sample> },
    /// Synthetic cylinder without coordinates
    Cylinder { length: f64, diameter: f64 },
}

impl Geometry {
    pub fn length(&self) -> f64 {
        match self {
            Geometry::Traced { samples } => path_length(samples),
            Geometry::Cylinder { length, .. } => *length,
        }
    }

    pub fn diameter(&self) -> f64 {
        match self {
            Geometry::Traced { samples } => mean_diameter(samples),
            Geometry::Cylinder { diameter, .. } => *diameter,
        }
    }

    pub fn samples(&self) -> &[Sample] {
        match self {
            Geometry::Traced { samples } => samples,
            Geometry::Cylinder { .. } => &[],
        }
    }
}

/// Joint between a section's proximal end and a point on its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Connection {
    pub parent: SectionId,
    pub parent_location: f64,
    pub child_location: f64,
}

impl Connection {
    pub fn to(parent: SectionId, parent_location: f64) -> Self {
        Self {
            parent,
            parent_location,
            child_location: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    name: String,
    group: SectionGroup,
    geometry: Geometry,
    connection: Option<Connection>,
    segments: u32,
    axial_resistivity: f64,
    membrane_capacitance: f64,
    ions: BTreeMap<Ion, f64>,
    mechanisms: BTreeMap<Mechanism, MechanismParameters>,
}

impl Section {
    pub fn new(name: impl Into<String>, group: SectionGroup, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            group,
            geometry,
            connection: None,
            segments: 1,
            axial_resistivity: DEFAULT_AXIAL_RESISTIVITY,
            membrane_capacitance: DEFAULT_MEMBRANE_CAPACITANCE,
            ions: BTreeMap::new(),
            mechanisms: BTreeMap::new(),
        }
    }

    pub fn cylinder(name: impl Into<String>, group: SectionGroup, length: f64, diameter: f64) -> Self {
        Self::new(name, group, Geometry::Cylinder { length, diameter })
    }

    pub fn traced(name: impl Into<String>, group: SectionGroup, samples: Vec<Sample>) -> Self {
        Self::new(name, group, Geometry::Traced { samples })
    }

    pub fn with_connection(mut self, connection: Option<Connection>) -> Self {
        self.connection = connection;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> SectionGroup {
        self.group
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Length in µm
    pub fn length(&self) -> f64 {
        self.geometry.length()
    }

    /// Diameter in µm
    pub fn diameter(&self) -> f64 {
        self.geometry.diameter()
    }

    pub fn samples(&self) -> &[Sample] {
        self.geometry.samples()
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Number of discretization segments (`nseg`)
    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn set_segments(&mut self, segments: u32) {
        self.segments = segments.max(1);
    }

    pub fn axial_resistivity(&self) -> f64 {
        self.axial_resistivity
    }

    pub fn membrane_capacitance(&self) -> f64 {
        self.membrane_capacitance
    }

    pub fn ions(&self) -> &BTreeMap<Ion, f64> {
        &self.ions
    }

    pub fn mechanisms(&self) -> &BTreeMap<Mechanism, MechanismParameters> {
        &self.mechanisms
    }

    pub fn mechanism(&self, mechanism: Mechanism) -> Option<&MechanismParameters> {
        self.mechanisms.get(&mechanism)
    }

    pub fn has_mechanism(&self, mechanism: Mechanism) -> bool {
        self.mechanisms.contains_key(&mechanism)
    }

    /// Insert a mechanism. Inserting one that is already present keeps its
    /// current values.
    pub fn insert(&mut self, mechanism: Mechanism) {
        self.mechanisms
            .entry(mechanism)
            .or_insert_with(|| MechanismParameters::defaults(mechanism));
        for ion in mechanism.ions() {
            self.ions.entry(*ion).or_insert_with(|| ion.default_reversal());
        }
    }

    pub fn get(&self, field: &Field) -> Option<f64> {
        match field {
            Field::AxialResistivity => Some(self.axial_resistivity),
            Field::MembraneCapacitance => Some(self.membrane_capacitance),
            Field::Reversal(ion) => self.ions.get(ion).copied(),
            Field::Mechanism { mechanism, name } => {
                self.mechanisms.get(mechanism).and_then(|p| p.get(name))
            }
        }
    }

    /// Assign a field; mechanism and ion fields must exist already
    pub fn set(&mut self, field: &Field, value: f64) -> CellResult<()> {
        match field {
            Field::AxialResistivity => self.axial_resistivity = value,
            Field::MembraneCapacitance => self.membrane_capacitance = value,
            Field::Reversal(ion) => match self.ions.get_mut(ion) {
                Some(slot) => *slot = value,
                None => {
                    return Err(CellError::IonNotPresent {
                        section: self.name.clone(),
                        field: ion.reversal_field().to_string(),
                    })
                }
            },
            Field::Mechanism { mechanism, name } => {
                let params = self.mechanisms.get_mut(mechanism).ok_or_else(|| {
                    CellError::MechanismNotInserted {
                        section: self.name.clone(),
                        mechanism: mechanism.name().to_string(),
                    }
                })?;
                if !params.set(name, value) {
                    return Err(CellError::UnknownParameter(field.to_string()));
                }
            }
        }
        Ok(())
    }
}
