// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Cell construction.

The builder runs a fixed sequence; each step depends on the previous one:

1. take the morphology, dropping any reconstructed axon
2. attach a two-section axon stub to the middle of `soma[0]`
3. name the cell
4. insert `pas` everywhere and the active set into `soma[0]`
5. apply the parameter set
6. discretize on final section lengths

Construction is all-or-nothing: on error no model is returned.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::path::Path;

use tracing::{debug, info};

use neurocell_morphology::{LoadOptions, MorphologyLoader, MorphologyTree, Point3, StructureType, SwcLoader};

use crate::discretization::SegmentRule;
use crate::mechanism::{Mechanism, SOMATIC_MECHANISMS};
use crate::model::{CellModel, DEFAULT_CELL_NAME};
use crate::parameters::ParameterSet;
use crate::section::{Connection, Section, SectionGroup, SectionId};
use crate::types::{CellError, CellResult};

/// Length of each synthetic axon section (µm)
pub const AXON_STUB_LENGTH_UM: f64 = 30.0;
/// Diameter of each synthetic axon section (µm)
pub const AXON_STUB_DIAMETER_UM: f64 = 1.0;

/// Turns a morphology tree into a named, parameterized, discretized [`CellModel`]
#[derive(Debug, Clone, Default)]
pub struct CellModelBuilder {
    name: Option<String>,
    offset: Point3,
    parameters: ParameterSet,
    segment_rule: SegmentRule,
}

impl CellModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_offset(mut self, offset: Point3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_segment_rule(mut self, segment_rule: SegmentRule) -> Self {
        self.segment_rule = segment_rule;
        self
    }

    /// Load a morphology through `loader` (offset applied, axon skipped)
    /// and build the cell
    pub fn build_from_file<L: MorphologyLoader>(&self, loader: &L, path: &Path) -> CellResult<CellModel> {
        let options = LoadOptions::default()
            .with_offset(self.offset)
            .without_axon();
        let tree = loader.load(path, &options)?;
        self.assemble(&tree)
    }

    /// Build from an already parsed morphology; the builder's offset is
    /// applied to a copy of the tree
    pub fn build(&self, tree: &MorphologyTree) -> CellResult<CellModel> {
        if self.offset.is_origin() {
            self.assemble(tree)
        } else {
            self.assemble(&tree.translated(self.offset))
        }
    }

    fn assemble(&self, tree: &MorphologyTree) -> CellResult<CellModel> {
        // 1. reconstructed axon is replaced by the stub
        let tree = tree.pruned(|s| s.kind == StructureType::Axon);
        if !tree.has_soma() {
            return Err(CellError::MissingSoma);
        }

        // 3. identity
        let name = self.name.clone().unwrap_or_else(|| DEFAULT_CELL_NAME.to_string());
        let mut model = CellModel::new(name);

        // Tree order keeps parents ahead of children, so tree index == SectionId
        for section in tree.sections() {
            let connection = section
                .parent
                .map(|a| Connection::to(SectionId(a.section), a.location));
            model.push_section(
                Section::traced(
                    section.name.clone(),
                    SectionGroup::from_structure(section.kind),
                    section.samples.clone(),
                )
                .with_connection(connection),
            );
        }
        let soma_root = model.soma_ids()[0];

        // 2. axon stub
        let axon0 = model.push_section(
            Section::cylinder("axon[0]", SectionGroup::Axon, AXON_STUB_LENGTH_UM, AXON_STUB_DIAMETER_UM)
                .with_connection(Some(Connection::to(soma_root, 0.5))),
        );
        model.push_section(
            Section::cylinder("axon[1]", SectionGroup::Axon, AXON_STUB_LENGTH_UM, AXON_STUB_DIAMETER_UM)
                .with_connection(Some(Connection::to(axon0, 1.0))),
        );
        debug!(target: "neurocell-cell", "Attached axon stub to {}", tree.sections()[soma_root.0].name);

        // 4. mechanisms
        for id in model.all_ids().to_vec() {
            model.section_mut(id).insert(Mechanism::Passive);
        }
        let soma = model.section_mut(soma_root);
        for mechanism in SOMATIC_MECHANISMS {
            soma.insert(mechanism);
        }

        // 5. parameters
        self.parameters.apply(&mut model)?;

        // 6. discretization
        self.segment_rule.apply(&mut model);

        info!(
            target: "neurocell-cell",
            "Built cell {}: {} soma, {} dendrite, {} axon sections",
            model,
            model.soma_ids().len(),
            model.dend_ids().len(),
            model.axon_ids().len()
        );
        Ok(model)
    }
}

/// Build the cell from an SWC file with the built-in parameters
pub fn load_cell(path: &Path, name: Option<&str>, offset: Point3) -> CellResult<CellModel> {
    let mut builder = CellModelBuilder::new().with_offset(offset);
    if let Some(name) = name {
        builder = builder.with_name(name);
    }
    builder.build_from_file(&SwcLoader::new(), path)
}
