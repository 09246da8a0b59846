// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The assembled cell

use std::fmt;

use serde::Serialize;

use crate::parameters::{ParameterScope, SimulationConditions};
use crate::section::{Section, SectionGroup, SectionId};

/// Identifier used when a cell is built without a name
pub const DEFAULT_CELL_NAME: &str = "Neuron473561660";

/// Owns every section of one cell plus the group collections that index
/// into them. Each section is in exactly one group and in `all`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellModel {
    name: String,
    sections: Vec<Section>,
    soma: Vec<SectionId>,
    dend: Vec<SectionId>,
    axon: Vec<SectionId>,
    all: Vec<SectionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conditions: Option<SimulationConditions>,
}

impl CellModel {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
            soma: Vec::new(),
            dend: Vec::new(),
            axon: Vec::new(),
            all: Vec::new(),
            conditions: None,
        }
    }

    /// Take ownership of a section and register it in its group and `all`
    pub(crate) fn push_section(&mut self, section: Section) -> SectionId {
        let id = SectionId(self.sections.len());
        match section.group() {
            SectionGroup::Soma => self.soma.push(id),
            SectionGroup::Dendrite => self.dend.push(id),
            SectionGroup::Axon => self.axon.push(id),
        }
        self.all.push(id);
        self.sections.push(section);
        id
    }

    pub(crate) fn section_mut(&mut self, id: SectionId) -> &mut Section {
        &mut self.sections[id.0]
    }

    pub(crate) fn set_conditions(&mut self, conditions: Option<SimulationConditions>) {
        self.conditions = conditions;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.0)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    pub fn id_of(&self, name: &str) -> Option<SectionId> {
        self.sections.iter().position(|s| s.name() == name).map(SectionId)
    }

    pub fn soma_ids(&self) -> &[SectionId] {
        &self.soma
    }

    pub fn dend_ids(&self) -> &[SectionId] {
        &self.dend
    }

    pub fn axon_ids(&self) -> &[SectionId] {
        &self.axon
    }

    pub fn all_ids(&self) -> &[SectionId] {
        &self.all
    }

    pub fn group_ids(&self, group: SectionGroup) -> &[SectionId] {
        match group {
            SectionGroup::Soma => &self.soma,
            SectionGroup::Dendrite => &self.dend,
            SectionGroup::Axon => &self.axon,
        }
    }

    pub fn scope_ids(&self, scope: ParameterScope) -> &[SectionId] {
        match scope {
            ParameterScope::All => &self.all,
            ParameterScope::Group(group) => self.group_ids(group),
        }
    }

    pub fn soma(&self) -> impl Iterator<Item = &Section> + '_ {
        self.resolve(&self.soma)
    }

    pub fn dend(&self) -> impl Iterator<Item = &Section> + '_ {
        self.resolve(&self.dend)
    }

    pub fn axon(&self) -> impl Iterator<Item = &Section> + '_ {
        self.resolve(&self.axon)
    }

    pub fn all(&self) -> impl Iterator<Item = &Section> + '_ {
        self.resolve(&self.all)
    }

    /// Optional run conditions supplied by a fitted parameter file
    pub fn conditions(&self) -> Option<&SimulationConditions> {
        self.conditions.as_ref()
    }

    fn resolve<'a>(&'a self, ids: &'a [SectionId]) -> impl Iterator<Item = &'a Section> + 'a {
        ids.iter().map(move |id| &self.sections[id.0])
    }
}

impl fmt::Display for CellModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
