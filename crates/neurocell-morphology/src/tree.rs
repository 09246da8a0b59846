// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Immutable morphology tree built from SWC records.

## Section rules

- Connected soma samples form one soma section per connected component.
  A single-point soma is expanded to a three-sample cylinder along x whose
  length equals its diameter; the three-point soma convention (root with two
  soma children) is ordered `child, root, child`.
- Other samples are split into unbranched runs. A sample opens a new section
  when it is a root, when its parent has a different type, or when its parent
  has more than one child.
- A section hanging off a non-soma parent repeats the parent sample as its
  first sample and attaches at the parent's distal end (1.0). A section
  hanging off the soma attaches at the soma midpoint (0.5).

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{mean_diameter, path_length, Point3, Sample};
use crate::swc::{StructureType, SwcRecord};

/// Where a section's proximal end joins its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Index of the parent section in the tree
    pub section: usize,
    /// Normalized position along the parent (0.0 proximal, 1.0 distal)
    pub location: f64,
}

/// An unbranched run of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphologySection {
    pub name: String,
    pub kind: StructureType,
    pub samples: Vec<Sample>,
    pub parent: Option<Attachment>,
}

impl MorphologySection {
    pub fn length(&self) -> f64 {
        path_length(&self.samples)
    }

    pub fn diameter(&self) -> f64 {
        mean_diameter(&self.samples)
    }
}

/// Parsed morphology; sections are ordered so parents precede children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphologyTree {
    sections: Vec<MorphologySection>,
}

impl MorphologyTree {
    /// Assemble sections from topologically ordered records (as produced by
    /// [`crate::swc::parse_swc`]).
    pub fn from_records(records: &[SwcRecord]) -> Self {
        let index_of: HashMap<i64, usize> = records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.id, idx))
            .collect();

        let parent_of: Vec<Option<usize>> = records
            .iter()
            .map(|record| record.parent.and_then(|p| index_of.get(&p).copied()))
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
        for (idx, parent) in parent_of.iter().enumerate() {
            if let Some(parent) = parent {
                children[*parent].push(idx);
            }
        }

        // Pass 1: assign every record to a section
        let mut section_of: Vec<usize> = vec![usize::MAX; records.len()];
        let mut members: Vec<Vec<usize>> = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            let continues = match parent_of[idx] {
                Some(parent) => {
                    let parent_kind = records[parent].kind;
                    if record.kind == StructureType::Soma {
                        parent_kind == StructureType::Soma
                    } else {
                        parent_kind == record.kind && children[parent].len() == 1
                    }
                }
                None => false,
            };

            if continues {
                let parent = parent_of[idx].unwrap_or(idx);
                section_of[idx] = section_of[parent];
                members[section_of[idx]].push(idx);
            } else {
                section_of[idx] = members.len();
                members.push(vec![idx]);
            }
        }

        // Pass 2: samples and attachments
        let mut sections = Vec::with_capacity(members.len());
        for group in &members {
            let first = group[0];
            let kind = records[first].kind;

            let mut samples = Vec::new();
            let mut parent = None;

            if let Some(parent_idx) = parent_of[first] {
                let parent_kind = records[parent_idx].kind;
                let location = if parent_kind == StructureType::Soma {
                    0.5
                } else {
                    if kind != StructureType::Soma {
                        samples.push(sample_of(&records[parent_idx]));
                    }
                    1.0
                };
                parent = Some(Attachment {
                    section: section_of[parent_idx],
                    location,
                });
            }

            if kind == StructureType::Soma {
                samples.extend(soma_samples(records, &children, first));
            } else {
                samples.extend(group.iter().map(|&idx| sample_of(&records[idx])));
            }

            sections.push(MorphologySection {
                name: String::new(),
                kind,
                samples,
                parent,
            });
        }

        assign_names(&mut sections);
        debug!(
            target: "neurocell-morphology",
            "Assembled {} sections from {} samples",
            sections.len(),
            records.len()
        );

        Self { sections }
    }

    pub fn sections(&self) -> &[MorphologySection] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&MorphologySection> {
        self.sections.get(index)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Indices of sections of the given kind, in tree order
    pub fn indices_of(&self, kind: StructureType) -> Vec<usize> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == kind)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn has_soma(&self) -> bool {
        self.sections.iter().any(|s| s.kind == StructureType::Soma)
    }

    /// Copy of the tree with every sample shifted by `offset`
    pub fn translated(&self, offset: Point3) -> MorphologyTree {
        let sections = self
            .sections
            .iter()
            .map(|section| MorphologySection {
                samples: section.samples.iter().map(|s| s.translate(offset)).collect(),
                ..section.clone()
            })
            .collect();
        MorphologyTree { sections }
    }

    /// Copy of the tree without the sections matching `drop` and everything
    /// that descends from them. Remaining sections are renumbered per kind.
    pub fn pruned<F>(&self, drop: F) -> MorphologyTree
    where
        F: Fn(&MorphologySection) -> bool,
    {
        let mut new_index: Vec<Option<usize>> = Vec::with_capacity(self.sections.len());
        let mut sections = Vec::new();

        for section in &self.sections {
            let parent_dropped = section
                .parent
                .map(|a| new_index[a.section].is_none())
                .unwrap_or(false);

            if parent_dropped || drop(section) {
                new_index.push(None);
                continue;
            }

            let parent = section.parent.map(|a| Attachment {
                section: new_index[a.section].unwrap_or(a.section),
                location: a.location,
            });
            new_index.push(Some(sections.len()));
            sections.push(MorphologySection {
                parent,
                ..section.clone()
            });
        }

        assign_names(&mut sections);
        MorphologyTree { sections }
    }
}

fn sample_of(record: &SwcRecord) -> Sample {
    Sample::new(record.position, record.radius * 2.0)
}

/// Samples of the soma component rooted at `root`
fn soma_samples(records: &[SwcRecord], children: &[Vec<usize>], root: usize) -> Vec<Sample> {
    let soma_children = |idx: usize| -> Vec<usize> {
        children[idx]
            .iter()
            .copied()
            .filter(|&c| records[c].kind == StructureType::Soma)
            .collect()
    };

    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(idx) = stack.pop() {
        order.push(idx);
        // reversed so the first child is visited first
        stack.extend(soma_children(idx).into_iter().rev());
    }

    match order.len() {
        1 => {
            let record = &records[root];
            let diameter = record.radius * 2.0;
            let p = record.position;
            [p.x - diameter / 2.0, p.x, p.x + diameter / 2.0]
                .into_iter()
                .map(|x| Sample::new(Point3::new(x, p.y, p.z), diameter))
                .collect()
        }
        3 if soma_children(root).len() == 2 => {
            let pair = soma_children(root);
            [pair[0], root, pair[1]]
                .into_iter()
                .map(|idx| sample_of(&records[idx]))
                .collect()
        }
        _ => order.into_iter().map(|idx| sample_of(&records[idx])).collect(),
    }
}

fn assign_names(sections: &mut [MorphologySection]) {
    let mut counters: HashMap<StructureType, usize> = HashMap::new();
    for section in sections.iter_mut() {
        let counter = counters.entry(section.kind).or_insert(0);
        section.name = format!("{}[{}]", section.kind.section_prefix(), counter);
        *counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swc::parse_swc;

    const BRANCHED: &str = "\
1 1 0 0 0 5 -1
2 3 10 0 0 1 1
3 3 55 0 0 1 2
4 3 55 30 0 0.5 3
5 3 55 85 0 0.5 4
6 3 95 0 0 0.5 3
7 2 0 -10 0 0.5 1
8 2 0 -200 0 0.5 7
9 4 0 10 0 2 1
10 4 0 30 0 1.5 9
";

    fn tree(text: &str) -> MorphologyTree {
        MorphologyTree::from_records(&parse_swc(text).unwrap())
    }

    #[test]
    fn test_sections_split_at_branch_points() {
        let tree = tree(BRANCHED);
        let names: Vec<&str> = tree.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["soma[0]", "dend[0]", "dend[1]", "dend[2]", "axon[0]", "apic[0]"]
        );

        let dend0 = &tree.sections()[1];
        assert_eq!(dend0.samples.len(), 2);
        assert_eq!(dend0.length(), 45.0);
        assert_eq!(dend0.parent, Some(Attachment { section: 0, location: 0.5 }));

        // child of a branch point repeats the branch sample
        let dend1 = &tree.sections()[2];
        assert_eq!(dend1.samples[0].position, Point3::new(55.0, 0.0, 0.0));
        assert_eq!(dend1.samples.len(), 3);
        assert_eq!(dend1.length(), 85.0);
        assert_eq!(dend1.parent, Some(Attachment { section: 1, location: 1.0 }));

        let dend2 = &tree.sections()[3];
        assert_eq!(dend2.length(), 40.0);
        assert_eq!(dend2.parent, Some(Attachment { section: 1, location: 1.0 }));

        let axon = &tree.sections()[4];
        assert_eq!(axon.kind, StructureType::Axon);
        assert_eq!(axon.samples.len(), 2);
    }

    #[test]
    fn test_single_point_soma_becomes_cylinder() {
        let tree = tree(BRANCHED);
        let soma = &tree.sections()[0];
        assert_eq!(soma.parent, None);
        assert_eq!(soma.samples.len(), 3);
        assert_eq!(soma.samples[0].position, Point3::new(-5.0, 0.0, 0.0));
        assert_eq!(soma.samples[1].position, Point3::ORIGIN);
        assert_eq!(soma.samples[2].position, Point3::new(5.0, 0.0, 0.0));
        assert!(soma.samples.iter().all(|s| s.diameter == 10.0));
        assert_eq!(soma.length(), 10.0);
        assert_eq!(soma.diameter(), 10.0);
    }

    #[test]
    fn test_three_point_soma_convention() {
        let tree = tree("1 1 0 0 0 4 -1\n2 1 0 -4 0 4 1\n3 1 0 4 0 4 1\n4 3 6 0 0 1 1\n");
        let soma = &tree.sections()[0];
        let ys: Vec<f64> = soma.samples.iter().map(|s| s.position.y).collect();
        assert_eq!(ys, vec![-4.0, 0.0, 4.0]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.sections()[1].parent.unwrap().location, 0.5);
    }

    #[test]
    fn test_contour_soma_keeps_traversal_order() {
        let tree = tree("1 1 0 0 0 3 -1\n2 1 2 0 0 3 1\n3 1 4 0 0 3 2\n4 1 6 0 0 3 3\n");
        assert_eq!(tree.len(), 1);
        let xs: Vec<f64> = tree.sections()[0].samples.iter().map(|s| s.position.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_type_change_opens_section() {
        let tree = tree("1 1 0 0 0 3 -1\n2 3 5 0 0 1 1\n3 3 10 0 0 1 2\n4 7 15 0 0 1 3\n");
        let names: Vec<&str> = tree.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["soma[0]", "dend[0]", "cell7[0]"]);
        let custom = &tree.sections()[2];
        assert_eq!(custom.samples.len(), 2);
        assert_eq!(custom.parent, Some(Attachment { section: 1, location: 1.0 }));
    }

    #[test]
    fn test_translated_shifts_every_sample() {
        let base = tree(BRANCHED);
        let offset = Point3::new(1.0, 2.0, 3.0);
        let moved = base.translated(offset);
        for (a, b) in base.sections().iter().zip(moved.sections()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.parent, b.parent);
            for (sa, sb) in a.samples.iter().zip(&b.samples) {
                assert_eq!(sa.position.translate(offset), sb.position);
                assert_eq!(sa.diameter, sb.diameter);
            }
        }
    }

    #[test]
    fn test_pruned_drops_subtrees_and_renumbers() {
        // dendrite hanging off the axon goes with it
        let tree = tree(
            "1 1 0 0 0 3 -1\n2 2 0 -5 0 1 1\n3 2 0 -9 0 1 2\n4 3 0 -20 0 1 3\n5 3 5 0 0 1 1\n",
        );
        assert_eq!(tree.len(), 4);
        let pruned = tree.pruned(|s| s.kind == StructureType::Axon);
        let names: Vec<&str> = pruned.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["soma[0]", "dend[0]"]);
        assert_eq!(pruned.sections()[1].samples[0].position, Point3::new(5.0, 0.0, 0.0));
        assert_eq!(pruned.sections()[1].parent, Some(Attachment { section: 0, location: 0.5 }));
        assert!(pruned.indices_of(StructureType::Axon).is_empty());
    }

    #[test]
    fn test_tree_without_soma() {
        let tree = tree("1 3 0 0 0 1 -1\n2 3 5 0 0 1 1\n");
        assert!(!tree.has_soma());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.sections()[0].parent, None);
    }
}
