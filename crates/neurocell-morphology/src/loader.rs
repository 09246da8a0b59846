// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Morphology loading from files
//!
//! [`MorphologyLoader`] is the seam between cell construction and the file
//! format. [`SwcLoader`] is the only implementation shipped here.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::geometry::Point3;
use crate::swc::{parse_swc, StructureType};
use crate::tree::MorphologyTree;
use crate::types::{MorphologyError, MorphologyResult};

/// Options applied while loading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Added to every sample position
    pub offset: Point3,
    /// When false, axon sections and everything below them are not created
    pub include_axon: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            offset: Point3::ORIGIN,
            include_axon: true,
        }
    }
}

impl LoadOptions {
    pub fn with_offset(mut self, offset: Point3) -> Self {
        self.offset = offset;
        self
    }

    pub fn without_axon(mut self) -> Self {
        self.include_axon = false;
        self
    }
}

/// Produces an immutable morphology tree from a file
pub trait MorphologyLoader {
    fn load(&self, path: &Path, options: &LoadOptions) -> MorphologyResult<MorphologyTree>;
}

/// Loader for SWC reconstructions
#[derive(Debug, Clone, Copy, Default)]
pub struct SwcLoader;

impl SwcLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse SWC text directly
    pub fn load_str(&self, text: &str, options: &LoadOptions) -> MorphologyResult<MorphologyTree> {
        let records = parse_swc(text)?;
        let mut tree = MorphologyTree::from_records(&records);

        if !options.include_axon {
            let before = tree.len();
            tree = tree.pruned(|s| s.kind == StructureType::Axon);
            if tree.len() != before {
                debug!(
                    target: "neurocell-morphology",
                    "Dropped {} reconstructed axon sections",
                    before - tree.len()
                );
            }
        }

        if !options.offset.is_origin() {
            tree = tree.translated(options.offset);
        }

        Ok(tree)
    }
}

impl MorphologyLoader for SwcLoader {
    fn load(&self, path: &Path, options: &LoadOptions) -> MorphologyResult<MorphologyTree> {
        let text = fs::read_to_string(path).map_err(|source| MorphologyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tree = self.load_str(&text, options)?;
        info!(
            target: "neurocell-morphology",
            "Loaded {} sections from {}",
            tree.len(),
            path.display()
        );
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const SWC: &str = "\
1 1 0 0 0 5 -1
2 3 10 0 0 1 1
3 3 50 0 0 1 2
4 2 0 -10 0 0.5 1
5 2 0 -60 0 0.5 4
";

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cell.swc");
        let mut file = File::create(&path).unwrap();
        write!(file, "{}", SWC).unwrap();

        let tree = SwcLoader::new().load(&path, &LoadOptions::default()).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.indices_of(StructureType::Axon), vec![2]);
    }

    #[test]
    fn test_load_without_axon_and_offset() {
        let options = LoadOptions::default()
            .without_axon()
            .with_offset(Point3::new(100.0, 0.0, -1.0));
        let tree = SwcLoader::new().load_str(SWC, &options).unwrap();

        assert_eq!(tree.len(), 2);
        assert!(tree.indices_of(StructureType::Axon).is_empty());
        let dend = &tree.sections()[1];
        assert_eq!(dend.samples[0].position, Point3::new(110.0, 0.0, -1.0));
        assert_eq!(dend.samples[1].position, Point3::new(150.0, 0.0, -1.0));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.swc");
        let err = SwcLoader::new().load(&path, &LoadOptions::default()).unwrap_err();
        match err {
            MorphologyError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
