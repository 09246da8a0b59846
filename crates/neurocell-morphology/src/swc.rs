// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
SWC record parser.

## Format

```text
# id  type  x      y      z     radius  parent
1     1     0.0    0.0    0.0   5.0     -1
2     3     10.0   0.0    0.0   1.0     1
```

- `#` starts a comment (whole line or trailing)
- blank lines are ignored
- columns beyond the seventh are ignored
- a negative parent id marks a root sample

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point3;
use crate::types::{MorphologyError, MorphologyResult};

/// Structure identifier from the SWC `type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StructureType {
    Undefined,
    Soma,
    Axon,
    BasalDendrite,
    ApicalDendrite,
    Custom(u32),
}

impl StructureType {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => StructureType::Undefined,
            1 => StructureType::Soma,
            2 => StructureType::Axon,
            3 => StructureType::BasalDendrite,
            4 => StructureType::ApicalDendrite,
            other => StructureType::Custom(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            StructureType::Undefined => 0,
            StructureType::Soma => 1,
            StructureType::Axon => 2,
            StructureType::BasalDendrite => 3,
            StructureType::ApicalDendrite => 4,
            StructureType::Custom(code) => *code,
        }
    }

    /// Prefix used when naming sections of this type (`dend[3]`, `cell7[0]`)
    pub fn section_prefix(&self) -> String {
        match self {
            StructureType::Soma => "soma".to_string(),
            StructureType::Axon => "axon".to_string(),
            StructureType::BasalDendrite => "dend".to_string(),
            StructureType::ApicalDendrite => "apic".to_string(),
            StructureType::Undefined | StructureType::Custom(_) => format!("cell{}", self.code()),
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureType::Undefined => write!(f, "undefined"),
            StructureType::Soma => write!(f, "soma"),
            StructureType::Axon => write!(f, "axon"),
            StructureType::BasalDendrite => write!(f, "basal dendrite"),
            StructureType::ApicalDendrite => write!(f, "apical dendrite"),
            StructureType::Custom(code) => write!(f, "custom type {}", code),
        }
    }
}

/// One parsed SWC line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwcRecord {
    pub id: i64,
    pub kind: StructureType,
    pub position: Point3,
    pub radius: f64,
    pub parent: Option<i64>,
    /// 1-based source line, kept for diagnostics
    pub line: usize,
}

/// Parse SWC text into records, in file order.
///
/// Every parent must be defined on an earlier line, so the returned list is
/// already topologically ordered.
pub fn parse_swc(text: &str) -> MorphologyResult<Vec<SwcRecord>> {
    let mut records = Vec::new();
    let mut seen: HashMap<i64, usize> = HashMap::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let content = match raw_line.find('#') {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        };

        let columns: Vec<&str> = content.split_whitespace().collect();
        if columns.is_empty() {
            continue;
        }
        if columns.len() < 7 {
            return Err(MorphologyError::ColumnCount {
                line,
                found: columns.len(),
            });
        }

        let id = parse_integer(columns[0], line, "id")?;
        let code = parse_integer(columns[1], line, "type")?;
        let code = u32::try_from(code).map_err(|_| MorphologyError::InvalidNumber {
            line,
            column: "type",
            value: columns[1].to_string(),
        })?;
        let x = parse_float(columns[2], line, "x")?;
        let y = parse_float(columns[3], line, "y")?;
        let z = parse_float(columns[4], line, "z")?;
        let radius = parse_float(columns[5], line, "radius")?;
        if radius < 0.0 {
            return Err(MorphologyError::NegativeRadius { line, radius });
        }
        let parent = parse_integer(columns[6], line, "parent")?;
        let parent = if parent < 0 { None } else { Some(parent) };

        if let Some(&first_line) = seen.get(&id) {
            return Err(MorphologyError::DuplicateId {
                line,
                id,
                first_line,
            });
        }
        if let Some(parent) = parent {
            if parent == id {
                return Err(MorphologyError::SelfParent { line, id });
            }
            if !seen.contains_key(&parent) {
                return Err(MorphologyError::UndefinedParent { line, id, parent });
            }
        }
        seen.insert(id, line);

        records.push(SwcRecord {
            id,
            kind: StructureType::from_code(code),
            position: Point3::new(x, y, z),
            radius,
            parent,
            line,
        });
    }

    if records.is_empty() {
        return Err(MorphologyError::Empty);
    }

    Ok(records)
}

fn parse_integer(value: &str, line: usize, column: &'static str) -> MorphologyResult<i64> {
    // Some exporters write integer columns as "12.0"
    if let Ok(parsed) = value.parse::<i64>() {
        return Ok(parsed);
    }
    match value.parse::<f64>() {
        Ok(parsed) if parsed.fract() == 0.0 && parsed.is_finite() => Ok(parsed as i64),
        _ => Err(MorphologyError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        }),
    }
}

fn parse_float(value: &str, line: usize, column: &'static str) -> MorphologyResult<f64> {
    let parsed = value
        .parse::<f64>()
        .map_err(|_| MorphologyError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        })?;
    if !parsed.is_finite() {
        return Err(MorphologyError::NonFinite { line, column });
    }
    Ok(parsed)
}
