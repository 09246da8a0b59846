// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! 3D geometry primitives for traced neurites (all units µm)

use serde::{Deserialize, Serialize};

/// Position in reconstruction space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Shift by `offset` along each axis
    #[inline]
    pub fn translate(&self, offset: Point3) -> Point3 {
        Point3::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }

    #[inline]
    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(v: [f64; 3]) -> Self {
        Point3::new(v[0], v[1], v[2])
    }
}

/// One traced sample: a position and the cable diameter there
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub position: Point3,
    pub diameter: f64,
}

impl Sample {
    pub const fn new(position: Point3, diameter: f64) -> Self {
        Self { position, diameter }
    }

    pub fn translate(&self, offset: Point3) -> Sample {
        Sample::new(self.position.translate(offset), self.diameter)
    }
}

/// Path length through consecutive samples
pub fn path_length(samples: &[Sample]) -> f64 {
    samples
        .windows(2)
        .map(|pair| pair[0].position.distance(&pair[1].position))
        .sum()
}

/// Length-weighted mean diameter of the frusta between consecutive samples.
///
/// Falls back to the plain mean of sample diameters when the path has zero
/// length, and to 0.0 for an empty slice.
pub fn mean_diameter(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut weighted = 0.0;
    let mut total = 0.0;
    for pair in samples.windows(2) {
        let length = pair[0].position.distance(&pair[1].position);
        weighted += length * (pair[0].diameter + pair[1].diameter) / 2.0;
        total += length;
    }

    if total > 0.0 {
        weighted / total
    } else {
        samples.iter().map(|s| s.diameter).sum::<f64>() / samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_adds_offset() {
        let p = Point3::new(1.0, -2.0, 3.5).translate(Point3::new(10.0, 20.0, -3.5));
        assert_eq!(p, Point3::new(11.0, 18.0, 0.0));
    }

    #[test]
    fn test_path_length_sums_segments() {
        let samples = [
            Sample::new(Point3::new(0.0, 0.0, 0.0), 1.0),
            Sample::new(Point3::new(3.0, 4.0, 0.0), 1.0),
            Sample::new(Point3::new(3.0, 4.0, 10.0), 1.0),
        ];
        assert_eq!(path_length(&samples), 15.0);
        assert_eq!(path_length(&samples[..1]), 0.0);
    }

    #[test]
    fn test_mean_diameter_is_length_weighted() {
        let samples = [
            Sample::new(Point3::new(0.0, 0.0, 0.0), 2.0),
            Sample::new(Point3::new(10.0, 0.0, 0.0), 2.0),
            Sample::new(Point3::new(40.0, 0.0, 0.0), 4.0),
        ];
        // (10 * 2 + 30 * 3) / 40
        assert_eq!(mean_diameter(&samples), 2.75);
    }

    #[test]
    fn test_mean_diameter_zero_length() {
        let samples = [
            Sample::new(Point3::ORIGIN, 1.0),
            Sample::new(Point3::ORIGIN, 3.0),
        ];
        assert_eq!(mean_diameter(&samples), 2.0);
        assert_eq!(mean_diameter(&[]), 0.0);
    }
}
