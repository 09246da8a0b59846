// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Spatial discretization
//!
//! Each section gets an odd number of segments, `1 + 2 * floor(L / d)`, so
//! there is always a segment centered on the section midpoint.

use tracing::debug;

use crate::model::CellModel;

/// Segment length the odd-count rule is based on (µm)
pub const DEFAULT_SEGMENT_LENGTH_UM: f64 = 40.0;

/// Largest odd segment count representable in `u32`
pub const MAX_SEGMENTS: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRule {
    segment_length_um: f64,
}

impl Default for SegmentRule {
    fn default() -> Self {
        Self {
            segment_length_um: DEFAULT_SEGMENT_LENGTH_UM,
        }
    }
}

impl SegmentRule {
    /// Non-positive or non-finite lengths fall back to the default
    pub fn new(segment_length_um: f64) -> Self {
        if segment_length_um.is_finite() && segment_length_um > 0.0 {
            Self { segment_length_um }
        } else {
            Self::default()
        }
    }

    pub fn segment_length_um(&self) -> f64 {
        self.segment_length_um
    }

    /// Odd segment count for a section of `length_um`; saturates at
    /// [`MAX_SEGMENTS`]
    pub fn segments_for(&self, length_um: f64) -> u32 {
        let steps = (length_um / self.segment_length_um).floor();
        if steps.is_nan() || steps <= 0.0 {
            return 1;
        }
        let max_steps = u64::from((MAX_SEGMENTS - 1) / 2);
        let steps = if steps.is_finite() { (steps as u64).min(max_steps) } else { max_steps };
        // steps <= (u32::MAX - 1) / 2, so the result fits
        u32::try_from(1 + 2 * steps).unwrap_or(MAX_SEGMENTS)
    }

    /// Set the segment count of every section in "all"
    pub fn apply(&self, model: &mut CellModel) {
        let ids: Vec<_> = model.all_ids().to_vec();
        for id in ids {
            let section = model.section_mut(id);
            let segments = self.segments_for(section.length());
            section.set_segments(segments);
        }
        debug!(
            target: "neurocell-cell",
            "Discretized {} sections ({} µm rule), {} segments total",
            model.all_ids().len(),
            self.segment_length_um,
            model.all().map(|s| s.segments() as u64).sum::<u64>()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_segment_counts() {
        let rule = SegmentRule::default();
        assert_eq!(rule.segments_for(0.0), 1);
        assert_eq!(rule.segments_for(30.0), 1);
        assert_eq!(rule.segments_for(39.999), 1);
        assert_eq!(rule.segments_for(40.0), 3);
        assert_eq!(rule.segments_for(45.0), 3);
        assert_eq!(rule.segments_for(85.0), 5);
        assert_eq!(rule.segments_for(400.0), 21);
    }

    #[test]
    fn test_huge_lengths_saturate() {
        let rule = SegmentRule::default();
        assert_eq!(rule.segments_for(1e12), MAX_SEGMENTS);
        assert_eq!(rule.segments_for(f64::INFINITY), MAX_SEGMENTS);
        assert_eq!(rule.segments_for(f64::NAN), 1);
        assert_eq!(SegmentRule::new(1.0).segments_for(4e9), MAX_SEGMENTS);
        assert_eq!(SegmentRule::new(1.0).segments_for(1000.0), 2001);
    }

    #[test]
    fn test_custom_and_invalid_lengths() {
        assert_eq!(SegmentRule::new(10.0).segments_for(45.0), 9);
        assert_eq!(SegmentRule::new(0.0), SegmentRule::default());
        assert_eq!(SegmentRule::new(f64::NAN).segment_length_um(), DEFAULT_SEGMENT_LENGTH_UM);
    }
}
