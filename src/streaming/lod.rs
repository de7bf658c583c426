//! Level-of-detail selection for terrain chunks
//!
//! Each [`LodLevel`] pairs a mesh decimation factor with the viewer
//! distance out to which it is used. Levels are configured in strictly
//! increasing distance order; a chunk farther than the last threshold
//! is not visible at all.

use serde::{Deserialize, Serialize};

/// One entry of the detail-level ladder
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    /// Mesh decimation factor (0 = full detail)
    pub lod: u32,
    /// Viewer distance out to which this level is shown
    pub visible_distance: f32,
}

impl LodLevel {
    pub fn new(lod: u32, visible_distance: f32) -> Self {
        Self {
            lod,
            visible_distance,
        }
    }

    pub fn sqr_visible_distance(&self) -> f32 {
        self.visible_distance * self.visible_distance
    }
}

/// Pick the detail level for a chunk at `distance` from the viewer
///
/// Scans in increasing-distance order and returns the first level whose
/// threshold covers the distance, defaulting to the coarsest level.
/// Monotonic thresholds are a validated precondition.
pub fn select_lod(levels: &[LodLevel], distance: f32) -> usize {
    for (index, level) in levels.iter().enumerate() {
        if distance <= level.visible_distance {
            return index;
        }
    }
    levels.len().saturating_sub(1)
}
