//! Edge-attenuation (falloff) masks
//!
//! A falloff mask pushes terrain height down toward the edges of a
//! chunk-sized grid, turning a height map into an island-like patch.
//! The mask depends only on grid position, never on the sample center,
//! so one mask per grid size serves every chunk; [`FalloffCache`]
//! memoizes by size.

use std::collections::HashMap;
use std::sync::Arc;

use crate::math::Grid;

/// Steepness of the falloff transition
const FALLOFF_STEEPNESS: f32 = 3.0;
/// Midpoint shift of the falloff transition
const FALLOFF_SHIFT: f32 = 2.2;

/// Precomputed square attenuation mask, highest at the grid edges
#[derive(Clone, Debug)]
pub struct FalloffMap {
    values: Grid,
}

impl FalloffMap {
    /// Generate the mask for a `size` x `size` grid
    pub fn generate(size: usize) -> Self {
        let mut values = Grid::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let sample_x = x as f32 / size as f32 * 2.0 - 1.0;
                let sample_y = y as f32 / size as f32 * 2.0 - 1.0;
                let value = sample_x.abs().max(sample_y.abs());
                values.set(x, y, evaluate(value));
            }
        }
        Self { values }
    }

    pub fn size(&self) -> usize {
        self.values.width()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values.get(x, y)
    }
}

/// Shape the linear edge distance into an s-curve
fn evaluate(value: f32) -> f32 {
    let a = FALLOFF_STEEPNESS;
    let b = FALLOFF_SHIFT;
    value.powf(a) / (value.powf(a) + (b - b * value).powf(a))
}

/// Per-size memo cache for falloff masks
///
/// Owned by whoever builds height maps; no process-wide state.
#[derive(Default)]
pub struct FalloffCache {
    maps: HashMap<usize, Arc<FalloffMap>>,
}

impl FalloffCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the mask for `size`, generating it on first request
    pub fn get(&mut self, size: usize) -> Arc<FalloffMap> {
        self.maps
            .entry(size)
            .or_insert_with(|| Arc::new(FalloffMap::generate(size)))
            .clone()
    }
}
