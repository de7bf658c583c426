//! Row-major 2-D grid of f32 values
//!
//! Shared container for noise maps, falloff masks, and height maps.

use serde::{Deserialize, Serialize};

/// Dense row-major grid of f32 values
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl Grid {
    /// Create a zero-filled grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Create a grid from existing row-major values
    ///
    /// Panics if `values.len() != width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), width * height, "grid value count mismatch");
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.values[y * self.width + x] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Minimum and maximum value over the whole grid
    ///
    /// Returns (0.0, 0.0) for an empty grid.
    pub fn min_max(&self) -> (f32, f32) {
        if self.values.is_empty() {
            return (0.0, 0.0);
        }
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.values {
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert!(grid.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_get_set_row_major() {
        let mut grid = Grid::new(3, 2);
        grid.set(2, 1, 7.0);
        assert_eq!(grid.get(2, 1), 7.0);
        assert_eq!(grid.as_slice()[5], 7.0);
    }

    #[test]
    fn test_min_max() {
        let grid = Grid::from_values(2, 2, vec![0.5, -1.0, 3.0, 0.0]);
        assert_eq!(grid.min_max(), (-1.0, 3.0));
    }

    #[test]
    #[should_panic]
    fn test_from_values_length_mismatch() {
        Grid::from_values(2, 2, vec![0.0; 3]);
    }
}
