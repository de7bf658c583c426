//! Height-map construction
//!
//! Builds the bordered height grid for one chunk: fractal noise,
//! optionally attenuated by a falloff mask, with the observed value
//! range recorded. The grid includes a one-cell border on every side
//! used only for seam-correct normal baking; it is never rendered.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::generation::falloff::FalloffMap;
use crate::generation::noise::{NoiseSettings, generate_noise_map};
use crate::math::{Grid, HeightCurve};

/// Parameters controlling height-map construction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightMapSettings {
    pub noise: NoiseSettings,
    /// Remaps normalized noise values before scaling into world units
    pub height_curve: HeightCurve,
    /// World-space height of a fully remapped value
    pub height_multiplier: f32,
    /// Attenuate heights toward chunk edges
    pub use_falloff: bool,
}

impl Default for HeightMapSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings::default(),
            height_curve: HeightCurve::linear(),
            height_multiplier: 25.0,
            use_falloff: false,
        }
    }
}

impl HeightMapSettings {
    /// Lowest world-space height this configuration can produce
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    /// Highest world-space height this configuration can produce
    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(1.0)
    }
}

/// A chunk's bordered height grid with its observed value range
///
/// Immutable once constructed; built at most once per chunk.
#[derive(Clone, Debug)]
pub struct HeightMap {
    pub values: Grid,
    pub min_value: f32,
    pub max_value: f32,
}

/// Build a `size` x `size` height map centered on `sample_center`
///
/// `size` is the bordered vertex count per line. When a falloff mask is
/// supplied it is subtracted from the noise value and the result is
/// clamped to [0, 1]; callers gate the mask on
/// [`HeightMapSettings::use_falloff`].
pub fn generate_height_map(
    size: usize,
    settings: &HeightMapSettings,
    sample_center: Vec2,
    falloff: Option<&FalloffMap>,
) -> HeightMap {
    let mut values = generate_noise_map(size, size, &settings.noise, sample_center);

    if let Some(falloff) = falloff {
        debug_assert_eq!(falloff.size(), size, "falloff mask size mismatch");
        for y in 0..size {
            for x in 0..size {
                let attenuated = (values.get(x, y) - falloff.get(x, y)).clamp(0.0, 1.0);
                values.set(x, y, attenuated);
            }
        }
    }

    let (min_value, max_value) = values.min_max();
    HeightMap {
        values,
        min_value,
        max_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::noise::NormalizeMode;

    fn settings() -> HeightMapSettings {
        HeightMapSettings {
            noise: NoiseSettings {
                normalize_mode: NormalizeMode::Local,
                seed: 3,
                ..NoiseSettings::default()
            },
            ..HeightMapSettings::default()
        }
    }

    #[test]
    fn test_observed_range_matches_grid() {
        let map = generate_height_map(33, &settings(), Vec2::ZERO, None);
        let (min, max) = map.values.min_max();
        assert_eq!(map.min_value, min);
        assert_eq!(map.max_value, max);
    }

    #[test]
    fn test_deterministic() {
        let a = generate_height_map(25, &settings(), Vec2::new(50.0, -25.0), None);
        let b = generate_height_map(25, &settings(), Vec2::new(50.0, -25.0), None);
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn test_falloff_pushes_edges_down() {
        let size = 33;
        let falloff = FalloffMap::generate(size);
        let plain = generate_height_map(size, &settings(), Vec2::ZERO, None);
        let masked = generate_height_map(size, &settings(), Vec2::ZERO, Some(&falloff));

        // Corner of the mask is ~1, so the masked corner must be 0
        assert_eq!(masked.values.get(0, 0), 0.0);
        assert!(masked.values.get(0, 0) <= plain.values.get(0, 0));
        // Attenuated values stay clamped to [0, 1]
        assert!(
            masked
                .values
                .as_slice()
                .iter()
                .all(|&v| (0.0..=1.0).contains(&v))
        );
    }

    #[test]
    fn test_derived_height_bounds() {
        let settings = HeightMapSettings {
            height_curve: HeightCurve::new(vec![(0.0, 0.2), (1.0, 0.8)]),
            height_multiplier: 10.0,
            ..HeightMapSettings::default()
        };
        assert!((settings.min_height() - 2.0).abs() < 1e-6);
        assert!((settings.max_height() - 8.0).abs() < 1e-6);
    }
}
