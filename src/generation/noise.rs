//! Fractal noise synthesis
//!
//! Multi-octave coherent noise with seeded per-octave offsets. Each
//! octave samples Perlin noise at increasing frequency and decreasing
//! amplitude; the per-octave offsets are drawn from a seeded ChaCha
//! stream so identical settings reproduce identical grids on every
//! platform. Two normalization modes are supported: `Local` remaps the
//! observed extremes of one grid to [0, 1], `Global` divides by the
//! theoretical amplitude sum so values are comparable across
//! independently generated chunks.

use ::noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::math::Grid;

/// Smallest usable noise scale; configured values below this are clamped
pub const MIN_NOISE_SCALE: f32 = 0.01;

/// Half-range of the random per-octave sample offsets
const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// How accumulated octave values are mapped into the output range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Remap the observed min/max of this grid to exactly [0, 1].
    /// Best per-chunk contrast, but neighboring chunks disagree at seams.
    Local,
    /// Divide by the theoretical maximum amplitude sum, clamped to >= 0.
    /// Values are consistent across chunks at the cost of full-range
    /// coverage within any single chunk.
    Global,
}

/// Parameters controlling fractal noise synthesis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseSettings {
    pub normalize_mode: NormalizeMode,
    /// Horizontal feature scale (larger = smoother)
    pub scale: f32,
    /// Number of noise passes summed together
    pub octaves: u32,
    /// Per-octave amplitude decay (0-1)
    pub persistence: f32,
    /// Per-octave frequency growth (>= 1)
    pub lacunarity: f32,
    pub seed: u32,
    /// World-space offset added to every sample position
    pub offset: Vec2,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            normalize_mode: NormalizeMode::Global,
            scale: 50.0,
            octaves: 6,
            persistence: 0.6,
            lacunarity: 2.0,
            seed: 0,
            offset: Vec2::ZERO,
        }
    }
}

impl NoiseSettings {
    /// Clamp every numeric field into its valid range
    ///
    /// Mirrors configuration-load validation: out-of-range values are
    /// normalized rather than rejected, so the generation path itself
    /// never has to handle them.
    pub fn sanitized(mut self) -> Self {
        self.scale = self.scale.max(MIN_NOISE_SCALE);
        self.octaves = self.octaves.max(1);
        self.lacunarity = self.lacunarity.max(1.0);
        self.persistence = self.persistence.clamp(0.0, 1.0);
        self
    }
}

/// Generate a `width` x `height` grid of fractal noise around `sample_center`
///
/// Deterministic: identical settings and sample center produce a
/// bit-identical grid. Rows are filled in parallel; cell values do not
/// depend on scheduling.
pub fn generate_noise_map(
    width: usize,
    height: usize,
    settings: &NoiseSettings,
    sample_center: Vec2,
) -> Grid {
    if width == 0 || height == 0 {
        return Grid::new(width, height);
    }

    let settings = settings.clone().sanitized();
    let perlin = Perlin::new(settings.seed);

    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed as u64);
    let mut octave_offsets = Vec::with_capacity(settings.octaves as usize);
    let mut max_possible_height = 0.0f32;
    let mut amplitude = 1.0f32;
    for _ in 0..settings.octaves {
        let offset_x = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f32
            + settings.offset.x
            + sample_center.x;
        let offset_y = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f32
            + settings.offset.y
            + sample_center.y;
        octave_offsets.push(Vec2::new(offset_x, offset_y));

        max_possible_height += amplitude;
        amplitude *= settings.persistence;
    }

    let half_width = width as f32 / 2.0;
    let half_height = height as f32 / 2.0;

    let mut map = Grid::new(width, height);
    let (min_value, max_value) = map
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .map(|(y, row)| {
            let mut row_min = f32::INFINITY;
            let mut row_max = f32::NEG_INFINITY;
            for (x, cell) in row.iter_mut().enumerate() {
                let mut amplitude = 1.0f32;
                let mut frequency = 1.0f32;
                let mut value = 0.0f32;

                for offset in &octave_offsets {
                    let sample_x = (x as f32 - half_width + offset.x) / settings.scale * frequency;
                    let sample_y = (y as f32 - half_height + offset.y) / settings.scale * frequency;
                    // Perlin output is already signed in [-1, 1]
                    let sample = perlin.get([sample_x as f64, sample_y as f64]) as f32;
                    value += sample * amplitude;

                    amplitude *= settings.persistence;
                    frequency *= settings.lacunarity;
                }

                row_min = row_min.min(value);
                row_max = row_max.max(value);
                *cell = match settings.normalize_mode {
                    NormalizeMode::Global => {
                        ((value + 1.0) / (max_possible_height / 0.9)).max(0.0)
                    }
                    NormalizeMode::Local => value,
                };
            }
            (row_min, row_max)
        })
        .reduce(
            || (f32::INFINITY, f32::NEG_INFINITY),
            |a, b| (a.0.min(b.0), a.1.max(b.1)),
        );

    if settings.normalize_mode == NormalizeMode::Local {
        let span = max_value - min_value;
        for cell in map.as_mut_slice() {
            *cell = if span > 0.0 {
                (*cell - min_value) / span
            } else {
                0.0
            };
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_settings() -> NoiseSettings {
        NoiseSettings {
            normalize_mode: NormalizeMode::Local,
            ..NoiseSettings::default()
        }
    }

    #[test]
    fn test_local_mode_covers_unit_range() {
        let map = generate_noise_map(32, 32, &local_settings(), Vec2::ZERO);
        let (min, max) = map.min_max();
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
        assert!(map.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_global_mode_is_non_negative() {
        let map = generate_noise_map(32, 32, &NoiseSettings::default(), Vec2::ZERO);
        assert!(map.as_slice().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_deterministic_across_invocations() {
        // Single-octave scenario with no amplitude/frequency progression
        let settings = NoiseSettings {
            normalize_mode: NormalizeMode::Global,
            scale: 50.0,
            octaves: 1,
            persistence: 1.0,
            lacunarity: 1.0,
            seed: 0,
            offset: Vec2::ZERO,
        };
        let a = generate_noise_map(10, 10, &settings, Vec2::ZERO);
        let b = generate_noise_map(10, 10, &settings, Vec2::ZERO);
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_seed_changes_output() {
        let a = generate_noise_map(16, 16, &NoiseSettings::default(), Vec2::ZERO);
        let b = generate_noise_map(
            16,
            16,
            &NoiseSettings {
                seed: 1,
                ..NoiseSettings::default()
            },
            Vec2::ZERO,
        );
        assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_sample_center_shifts_output() {
        let settings = NoiseSettings::default();
        let a = generate_noise_map(16, 16, &settings, Vec2::ZERO);
        let b = generate_noise_map(16, 16, &settings, Vec2::new(100.0, 0.0));
        assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_seam_continuity_between_neighbors() {
        // Two chunks whose sample centers differ by exactly one chunk's
        // span share three overlapping sample columns; in Global mode
        // those columns must agree within float tolerance.
        let settings = NoiseSettings {
            normalize_mode: NormalizeMode::Global,
            scale: 100.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 7,
            offset: Vec2::ZERO,
        };
        let size = 49usize;
        let span = (size - 3) as f32;
        let west = generate_noise_map(size, size, &settings, Vec2::ZERO);
        let east = generate_noise_map(size, size, &settings, Vec2::new(span, 0.0));

        for y in 0..size {
            for shared in 0..3usize {
                let a = west.get(size - 3 + shared, y);
                let b = east.get(shared, y);
                assert!(
                    (a - b).abs() < 0.02,
                    "seam mismatch at column {} row {}: {} vs {}",
                    shared,
                    y,
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_negative_scale_is_clamped_not_an_error() {
        let settings = NoiseSettings {
            scale: -5.0,
            ..local_settings()
        };
        let map = generate_noise_map(8, 8, &settings, Vec2::ZERO);
        assert!(map.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_sanitized_clamps_all_fields() {
        let settings = NoiseSettings {
            scale: 0.0,
            octaves: 0,
            persistence: 1.5,
            lacunarity: 0.5,
            ..NoiseSettings::default()
        }
        .sanitized();
        assert_eq!(settings.scale, MIN_NOISE_SCALE);
        assert_eq!(settings.octaves, 1);
        assert_eq!(settings.persistence, 1.0);
        assert_eq!(settings.lacunarity, 1.0);
    }
}
