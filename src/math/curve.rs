//! Keyframe curve for height remapping
//!
//! [`HeightCurve`] remaps normalized height-map values before they are
//! scaled into world units, the way an artist-authored easing curve
//! would. Keys are `(t, value)` pairs sorted by `t`; sampling clamps at
//! both ends rather than extrapolating.

use serde::{Deserialize, Serialize};

/// Keyframe-based remapping curve with linear interpolation
#[derive(Clone, Debug, PartialEq)]
pub struct HeightCurve {
    keys: Vec<(f32, f32)>,
}

impl HeightCurve {
    /// Create a new curve from unsorted keys. Keys are sorted by time.
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { keys }
    }

    /// Identity curve over [0, 1]
    pub fn linear() -> Self {
        Self {
            keys: vec![(0.0, 0.0), (1.0, 1.0)],
        }
    }

    /// Curve that always returns the same value
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![(0.0, value)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Evaluate the curve at `t`, clamping outside the key range
    pub fn evaluate(&self, t: f32) -> f32 {
        assert!(!self.keys.is_empty(), "HeightCurve must have at least one key");

        let n = self.keys.len();
        if t <= self.keys[0].0 {
            return self.keys[0].1;
        }
        if t >= self.keys[n - 1].0 {
            return self.keys[n - 1].1;
        }

        // keys are sorted ascending; find the bracketing pair
        let upper = self
            .keys
            .iter()
            .position(|k| k.0 > t)
            .unwrap_or(n - 1);
        let (t_a, v_a) = self.keys[upper - 1];
        let (t_b, v_b) = self.keys[upper];
        let span = t_b - t_a;
        if span < 1e-6 {
            return v_a;
        }
        let frac = (t - t_a) / span;
        v_a + (v_b - v_a) * frac
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

// ---------------------------------------------------------------------------
// Serde support
// ---------------------------------------------------------------------------

impl Serialize for HeightCurve {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keys.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HeightCurve {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<(f32, f32)>::deserialize(deserializer)?;
        Ok(Self::new(keys))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
