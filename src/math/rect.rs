//! Axis-aligned 2-D rectangle

use crate::core::types::Vec2;

/// Axis-aligned rectangle defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Create rect from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create rect from center and full size
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Get center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if point is inside the rect
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Squared distance from a point to the nearest edge of the rect
    ///
    /// Zero when the point lies inside.
    pub fn sqr_distance(&self, p: Vec2) -> f32 {
        let clamped = p.clamp(self.min, self.max);
        (p - clamped).length_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center_size() {
        let rect = Rect::from_center_size(Vec2::ZERO, Vec2::splat(2.0));
        assert_eq!(rect.min, Vec2::splat(-1.0));
        assert_eq!(rect.max, Vec2::splat(1.0));
        assert_eq!(rect.center(), Vec2::ZERO);
        assert_eq!(rect.size(), Vec2::splat(2.0));
    }

    #[test]
    fn test_contains_point() {
        let rect = Rect::new(Vec2::ZERO, Vec2::ONE);
        assert!(rect.contains_point(Vec2::splat(0.5)));
        assert!(rect.contains_point(Vec2::ONE));
        assert!(!rect.contains_point(Vec2::splat(1.5)));
    }

    #[test]
    fn test_sqr_distance_inside_is_zero() {
        let rect = Rect::new(Vec2::ZERO, Vec2::ONE);
        assert_eq!(rect.sqr_distance(Vec2::splat(0.5)), 0.0);
    }

    #[test]
    fn test_sqr_distance_to_edge_and_corner() {
        let rect = Rect::new(Vec2::ZERO, Vec2::ONE);
        // Straight out from the right edge
        assert_eq!(rect.sqr_distance(Vec2::new(3.0, 0.5)), 4.0);
        // Diagonal from the corner at (1, 1)
        assert_eq!(rect.sqr_distance(Vec2::new(2.0, 2.0)), 2.0);
    }
}
