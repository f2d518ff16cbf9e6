//! Rays and ray-cast results

use crate::foundation::collections::EntityId;
use crate::foundation::math::{utils, Mat4, Vec3};

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Vec3,
    /// The direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with a normalized direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: utils::normalize_or_zero(&direction),
        }
    }

    /// Move the ray into another space.
    ///
    /// The origin is transformed as a point and the direction as a vector.
    /// The direction keeps whatever length the matrix gives it, so ray
    /// parameters stay comparable with the untransformed ray.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: utils::transform_point(matrix, &self.origin),
            direction: utils::transform_direction(matrix, &self.direction),
        }
    }

    /// Get a point along the ray at parameter t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Closest entity hit by a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The entity that was hit
    pub entity: EntityId,
    /// Ray parameter of the entry point
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transformed_keeps_parameterization() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let scale = Mat4::new_scaling(0.5);
        let local = ray.transformed(&scale);
        assert_relative_eq!(local.origin, Vec3::new(0.0, 0.0, -2.5));
        assert_relative_eq!(local.direction, Vec3::new(0.0, 0.0, 0.5));
        // The same parameter lands on the same (scaled) point.
        assert_relative_eq!(local.point_at(4.0), ray.point_at(4.0) * 0.5);
    }

    #[test]
    fn test_zero_direction_stays_zero() {
        let ray = Ray::new(Vec3::zeros(), Vec3::zeros());
        assert_eq!(ray.direction, Vec3::zeros());
    }
}
