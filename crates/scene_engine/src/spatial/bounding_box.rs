//! Local-space axis-aligned bounding boxes

use serde::{Serialize, Deserialize};

use crate::foundation::math::Vec3;
use super::ray::Ray;

/// Index pairs for the 12 edges over [`BoundingBox::corners`]
pub const EDGE_INDICES: [u16; 24] = [
    0, 1, 1, 3, 3, 2, 2, 0, // bottom
    4, 5, 5, 7, 7, 6, 6, 4, // top
    0, 4, 1, 5, 2, 6, 3, 7, // sides
];

/// Axis-Aligned Bounding Box in an entity's local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::initial()
    }
}

impl BoundingBox {
    /// Create a new box from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An inverted, empty box that any added point replaces
    pub fn initial() -> Self {
        Self {
            min: Vec3::repeat(f32::MAX),
            max: Vec3::repeat(f32::MIN),
        }
    }

    /// Build the smallest box holding every point
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut bounds = Self::initial();
        for point in points {
            bounds.add(point);
        }
        bounds
    }

    /// Whether nothing has been added yet
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to include `point`
    pub fn add(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Grow the box to include `other`
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.add(&other.min);
        self.add(&other.max);
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners, indexed by bit pattern `zyx` (bit set = max)
    pub fn corners(&self) -> [Vec3; 8] {
        let pick = |bit: bool, min: f32, max: f32| if bit { max } else { min };
        std::array::from_fn(|i| {
            Vec3::new(
                pick(i & 1 != 0, self.min.x, self.max.x),
                pick(i & 2 != 0, self.min.y, self.max.y),
                pick(i & 4 != 0, self.min.z, self.max.z),
            )
        })
    }

    /// Slab test against a ray in the same space.
    ///
    /// Returns the entry parameter `t_close` when `t_close <= t_far` and
    /// `t_close >= 0`. A ray starting inside the box does not hit it.
    /// Zero direction components use an infinite reciprocal.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vec3::new(
            if ray.direction.x != 0.0 { 1.0 / ray.direction.x } else { f32::INFINITY },
            if ray.direction.y != 0.0 { 1.0 / ray.direction.y } else { f32::INFINITY },
            if ray.direction.z != 0.0 { 1.0 / ray.direction.z } else { f32::INFINITY },
        );

        let t1 = (self.min.x - ray.origin.x) * inv_dir.x;
        let t2 = (self.max.x - ray.origin.x) * inv_dir.x;
        let t3 = (self.min.y - ray.origin.y) * inv_dir.y;
        let t4 = (self.max.y - ray.origin.y) * inv_dir.y;
        let t5 = (self.min.z - ray.origin.z) * inv_dir.z;
        let t6 = (self.max.z - ray.origin.z) * inv_dir.z;

        let t_close = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let t_far = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        if t_close <= t_far && t_close >= 0.0 {
            Some(t_close)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube() -> BoundingBox {
        BoundingBox::new(Vec3::repeat(-0.5), Vec3::repeat(0.5))
    }

    #[test]
    fn test_initial_box_is_replaced_by_first_point() {
        let mut bounds = BoundingBox::initial();
        assert!(bounds.is_empty());
        bounds.add(&Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.min, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_merge_ignores_empty_boxes() {
        let mut bounds = unit_cube();
        bounds.merge(&BoundingBox::initial());
        assert_eq!(bounds, unit_cube());
        bounds.merge(&BoundingBox::new(Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(bounds.max, Vec3::new(2.0, 0.5, 0.5));
    }

    #[test]
    fn test_corners_and_edges() {
        let corners = unit_cube().corners();
        assert_eq!(corners[0], Vec3::repeat(-0.5));
        assert_eq!(corners[7], Vec3::repeat(0.5));
        for pair in EDGE_INDICES.chunks(2) {
            let a = corners[pair[0] as usize];
            let b = corners[pair[1] as usize];
            // Every edge runs along exactly one axis.
            let differing = (0..3).filter(|&axis| a[axis] != b[axis]).count();
            assert_eq!(differing, 1);
        }
    }

    #[test]
    fn test_ray_hits_front_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let t = unit_cube().intersect_ray(&ray).unwrap();
        assert_relative_eq!(t, 4.5);
    }

    #[test]
    fn test_ray_missing_or_behind() {
        let cube = unit_cube();
        let beside = Ray::new(Vec3::new(2.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(cube.intersect_ray(&beside).is_none());
        let away = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(cube.intersect_ray(&away).is_none());
        let inside = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
        assert!(cube.intersect_ray(&inside).is_none());
    }
}
