//! Sphere overlap detection and positional correction
//!
//! Brute-force over every ordered pair of registered spheres. Each overlapping
//! pair is pushed apart along the line joining the centres until the spheres
//! just touch; velocities are left alone.

use crate::foundation::collections::TransformId;
use crate::foundation::math::Vec3;
use crate::scene::TransformArena;

/// A sphere in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether the spheres overlap or touch
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        (other.center - self.center).magnitude() <= self.radius + other.radius
    }

    /// Get the penetration depth if intersecting (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &BoundingSphere) -> f32 {
        let distance = (self.center - other.center).magnitude();
        (self.radius + other.radius - distance).max(0.0)
    }
}

/// A registered collider resolved to its transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBody {
    /// Transform moved by the correction
    pub transform: TransformId,
    /// Sphere radius
    pub radius: f32,
}

/// New centres for two overlapping spheres.
///
/// Both surface points along the joining axis are averaged and each centre
/// is placed one radius away from that midpoint, so the spheres end up
/// exactly touching. Coincident centres separate along +X.
pub fn separate(a: &BoundingSphere, b: &BoundingSphere) -> (Vec3, Vec3) {
    let axis = (b.center - a.center)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vec3::x);
    let surface_a = a.center + axis * a.radius;
    let surface_b = b.center - axis * b.radius;
    let half = (surface_a + surface_b) * 0.5;
    (half - axis * a.radius, half + axis * b.radius)
}

/// Run one collision pass, returning the number of corrections applied.
///
/// Positions are read fresh for every pair so earlier corrections in the
/// same pass are seen by later ones.
pub fn resolve_overlaps(transforms: &mut TransformArena, bodies: &[SphereBody]) -> usize {
    if bodies.len() < 2 {
        return 0;
    }

    let mut corrections = 0;
    for (i, body_a) in bodies.iter().enumerate() {
        for (j, body_b) in bodies.iter().enumerate() {
            if i == j || body_a.transform == body_b.transform {
                continue;
            }
            let a = BoundingSphere::new(transforms.world_position(body_a.transform), body_a.radius);
            let b = BoundingSphere::new(transforms.world_position(body_b.transform), body_b.radius);
            if !a.intersects(&b) {
                continue;
            }

            let (center_a, center_b) = separate(&a, &b);
            log::trace!("Separating spheres by {:.4}", a.penetration_depth(&b));
            transforms.set_world_position(body_a.transform, &center_a);
            transforms.set_world_position(body_b.transform, &center_b);
            corrections += 1;
        }
    }
    corrections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::TransformNode;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_separation_leaves_spheres_touching() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0);
        let (center_a, center_b) = separate(&a, &b);
        assert_relative_eq!((center_b - center_a).magnitude(), 2.0, epsilon = EPSILON);
        assert_relative_eq!(center_a, Vec3::new(-0.25, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(center_b, Vec3::new(1.75, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_coincident_centres_split_along_x() {
        let a = BoundingSphere::new(Vec3::repeat(2.0), 0.5);
        let b = BoundingSphere::new(Vec3::repeat(2.0), 0.5);
        let (center_a, center_b) = separate(&a, &b);
        assert_relative_eq!(center_b - center_a, Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_touching_counts_as_intersecting() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(0.0, 2.0, 0.0), 1.0);
        assert!(a.intersects(&b));
        assert_relative_eq!(a.penetration_depth(&b), 0.0);
    }

    #[test]
    fn test_pass_moves_transforms_in_world_space() {
        let mut arena = TransformArena::new();
        let parent = arena.insert(TransformNode::from_position(Vec3::new(10.0, 0.0, 0.0)));
        let a = arena.insert(TransformNode::from_position(Vec3::zeros()));
        let b = arena.insert(TransformNode::from_position(Vec3::new(1.0, 0.0, 0.0)));
        arena.add_child(parent, b);

        let bodies = [
            SphereBody { transform: a, radius: 1.0 },
            SphereBody { transform: b, radius: 1.0 },
        ];
        // b sits at world x = 11, far from a.
        assert_eq!(resolve_overlaps(&mut arena, &bodies), 0);

        if let Some(node) = arena.get_mut(b) {
            node.set_position(Vec3::new(-8.5, 0.0, 0.0));
        }
        assert!(resolve_overlaps(&mut arena, &bodies) > 0);
        let distance = arena.world_position(b) - arena.world_position(a);
        assert_relative_eq!(distance.magnitude(), 2.0, epsilon = 1e-4);
        assert_relative_eq!(distance.y, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_single_body_is_skipped() {
        let mut arena = TransformArena::new();
        let a = arena.insert(TransformNode::default());
        assert_eq!(resolve_overlaps(&mut arena, &[SphereBody { transform: a, radius: 1.0 }]), 0);
    }
}
