//! Per-level traversal state
//!
//! Both traversals walk the transform tree from the roots, carrying the
//! accumulated parent matrix down one level at a time. A context value is
//! built fresh for every level and never outlives the traversal.

use crate::ecs::components::Camera;
use crate::foundation::collections::EntityId;
use crate::foundation::math::Mat4;
use crate::spatial::Ray;
use super::Scene;

/// What a renderer needs to draw its entity
pub struct RenderingContext<'a> {
    /// Scene being drawn
    pub scene: &'a Scene,
    /// Active camera
    pub camera: &'a Camera,
    /// Entity being drawn
    pub entity: EntityId,
    /// World matrix of the entity's parent
    pub parent_matrix: Mat4,
}

impl<'a> RenderingContext<'a> {
    /// Create a context for `entity`
    pub fn new(scene: &'a Scene, camera: &'a Camera, entity: EntityId, parent_matrix: Mat4) -> Self {
        Self {
            scene,
            camera,
            entity,
            parent_matrix,
        }
    }

    /// Entity's world matrix: parent matrix times its local matrix
    pub fn model_matrix(&self) -> Mat4 {
        self.parent_matrix * self.scene.local_matrix(self.entity)
    }

    /// Camera view-projection times the model matrix
    pub fn mvp(&self) -> Mat4 {
        self.camera.view_projection() * self.model_matrix()
    }
}

/// What a ray-cast level needs
#[derive(Debug, Clone, Copy)]
pub struct RayCastContext {
    /// World-space ray
    pub ray: Ray,
    /// World matrix of the current entity's parent
    pub parent_matrix: Mat4,
}

impl RayCastContext {
    /// Context for the root level
    pub fn root(ray: Ray) -> Self {
        Self {
            ray,
            parent_matrix: Mat4::identity(),
        }
    }

    /// Context for the children of an entity with world matrix `world`
    pub fn child(&self, world: Mat4) -> Self {
        Self {
            ray: self.ray,
            parent_matrix: world,
        }
    }
}
