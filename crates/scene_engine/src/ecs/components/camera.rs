//! Perspective camera
//!
//! The view follows the owning entity's transform: the eye sits at its world
//! position looking along its forward axis. The projection is a right-handed
//! GL-style perspective with a `[-1, 1]` depth range.

use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec2, Vec3, Vec4};
use crate::scene::{Scene, SceneError};
use crate::spatial::Ray;

use super::Movement;

/// Default vertical field of view in degrees
pub const DEFAULT_FOV: f32 = 35.0;

/// Default near plane
pub const DEFAULT_NEAR: f32 = 0.1;

/// Default far plane
pub const DEFAULT_FAR: f32 = 500.0;

/// Perspective camera component
#[derive(Debug, Clone)]
pub struct Camera {
    base: ComponentBase,
    /// Draw the ground grid while this camera is active
    pub render_grid: bool,
    fov: f32,
    near: f32,
    far: f32,
    aspect: f32,
    position: Vec3,
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            base: ComponentBase::default(),
            render_grid: true,
            fov: DEFAULT_FOV,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            aspect: 16.0 / 9.0,
            position: Vec3::zeros(),
            projection: Mat4::identity(),
            view: Mat4::identity(),
            view_projection: Mat4::identity(),
        };
        camera.update_projection();
        camera
    }
}

const PROPERTIES: &[Property<Camera>] = &[
    Property {
        name: "fov",
        editor: EditorKind::Number { min: Some(1.0), max: Some(179.0) },
        get: |c| PropertyValue::Number(c.fov),
        set: |c, v| v.as_number().map(|n| c.fov = n).is_some(),
    },
    Property {
        name: "near",
        editor: EditorKind::Number { min: Some(0.001), max: None },
        get: |c| PropertyValue::Number(c.near),
        set: |c, v| v.as_number().map(|n| c.near = n).is_some(),
    },
    Property {
        name: "far",
        editor: EditorKind::Number { min: Some(0.01), max: None },
        get: |c| PropertyValue::Number(c.far),
        set: |c, v| v.as_number().map(|n| c.far = n).is_some(),
    },
    Property {
        name: "render_grid",
        editor: EditorKind::Boolean,
        get: |c| PropertyValue::Bool(c.render_grid),
        set: |c, v| v.as_bool().map(|b| c.render_grid = b).is_some(),
    },
];

impl Camera {
    /// Vertical field of view in degrees
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Change the field of view and rebuild the projection
    pub fn set_fov(&mut self, degrees: f32) {
        self.fov = degrees;
        self.update_projection();
    }

    /// Change width / height and rebuild the projection
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
            self.update_projection();
        }
    }

    /// Width / height
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Rebuild the projection from fov, aspect and clip planes
    pub fn update_projection(&mut self) {
        let far = self.far.max(self.near + f32::EPSILON);
        self.projection = Mat4::perspective(utils::deg_to_rad(self.fov), self.aspect, self.near, far);
        self.view_projection = self.projection * self.view;
    }

    /// Rebuild the view from the owning entity's world transform
    pub fn refresh_view(&mut self, scene: &Scene) {
        let Some(transform) = scene.transform_id(self.base.owner()) else {
            return;
        };
        let transforms = scene.transforms();
        self.position = transforms.world_position(transform);
        let forward = transforms.world_forward(transform);
        let up = transforms.world_up(transform);
        self.view = Mat4::look_at(self.position, self.position + forward, up);
        self.view_projection = self.projection * self.view;
    }

    /// Eye position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Projection matrix
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// View matrix
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Projection times view
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// Model-view-projection for a world matrix
    pub fn create_mvp(&self, model: &Mat4) -> Mat4 {
        self.view_projection * model
    }

    /// World-space ray through a pixel of a `viewport`-sized surface
    pub fn screen_position_to_world_ray(&self, position: &Vec2, viewport: &Vec2) -> Ray {
        let clip = Vec4::new(
            (position.x / viewport.x) * 2.0 - 1.0,
            1.0 - (position.y / viewport.y) * 2.0,
            -1.0,
            1.0,
        );
        let mut eye = self.projection.inverse_or_identity() * clip;
        eye.z = -1.0;
        eye.w = 0.0;
        let world = self.view.inverse_or_identity() * eye;
        Ray::new(self.position, world.xyz())
    }
}

impl Component for Camera {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Camera
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let viewport = scene.viewport();
        self.set_aspect_ratio(viewport.x / viewport.y);
        self.refresh_view(scene);
        // A replacement camera takes over from the instance it replaces.
        let owner = self.base.owner();
        let active = scene.active_camera_entity();
        if active.is_none() || active == Some(owner) {
            let handle = (&*self as &dyn Component).handle();
            scene.set_active_camera_handle(handle);
        } else if let Some(movement) = scene.component_mut::<Movement>(owner) {
            movement.base_mut().set_enabled(false);
        }
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene) {
        self.refresh_view(scene);
    }

    fn delete(&mut self, scene: &mut Scene) {
        if scene.active_camera_handle() == Some((&*self as &dyn Component).handle()) {
            log::info!("Active camera deleted");
            scene.clear_active_camera();
        }
    }

    fn on_property_changed(&mut self, _scene: &mut Scene, _property: &str) {
        self.update_projection();
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::Camera, self, name, value)
    }
}

impl ComponentType for Camera {
    const KIND: ComponentKind = ComponentKind::Camera;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_centre_ray_points_forward() {
        let camera = Camera::default();
        let viewport = Vec2::new(1600.0, 900.0);
        let ray = camera.screen_position_to_world_ray(&Vec2::new(800.0, 450.0), &viewport);
        // Identity view looks down -Z.
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_corner_rays_diverge_by_fov() {
        let camera = Camera::default();
        let viewport = Vec2::new(100.0, 100.0);
        let top = camera.screen_position_to_world_ray(&Vec2::new(50.0, 0.0), &viewport);
        let angle = top.direction.angle(&Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(angle, utils::deg_to_rad(DEFAULT_FOV) / 2.0, epsilon = EPSILON);
        assert!(top.direction.y > 0.0);
    }

    #[test]
    fn test_fov_change_rebuilds_projection() {
        let mut camera = Camera::default();
        let before = camera.projection();
        camera.set_fov(60.0);
        assert_ne!(before, camera.projection());
        assert_relative_eq!(camera.fov(), 60.0);
    }

    #[test]
    fn test_invalid_aspect_is_ignored() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(0.0);
        assert_relative_eq!(camera.aspect_ratio(), 16.0 / 9.0);
    }
}
