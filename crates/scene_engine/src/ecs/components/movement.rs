//! Fly movement driven by keyboard and pointer
//!
//! Yaw and pitch are kept in degrees and turned into the entity's rotation
//! whenever the pointer moves. Keys translate the entity in the horizontal
//! plane of the current yaw, so looking up or down never changes speed.

use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::math::{utils, Vec2, Vec3};
use crate::scene::{Scene, SceneError};

use super::Camera;

/// Pitch limit in degrees, short of straight up or down
pub const PITCH_LIMIT: f32 = 89.5;

/// Keyboard and pointer movement component
#[derive(Debug, Clone)]
pub struct Movement {
    base: ComponentBase,
    /// Units per second
    pub speed: f32,
    /// Degrees per pointer pixel
    pub sensitivity: f32,
    yaw: f32,
    pitch: f32,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            speed: 5.0,
            sensitivity: 0.05,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

const PROPERTIES: &[Property<Movement>] = &[
    Property {
        name: "speed",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |m| PropertyValue::Number(m.speed),
        set: |m, v| v.as_number().map(|n| m.speed = n).is_some(),
    },
    Property {
        name: "sensitivity",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |m| PropertyValue::Number(m.sensitivity),
        set: |m, v| v.as_number().map(|n| m.sensitivity = n).is_some(),
    },
    Property {
        name: "yaw",
        editor: EditorKind::NUMBER,
        get: |m| PropertyValue::Number(m.yaw),
        set: |m, v| v.as_number().map(|n| m.yaw = n).is_some(),
    },
    Property {
        name: "pitch",
        editor: EditorKind::Number { min: Some(-PITCH_LIMIT), max: Some(PITCH_LIMIT) },
        get: |m| PropertyValue::Number(m.pitch),
        set: |m, v| v.as_number().map(|n| m.pitch = n).is_some(),
    },
];

impl Movement {
    /// Heading in degrees about the up axis
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Elevation in degrees, within ±[`PITCH_LIMIT`]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set both angles, clamping pitch
    pub fn set_angles(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Turn by a pointer delta in pixels
    pub fn look(&mut self, delta: &Vec2) {
        let yaw = self.yaw - delta.x * self.sensitivity;
        let pitch = self.pitch + delta.y * self.sensitivity;
        self.set_angles(yaw, pitch);
    }

    /// World translation for a local movement vector over `delta_time` seconds
    pub fn displacement(&self, movement: &Vec3, delta_time: f32) -> Vec3 {
        let heading = utils::quat_from_euler_degrees(&Vec3::new(0.0, self.yaw, 0.0));
        heading * movement * self.speed * delta_time
    }

    fn apply_rotation(&self, scene: &mut Scene) {
        let rotation = utils::quat_from_euler_degrees(&Vec3::new(self.pitch, self.yaw, 0.0));
        if let Some(node) = scene.transform_mut(self.base.owner()) {
            node.set_rotation(rotation);
        }
    }
}

impl Component for Movement {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Movement
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        // Only the active camera follows input.
        let owner = self.base.owner();
        if scene.component::<Camera>(owner).is_some() && scene.active_camera_entity() != Some(owner) {
            self.base.set_enabled(false);
        }
        self.apply_rotation(scene);
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene) {
        let pointer = scene.input().pointer_delta();
        if pointer != Vec2::zeros() {
            self.look(&pointer);
            self.apply_rotation(scene);
        }

        let movement = scene.input().movement_vector();
        if movement == Vec3::zeros() {
            return;
        }
        let displacement = self.displacement(&movement, scene.time().delta_time());
        if let Some(node) = scene.transform_mut(self.base.owner()) {
            node.translate(&displacement);
        }
    }

    fn on_property_changed(&mut self, scene: &mut Scene, property: &str) {
        if matches!(property, "yaw" | "pitch") {
            self.apply_rotation(scene);
        }
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::Movement, self, name, value)
    }
}

impl ComponentType for Movement {
    const KIND: ComponentKind = ComponentKind::Movement;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_pointer_right_turns_right() {
        let mut movement = Movement::default();
        movement.look(&Vec2::new(100.0, 0.0));
        assert_relative_eq!(movement.yaw(), -5.0);
        assert_relative_eq!(movement.pitch(), 0.0);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut movement = Movement::default();
        movement.look(&Vec2::new(0.0, 10_000.0));
        assert_relative_eq!(movement.pitch(), PITCH_LIMIT);
        movement.look(&Vec2::new(0.0, -100_000.0));
        assert_relative_eq!(movement.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn test_displacement_follows_yaw_only() {
        let mut movement = Movement::default();
        movement.set_angles(90.0, 45.0);
        let step = movement.displacement(&Vec3::new(0.0, 0.0, 1.0), 0.5);
        // Forward (+z) turned 90° about up lands on +x; pitch is ignored.
        assert_relative_eq!(step, Vec3::new(2.5, 0.0, 0.0), epsilon = EPSILON);
    }
}
