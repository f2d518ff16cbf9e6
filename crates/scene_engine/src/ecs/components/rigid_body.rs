//! Velocity integration
//!
//! Runs in the fixed domain. Linear and angular velocity decay by their drag
//! factor every step and snap to zero once negligible, so resting bodies stop
//! touching their transform.

use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::math::{constants::VELOCITY_EPSILON, Quat, Quaternion, Vec3};
use crate::scene::{Scene, SceneError};

/// Gravitational acceleration applied along -Y when enabled
pub const GRAVITY: f32 = 9.81;

/// Rigid body component
#[derive(Debug, Clone)]
pub struct RigidBody {
    base: ComponentBase,
    /// Accelerate downwards every step
    pub gravity: bool,
    /// Divides impulses
    pub mass: f32,
    /// Fraction of linear velocity lost per step
    pub drag: f32,
    /// Fraction of angular velocity lost per step
    pub angular_drag: f32,
    velocity: Vec3,
    angular_velocity: Vec3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            gravity: false,
            mass: 1.0,
            drag: 0.05,
            angular_drag: 0.05,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
        }
    }
}

const PROPERTIES: &[Property<RigidBody>] = &[
    Property {
        name: "gravity",
        editor: EditorKind::Boolean,
        get: |r| PropertyValue::Bool(r.gravity),
        set: |r, v| v.as_bool().map(|b| r.gravity = b).is_some(),
    },
    Property {
        name: "mass",
        editor: EditorKind::Number { min: Some(0.001), max: None },
        get: |r| PropertyValue::Number(r.mass),
        set: |r, v| v.as_number().map(|n| r.mass = n).is_some(),
    },
    Property {
        name: "drag",
        editor: EditorKind::Number { min: Some(0.0), max: Some(1.0) },
        get: |r| PropertyValue::Number(r.drag),
        set: |r, v| v.as_number().map(|n| r.drag = n).is_some(),
    },
    Property {
        name: "angular_drag",
        editor: EditorKind::Number { min: Some(0.0), max: Some(1.0) },
        get: |r| PropertyValue::Number(r.angular_drag),
        set: |r, v| v.as_number().map(|n| r.angular_drag = n).is_some(),
    },
    Property {
        name: "velocity",
        editor: EditorKind::Vec3,
        get: |r| PropertyValue::Vec3(r.velocity),
        set: |r, v| v.as_vec3().map(|x| r.velocity = x).is_some(),
    },
    Property {
        name: "angular_velocity",
        editor: EditorKind::Vec3,
        get: |r| PropertyValue::Vec3(r.angular_velocity),
        set: |r, v| v.as_vec3().map(|x| r.angular_velocity = x).is_some(),
    },
];

fn damp(velocity: &mut Vec3, drag: f32) {
    *velocity -= *velocity * drag;
    if velocity.norm_squared() < VELOCITY_EPSILON {
        *velocity = Vec3::zeros();
    }
}

impl RigidBody {
    /// Linear velocity in units per second
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Angular velocity in radians per second about each axis
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Add to the linear velocity
    pub fn add_velocity(&mut self, delta: &Vec3) {
        self.velocity += delta;
    }

    /// Add to the angular velocity
    pub fn add_angular_velocity(&mut self, delta: &Vec3) {
        self.angular_velocity += delta;
    }

    /// Add an impulse, scaled by the inverse mass
    pub fn apply_impulse(&mut self, impulse: &Vec3) {
        if self.mass > 0.0 {
            self.velocity += impulse / self.mass;
        }
    }

    /// Integrate one step of `dt` seconds, returning the new position and rotation
    pub fn integrate(&mut self, position: &Vec3, rotation: &Quat, dt: f32) -> (Vec3, Quat) {
        if self.gravity {
            self.velocity.y -= GRAVITY * dt;
        }

        let position = position + self.velocity * dt;
        damp(&mut self.velocity, self.drag);

        let spin = Quaternion::from_imag(self.angular_velocity * dt);
        let rotation = Quat::new_normalize(rotation.into_inner() + spin * rotation.into_inner());
        damp(&mut self.angular_velocity, self.angular_drag);

        (position, rotation)
    }

    /// Whether both velocities are zero
    pub fn is_resting(&self) -> bool {
        self.velocity == Vec3::zeros() && self.angular_velocity == Vec3::zeros() && !self.gravity
    }
}

impl Component for RigidBody {
    fn kind(&self) -> ComponentKind {
        ComponentKind::RigidBody
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn fixed_update(&mut self, scene: &mut Scene) {
        if self.is_resting() {
            return;
        }
        let dt = scene.time().fixed_delta_time();
        let Some(node) = scene.transform_mut(self.base.owner()) else {
            return;
        };
        let (position, rotation) = self.integrate(&node.position(), &node.rotation(), dt);
        node.set_position(position);
        node.set_rotation(rotation);
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::RigidBody, self, name, value)
    }
}

impl ComponentType for RigidBody {
    const KIND: ComponentKind = ComponentKind::RigidBody;
}
