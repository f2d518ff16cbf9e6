//! Scene descriptions
//!
//! A [`SceneDescription`] is plain serde data loaded from `.ron` or `.toml`
//! through [`Config`]. [`Scene::from_description`] builds it in three passes:
//! create every entity, link parents by name (so forward references work),
//! then attach components in the listed order. Component fields left out keep
//! the component's defaults; fields given are written through the same
//! property tables an inspector uses.
//!
//! ```ron
//! #![enable(implicit_some)]
//! (
//!     name: "demo",
//!     active_camera: "camera",
//!     entities: [
//!         (name: "camera", transform: (position: (0.0, 1.0, 8.0)), components: [Camera(fov: 50.0), Movement()]),
//!         (name: "crate", model: "models/crate.obj", components: [SphereCollider(radius: 0.5)]),
//!     ],
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::config::{EngineConfig, SceneSettings};
use crate::ecs::component::{Component, ComponentHandle, ComponentKind};
use crate::ecs::components::{
    BezierCurve, BoundingBoxRenderer, Camera, DirectionalLight, Fog, FogFunction, GlobalIllumination, GridRenderer,
    MeshRenderer, Movement, PointLight, RayRenderer, RigidBody, SkyRenderer, SphereCollider, Spline, SplineRenderer,
    SpotLight, SpriteRenderer, Sun, Terrain,
};
use crate::editor::PropertyValue;
use crate::foundation::collections::EntityId;
use crate::foundation::math::{utils, Vec3};

use super::transform::TransformNode;
use super::{Scene, SceneError};

/// A whole scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Scene name
    pub name: String,
    /// Entity whose camera starts active; otherwise the first camera added
    pub active_camera: Option<String>,
    /// Settings overriding the engine configuration
    pub settings: Option<SceneSettings>,
    /// Starting point of the day cycle in `[0, 1)`
    pub day_time: f32,
    /// Entities in creation order
    pub entities: Vec<EntityDescription>,
}

impl Config for SceneDescription {}

/// One entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDescription {
    /// Entity name, also used to refer to it
    pub name: String,
    /// Name of the parent entity
    pub parent: Option<String>,
    /// Local transform
    pub transform: TransformDescription,
    /// Model loaded through a mesh renderer
    pub model: Option<String>,
    /// Components in attachment order
    pub components: Vec<ComponentDescription>,
}

/// Local transform with rotation in Euler degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDescription {
    /// Local position
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    /// Local scale
    pub scale: Vec3,
}

impl Default for TransformDescription {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::repeat(1.0),
        }
    }
}

impl TransformDescription {
    fn to_node(&self) -> TransformNode {
        TransformNode::new(self.position, utils::quat_from_euler_degrees(&self.rotation), self.scale)
    }
}

/// A component and the fields to override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ComponentDescription {
    Camera {
        #[serde(default)]
        fov: Option<f32>,
        #[serde(default)]
        render_grid: Option<bool>,
    },
    Movement {
        #[serde(default)]
        speed: Option<f32>,
        #[serde(default)]
        sensitivity: Option<f32>,
    },
    RigidBody {
        #[serde(default)]
        gravity: Option<bool>,
        #[serde(default)]
        mass: Option<f32>,
        #[serde(default)]
        drag: Option<f32>,
        #[serde(default)]
        angular_drag: Option<f32>,
        #[serde(default)]
        velocity: Option<Vec3>,
    },
    SphereCollider {
        #[serde(default)]
        radius: Option<f32>,
    },
    PointLight {
        #[serde(default)]
        color: Option<Vec3>,
        #[serde(default)]
        intensity: Option<f32>,
    },
    DirectionalLight {
        #[serde(default)]
        color: Option<Vec3>,
        #[serde(default)]
        intensity: Option<f32>,
    },
    SpotLight {
        #[serde(default)]
        color: Option<Vec3>,
        #[serde(default)]
        intensity: Option<f32>,
        #[serde(default)]
        angle: Option<f32>,
    },
    GlobalIllumination {
        #[serde(default)]
        intensity: Option<f32>,
    },
    Sun {
        #[serde(default)]
        intensity: Option<f32>,
    },
    Spline {
        #[serde(default)]
        sections: Option<u32>,
        #[serde(default)]
        segments: Vec<BezierCurve>,
    },
    SplineRenderer {
        #[serde(default)]
        color: Option<Vec3>,
    },
    SpriteRenderer {
        #[serde(default)]
        width: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
        #[serde(default)]
        texture: Option<String>,
    },
    Fog {
        #[serde(default)]
        function: Option<FogFunction>,
        #[serde(default)]
        density: Option<f32>,
        #[serde(default)]
        linear_end: Option<f32>,
    },
    RayRenderer {
        #[serde(default)]
        color: Option<Vec3>,
        #[serde(default)]
        length: Option<f32>,
    },
    Terrain {
        #[serde(default)]
        height: Option<f32>,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        depth: Option<u32>,
        #[serde(default)]
        scale: Option<f32>,
        #[serde(default)]
        offset: Option<f32>,
        #[serde(default)]
        seed: Option<u32>,
    },
    SkyRenderer,
    GridRenderer,
}

impl ComponentDescription {
    /// Kind of the described component
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Camera { .. } => ComponentKind::Camera,
            Self::Movement { .. } => ComponentKind::Movement,
            Self::RigidBody { .. } => ComponentKind::RigidBody,
            Self::SphereCollider { .. } => ComponentKind::SphereCollider,
            Self::PointLight { .. } => ComponentKind::PointLight,
            Self::DirectionalLight { .. } => ComponentKind::DirectionalLight,
            Self::SpotLight { .. } => ComponentKind::SpotLight,
            Self::GlobalIllumination { .. } => ComponentKind::GlobalIllumination,
            Self::Sun { .. } => ComponentKind::Sun,
            Self::Spline { .. } => ComponentKind::Spline,
            Self::SplineRenderer { .. } => ComponentKind::SplineRenderer,
            Self::SpriteRenderer { .. } => ComponentKind::SpriteRenderer,
            Self::Fog { .. } => ComponentKind::Fog,
            Self::RayRenderer { .. } => ComponentKind::RayRenderer,
            Self::Terrain { .. } => ComponentKind::Terrain,
            Self::SkyRenderer => ComponentKind::SkyRenderer,
            Self::GridRenderer => ComponentKind::GridRenderer,
        }
    }

    /// Property writes for the fields that were given
    fn overrides(&self) -> Vec<(&'static str, PropertyValue)> {
        let number = |name: &'static str, value: &Option<f32>| value.map(|v| (name, PropertyValue::Number(v)));
        let color = |name: &'static str, value: &Option<Vec3>| value.map(|v| (name, PropertyValue::Color(v)));
        let count = |name: &'static str, value: &Option<u32>| value.map(|v| (name, PropertyValue::Number(v as f32)));
        let flag = |name: &'static str, value: &Option<bool>| value.map(|v| (name, PropertyValue::Bool(v)));

        let overrides = match self {
            Self::Camera { fov, render_grid } => vec![number("fov", fov), flag("render_grid", render_grid)],
            Self::Movement { speed, sensitivity } => {
                vec![number("speed", speed), number("sensitivity", sensitivity)]
            }
            Self::RigidBody { gravity, mass, drag, angular_drag, velocity } => vec![
                flag("gravity", gravity),
                number("mass", mass),
                number("drag", drag),
                number("angular_drag", angular_drag),
                velocity.map(|v| ("velocity", PropertyValue::Vec3(v))),
            ],
            Self::SphereCollider { radius } => vec![number("radius", radius)],
            Self::PointLight { color: c, intensity } | Self::DirectionalLight { color: c, intensity } => {
                vec![color("color", c), number("intensity", intensity)]
            }
            Self::SpotLight { color: c, intensity, angle } => {
                vec![color("color", c), number("intensity", intensity), number("angle", angle)]
            }
            Self::GlobalIllumination { intensity } | Self::Sun { intensity } => vec![number("intensity", intensity)],
            Self::Spline { sections, .. } => vec![count("sections", sections)],
            Self::SplineRenderer { color: c } => vec![color("color", c)],
            Self::SpriteRenderer { width, height, .. } => vec![number("width", width), number("height", height)],
            Self::Fog { function, density, linear_end } => vec![
                function.map(|f| ("function", PropertyValue::Choice(f as u32))),
                number("density", density),
                number("linear_end", linear_end),
            ],
            Self::RayRenderer { color: c, length } => vec![color("color", c), number("length", length)],
            Self::Terrain { height, width, depth, scale, offset, seed } => vec![
                number("height", height),
                count("width", width),
                count("depth", depth),
                number("scale", scale),
                number("offset", offset),
                count("seed", seed),
            ],
            Self::SkyRenderer | Self::GridRenderer => Vec::new(),
        };
        overrides.into_iter().flatten().collect()
    }
}

/// A default-constructed component of `kind`
pub fn default_component(kind: ComponentKind) -> Box<dyn Component> {
    match kind {
        ComponentKind::Camera => Box::<Camera>::default(),
        ComponentKind::Movement => Box::<Movement>::default(),
        ComponentKind::RigidBody => Box::<RigidBody>::default(),
        ComponentKind::SphereCollider => Box::<SphereCollider>::default(),
        ComponentKind::PointLight => Box::<PointLight>::default(),
        ComponentKind::DirectionalLight => Box::<DirectionalLight>::default(),
        ComponentKind::SpotLight => Box::<SpotLight>::default(),
        ComponentKind::GlobalIllumination => Box::<GlobalIllumination>::default(),
        ComponentKind::Sun => Box::<Sun>::default(),
        ComponentKind::MeshRenderer => Box::<MeshRenderer>::default(),
        ComponentKind::SplineRenderer => Box::<SplineRenderer>::default(),
        ComponentKind::SpriteRenderer => Box::<SpriteRenderer>::default(),
        ComponentKind::BoundingBoxRenderer => Box::<BoundingBoxRenderer>::default(),
        ComponentKind::GridRenderer => Box::<GridRenderer>::default(),
        ComponentKind::SkyRenderer => Box::<SkyRenderer>::default(),
        ComponentKind::Fog => Box::<Fog>::default(),
        ComponentKind::Spline => Box::<Spline>::default(),
        ComponentKind::RayRenderer => Box::<RayRenderer>::default(),
        ComponentKind::Terrain => Box::<Terrain>::default(),
    }
}

impl Scene {
    /// Add a default component of `kind`, see [`Scene::add_component`]
    pub fn add_component_of_kind(&mut self, entity: EntityId, kind: ComponentKind) -> Result<ComponentHandle, SceneError> {
        self.attach(entity, default_component(kind))
    }

    /// Build a scene from a description.
    ///
    /// Unknown parent or camera names and components whose requirements
    /// aren't met fail the whole build.
    pub fn from_description(description: &SceneDescription, config: &EngineConfig) -> Result<Self, SceneError> {
        let mut scene = Scene::with_config(description.name.clone(), config);
        scene.populate(description)?;
        Ok(scene)
    }

    /// Add the entities of `description` to this scene
    pub fn populate(&mut self, description: &SceneDescription) -> Result<(), SceneError> {
        if let Some(settings) = &description.settings {
            *self.settings_mut() = settings.clone();
        }
        self.time_mut().set_day_time(description.day_time);

        let entities: Vec<EntityId> = description
            .entities
            .iter()
            .map(|entity| self.create_entity_with_transform(entity.name.clone(), entity.transform.to_node()))
            .collect();
        let lookup = |scene: &Scene, name: &str| {
            entities
                .iter()
                .copied()
                .find(|&id| scene.entity(id).is_some_and(|entity| entity.name() == name))
                .ok_or_else(|| SceneError::UnknownEntity(name.to_string()))
        };

        for (desc, &entity) in description.entities.iter().zip(&entities) {
            if let Some(parent) = &desc.parent {
                let parent = lookup(self, parent)?;
                self.add_child(parent, entity)?;
            }
        }

        for (desc, &entity) in description.entities.iter().zip(&entities) {
            if let Some(model) = &desc.model {
                self.add_component::<MeshRenderer>(entity)?;
                let model = model.clone();
                self.with_component::<MeshRenderer, _>(entity, |renderer, scene| renderer.load(scene, model));
            }
            for component in &desc.components {
                self.apply_component(entity, component)?;
            }
        }

        if let Some(camera) = &description.active_camera {
            let entity = lookup(self, camera)?;
            if self.component::<Camera>(entity).is_none() {
                return Err(SceneError::NotACamera(camera.clone()));
            }
            self.set_active_camera(entity)?;
        }

        log::info!(
            "Loaded scene '{}' with {} entities",
            description.name,
            description.entities.len()
        );
        Ok(())
    }

    fn apply_component(&mut self, entity: EntityId, description: &ComponentDescription) -> Result<(), SceneError> {
        let kind = description.kind();
        self.add_component_of_kind(entity, kind)?;
        for (name, value) in description.overrides() {
            self.set_component_property(entity, kind, name, value)?;
        }

        match description {
            ComponentDescription::Spline { segments, .. } => {
                self.with_component::<Spline, _>(entity, |spline, _| {
                    for segment in segments {
                        spline.add_segment(*segment);
                    }
                });
            }
            ComponentDescription::SpriteRenderer { texture: Some(texture), .. } => {
                let texture = texture.clone();
                self.with_component::<SpriteRenderer, _>(entity, |sprite, scene| sprite.set_texture(scene, texture));
            }
            _ => {}
        }
        Ok(())
    }
}
