//! Light components
//!
//! Every light registers its handle with the scene's light registry on
//! awake and deregisters on delete. At render time the scene asks each
//! registered light for a [`LightDescription`] through [`LightSource`].
//!
//! [`GlobalIllumination`] and [`Sun`] take their color from the sky model of
//! the active camera, when it has one.

use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::color::{self, Color};
use crate::foundation::math::{utils, Vec3};
use crate::render::{LightDescription, LightSource, LightType};
use crate::scene::{Scene, SceneError};

use super::sky::{SkyRenderer, SunLight};

/// Default spot half-angle in degrees
pub const DEFAULT_SPOT_ANGLE: f32 = 15.0;

/// Default intensity of [`GlobalIllumination`]
pub const AMBIENT_INTENSITY: f32 = 0.5;

/// Default intensity of [`Sun`]
pub const SUN_INTENSITY: f32 = 5.0;

fn register(component: &dyn Component, scene: &mut Scene) {
    if !scene.add_light(component.handle()) {
        log::debug!("{} on {:?} left unregistered", component.kind(), component.owner());
    }
}

fn deregister(component: &dyn Component, scene: &mut Scene) {
    scene.remove_light(&component.handle());
}

fn world_position(scene: &Scene, component: &ComponentBase) -> Vec3 {
    scene
        .transform_id(component.owner())
        .map_or_else(Vec3::zeros, |id| scene.transforms().world_position(id))
}

fn world_forward(scene: &Scene, component: &ComponentBase) -> Vec3 {
    scene
        .transform_id(component.owner())
        .map_or_else(Vec3::zeros, |id| scene.transforms().world_forward(id))
}

/// Sun light of the active camera's sky at the current time of day
fn active_sky_light(scene: &Scene) -> Option<(SunLight, Vec3)> {
    let camera = scene.active_camera_entity()?;
    let sky = scene.entity(camera)?.get::<SkyRenderer>()?;
    let day_time = scene.time().day_time();
    Some((sky.sun_light(day_time), sky.sun_position(day_time)))
}

macro_rules! light_properties {
    ($light:ty, $($extra:expr),* $(,)?) => {
        &[
            Property {
                name: "color",
                editor: EditorKind::Color,
                get: |l: &$light| PropertyValue::Color(l.color),
                set: |l: &mut $light, v| v.as_vec3().map(|c| l.color = c).is_some(),
            },
            Property {
                name: "intensity",
                editor: EditorKind::Number { min: Some(0.0), max: None },
                get: |l: &$light| PropertyValue::Number(l.intensity),
                set: |l: &mut $light, v| v.as_number().map(|n| l.intensity = n).is_some(),
            },
            $($extra),*
        ]
    };
}

/// Omnidirectional light at the entity's world position
#[derive(Debug, Clone)]
pub struct PointLight {
    base: ComponentBase,
    /// Linear RGB color
    pub color: Color,
    /// Intensity multiplier
    pub intensity: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            color: color::WHITE,
            intensity: 1.0,
        }
    }
}

const POINT_PROPERTIES: &[Property<PointLight>] = light_properties!(PointLight,);

impl Component for PointLight {
    fn kind(&self) -> ComponentKind {
        ComponentKind::PointLight
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        register(self, scene);
        Ok(())
    }

    fn delete(&mut self, scene: &mut Scene) {
        deregister(self, scene);
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(POINT_PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(POINT_PROPERTIES, ComponentKind::PointLight, self, name, value)
    }

    fn as_light(&self) -> Option<&dyn LightSource> {
        Some(self)
    }
}

impl LightSource for PointLight {
    fn describe(&self, scene: &Scene) -> LightDescription {
        LightDescription {
            light_type: LightType::Point,
            position: world_position(scene, &self.base),
            direction: Vec3::zeros(),
            color: self.color,
            intensity: self.intensity,
            cos_angle: 0.0,
        }
    }
}

impl ComponentType for PointLight {
    const KIND: ComponentKind = ComponentKind::PointLight;
}

/// Parallel light along the entity's forward axis
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    base: ComponentBase,
    /// Linear RGB color
    pub color: Color,
    /// Intensity multiplier
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            color: color::WHITE,
            intensity: 1.0,
        }
    }
}

const DIRECTIONAL_PROPERTIES: &[Property<DirectionalLight>] = light_properties!(DirectionalLight,);

impl Component for DirectionalLight {
    fn kind(&self) -> ComponentKind {
        ComponentKind::DirectionalLight
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        register(self, scene);
        Ok(())
    }

    fn delete(&mut self, scene: &mut Scene) {
        deregister(self, scene);
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(DIRECTIONAL_PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(DIRECTIONAL_PROPERTIES, ComponentKind::DirectionalLight, self, name, value)
    }

    fn as_light(&self) -> Option<&dyn LightSource> {
        Some(self)
    }
}

impl LightSource for DirectionalLight {
    fn describe(&self, scene: &Scene) -> LightDescription {
        LightDescription {
            light_type: LightType::Directional,
            position: world_position(scene, &self.base),
            direction: world_forward(scene, &self.base),
            color: self.color,
            intensity: self.intensity,
            cos_angle: 0.0,
        }
    }
}

impl ComponentType for DirectionalLight {
    const KIND: ComponentKind = ComponentKind::DirectionalLight;
}

/// Cone light along the entity's forward axis
#[derive(Debug, Clone)]
pub struct SpotLight {
    base: ComponentBase,
    /// Linear RGB color
    pub color: Color,
    /// Intensity multiplier
    pub intensity: f32,
    /// Half-angle of the cone in degrees
    pub angle: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            color: color::WHITE,
            intensity: 1.0,
            angle: DEFAULT_SPOT_ANGLE,
        }
    }
}

const SPOT_PROPERTIES: &[Property<SpotLight>] = light_properties!(
    SpotLight,
    Property {
        name: "angle",
        editor: EditorKind::Number { min: Some(0.0), max: Some(90.0) },
        get: |l: &SpotLight| PropertyValue::Number(l.angle),
        set: |l: &mut SpotLight, v| v.as_number().map(|n| l.angle = n).is_some(),
    },
);

impl Component for SpotLight {
    fn kind(&self) -> ComponentKind {
        ComponentKind::SpotLight
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        register(self, scene);
        Ok(())
    }

    fn delete(&mut self, scene: &mut Scene) {
        deregister(self, scene);
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(SPOT_PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(SPOT_PROPERTIES, ComponentKind::SpotLight, self, name, value)
    }

    fn as_light(&self) -> Option<&dyn LightSource> {
        Some(self)
    }
}

impl LightSource for SpotLight {
    fn describe(&self, scene: &Scene) -> LightDescription {
        LightDescription {
            light_type: LightType::Spot,
            position: world_position(scene, &self.base),
            direction: world_forward(scene, &self.base),
            color: self.color,
            intensity: self.intensity,
            cos_angle: utils::deg_to_rad(self.angle).cos(),
        }
    }
}

impl ComponentType for SpotLight {
    const KIND: ComponentKind = ComponentKind::SpotLight;
}

/// Ambient light colored by the sky.
///
/// Packed as a directional light whose direction is the entity's local
/// position, so placing the entity aims it.
#[derive(Debug, Clone)]
pub struct GlobalIllumination {
    base: ComponentBase,
    /// Linear RGB color, replaced by the sky's ambient color while a sky exists
    pub color: Color,
    /// Intensity multiplier
    pub intensity: f32,
}

impl Default for GlobalIllumination {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            color: color::WHITE,
            intensity: AMBIENT_INTENSITY,
        }
    }
}

const AMBIENT_PROPERTIES: &[Property<GlobalIllumination>] = light_properties!(GlobalIllumination,);

impl Component for GlobalIllumination {
    fn kind(&self) -> ComponentKind {
        ComponentKind::GlobalIllumination
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        register(self, scene);
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene) {
        if let Some((light, _)) = active_sky_light(scene) {
            self.color = light.ambient;
        }
    }

    fn delete(&mut self, scene: &mut Scene) {
        deregister(self, scene);
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(AMBIENT_PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(AMBIENT_PROPERTIES, ComponentKind::GlobalIllumination, self, name, value)
    }

    fn as_light(&self) -> Option<&dyn LightSource> {
        Some(self)
    }
}

impl LightSource for GlobalIllumination {
    fn describe(&self, scene: &Scene) -> LightDescription {
        let local = scene
            .transform(self.base.owner())
            .map_or_else(Vec3::zeros, |node| node.position());
        LightDescription {
            light_type: LightType::Directional,
            position: world_position(scene, &self.base),
            direction: local,
            color: self.color,
            intensity: self.intensity,
            cos_angle: 0.0,
        }
    }
}

impl ComponentType for GlobalIllumination {
    const KIND: ComponentKind = ComponentKind::GlobalIllumination;
}

/// Directional light that follows the sky's sun.
///
/// Each frame the entity moves to the sun position and the light shines from
/// there towards the origin.
#[derive(Debug, Clone)]
pub struct Sun {
    base: ComponentBase,
    /// Linear RGB color, replaced by the sky's diffuse color while a sky exists
    pub color: Color,
    /// Intensity multiplier
    pub intensity: f32,
}

impl Default for Sun {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            color: color::WHITE,
            intensity: SUN_INTENSITY,
        }
    }
}

const SUN_PROPERTIES: &[Property<Sun>] = light_properties!(Sun,);

impl Component for Sun {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Sun
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        register(self, scene);
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene) {
        let Some((light, position)) = active_sky_light(scene) else {
            return;
        };
        self.color = light.diffuse;
        if let Some(node) = scene.transform_mut(self.base.owner()) {
            node.set_position(position);
        }
    }

    fn delete(&mut self, scene: &mut Scene) {
        deregister(self, scene);
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(SUN_PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(SUN_PROPERTIES, ComponentKind::Sun, self, name, value)
    }

    fn as_light(&self) -> Option<&dyn LightSource> {
        Some(self)
    }
}

impl LightSource for Sun {
    fn describe(&self, scene: &Scene) -> LightDescription {
        let local = scene
            .transform(self.base.owner())
            .map_or_else(Vec3::zeros, |node| node.position());
        LightDescription {
            light_type: LightType::Directional,
            position: world_position(scene, &self.base),
            direction: -local,
            color: self.color,
            intensity: self.intensity,
            cos_angle: 0.0,
        }
    }
}

impl ComponentType for Sun {
    const KIND: ComponentKind = ComponentKind::Sun;
}
