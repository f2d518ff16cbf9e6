//! Procedural sky
//!
//! The shading itself happens in the host's `sky` shader. This component
//! owns the parameters it needs and the [`SkyModel`] that decides where the
//! sun is and what color it casts at a given time of day. Lights such as
//! [`super::Sun`] read the model of the active camera's sky.

use crate::assets::{LoadRequest, LoadedAsset};
use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::color::{rgb, Color};
use crate::foundation::math::{constants::TAU, utils, Vec3};
use crate::render::{RenderBackend, ShaderHandle, SkyDraw, Uniform};
use crate::scene::{Scene, SceneError};

use super::{Camera, Fog};

/// Sun colors at one moment of the day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunLight {
    /// Ambient term
    pub ambient: Color,
    /// Diffuse term
    pub diffuse: Color,
    /// Specular term
    pub specular: Color,
}

impl SunLight {
    /// Component-wise interpolation
    pub fn lerp(&self, other: &SunLight, t: f32) -> SunLight {
        SunLight {
            ambient: utils::lerp_vec3(&self.ambient, &other.ambient, t),
            diffuse: utils::lerp_vec3(&self.diffuse, &other.diffuse, t),
            specular: utils::lerp_vec3(&self.specular, &other.specular, t),
        }
    }
}

/// Sun path and color over a day.
///
/// `day_time` is the fraction of the day in `[0, 1)`.
pub trait SkyModel: std::fmt::Debug {
    /// World position of the sun for an atmosphere of the given height
    fn sun_position(&self, day_time: f32, atmosphere_height: f32) -> Vec3;

    /// Sun colors
    fn sun_light(&self, day_time: f32) -> SunLight;
}

/// Sun colors pinned at a moment of the day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Fraction of the day
    pub time: f32,
    /// Colors at that moment
    pub light: SunLight,
}

/// Sky model interpolating sun colors between keyframes.
///
/// The sun travels a circle in the YZ plane at twice the atmosphere height,
/// rising at `day_time = 0` and setting at `0.5`.
#[derive(Debug, Clone, PartialEq)]
pub struct DaylightKeyframes {
    keyframes: Vec<Keyframe>,
}

fn keyframe(time: f32, ambient: Color, diffuse: Color, specular: Color) -> Keyframe {
    Keyframe {
        time,
        light: SunLight { ambient, diffuse, specular },
    }
}

impl Default for DaylightKeyframes {
    fn default() -> Self {
        let dawn = rgb(255, 147, 41);
        let morning = rgb(255, 230, 200);
        let white = rgb(255, 255, 255);
        Self::new(vec![
            keyframe(0.0, rgb(10, 10, 20), rgb(5, 5, 10), rgb(20, 20, 30)),
            keyframe(0.05, dawn, dawn, white),
            keyframe(0.1, morning, morning, rgb(255, 255, 245)),
            keyframe(0.25, white, white, white),
            keyframe(0.375, morning, morning, rgb(255, 255, 245)),
            keyframe(0.45, dawn, dawn, white),
            keyframe(0.5, rgb(30, 30, 40), rgb(20, 20, 30), rgb(50, 50, 60)),
            keyframe(0.75, rgb(5, 5, 15), rgb(2, 2, 8), rgb(10, 10, 20)),
        ])
    }
}

impl DaylightKeyframes {
    /// Create a model from keyframes, sorted by time
    pub fn new(mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keyframes }
    }

    /// Keyframes in time order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }
}

impl SkyModel for DaylightKeyframes {
    fn sun_position(&self, day_time: f32, atmosphere_height: f32) -> Vec3 {
        let angle = day_time * TAU;
        let radius = atmosphere_height * 2.0;
        Vec3::new(0.0, angle.sin() * radius, angle.cos() * radius)
    }

    fn sun_light(&self, day_time: f32) -> SunLight {
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            let white = rgb(255, 255, 255);
            return SunLight { ambient: white, diffuse: white, specular: white };
        };

        match self.keyframes.iter().position(|frame| frame.time > day_time) {
            Some(0) => first.light,
            Some(upper) => {
                let lower = &self.keyframes[upper - 1];
                let upper = &self.keyframes[upper];
                let t = utils::inverse_lerp(day_time, lower.time, upper.time);
                lower.light.lerp(&upper.light, t)
            }
            // Past the last keyframe: blend towards the first one at midnight.
            None => {
                let t = utils::inverse_lerp(day_time, last.time, 1.0);
                last.light.lerp(&first.light, t)
            }
        }
    }
}

/// Sky component, drawn by the active camera before the scene
#[derive(Debug)]
pub struct SkyRenderer {
    base: ComponentBase,
    /// Edge length of the sky cube
    pub cube_size: f32,
    /// Atmosphere height above the ground plane
    pub atmosphere_height: f32,
    /// Red, green and blue wavelengths in nanometres
    pub wavelengths: Vec3,
    /// Rayleigh scattering multiplier
    pub scattering_strength: f32,
    /// Exponential density falloff with height
    pub atmosphere_falloff: f32,
    /// In-scattering samples per view ray
    pub light_points: u32,
    /// Optical depth samples per light ray
    pub optical_depth_points: u32,
    model: Box<dyn SkyModel>,
    shader: Option<ShaderHandle>,
}

impl Default for SkyRenderer {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            cube_size: 250.0,
            atmosphere_height: 100.0,
            wavelengths: Vec3::new(700.0, 530.0, 440.0),
            scattering_strength: 0.4,
            atmosphere_falloff: 0.2,
            light_points: 6,
            optical_depth_points: 6,
            model: Box::new(DaylightKeyframes::default()),
            shader: None,
        }
    }
}

const PROPERTIES: &[Property<SkyRenderer>] = &[
    Property {
        name: "cube_size",
        editor: EditorKind::Number { min: Some(1.0), max: None },
        get: |s| PropertyValue::Number(s.cube_size),
        set: |s, v| v.as_number().map(|n| s.cube_size = n).is_some(),
    },
    Property {
        name: "atmosphere_height",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |s| PropertyValue::Number(s.atmosphere_height),
        set: |s, v| v.as_number().map(|n| s.atmosphere_height = n).is_some(),
    },
    Property {
        name: "wavelengths",
        editor: EditorKind::Vec3,
        get: |s| PropertyValue::Vec3(s.wavelengths),
        set: |s, v| v.as_vec3().map(|w| s.wavelengths = w).is_some(),
    },
    Property {
        name: "scattering_strength",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |s| PropertyValue::Number(s.scattering_strength),
        set: |s, v| v.as_number().map(|n| s.scattering_strength = n).is_some(),
    },
    Property {
        name: "atmosphere_falloff",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |s| PropertyValue::Number(s.atmosphere_falloff),
        set: |s, v| v.as_number().map(|n| s.atmosphere_falloff = n).is_some(),
    },
    Property {
        name: "light_points",
        editor: EditorKind::Number { min: Some(1.0), max: Some(64.0) },
        get: |s| PropertyValue::Number(s.light_points as f32),
        set: |s, v| v.as_number().map(|n| s.light_points = n.round() as u32).is_some(),
    },
    Property {
        name: "optical_depth_points",
        editor: EditorKind::Number { min: Some(1.0), max: Some(64.0) },
        get: |s| PropertyValue::Number(s.optical_depth_points as f32),
        set: |s, v| v.as_number().map(|n| s.optical_depth_points = n.round() as u32).is_some(),
    },
];

impl SkyRenderer {
    /// Replace the sky model
    pub fn set_model(&mut self, model: Box<dyn SkyModel>) {
        self.model = model;
    }

    /// Current sky model
    pub fn model(&self) -> &dyn SkyModel {
        self.model.as_ref()
    }

    /// Sun position at `day_time`
    pub fn sun_position(&self, day_time: f32) -> Vec3 {
        self.model.sun_position(day_time, self.atmosphere_height)
    }

    /// Sun colors at `day_time`
    pub fn sun_light(&self, day_time: f32) -> SunLight {
        self.model.sun_light(day_time)
    }

    /// Per-channel scattering coefficients, `(180 / λ)^4 * strength`
    pub fn scattering(&self) -> Vec3 {
        self.wavelengths
            .map(|wavelength| (180.0 / wavelength).powi(4) * self.scattering_strength)
    }

    /// Whether the shader has arrived
    pub fn is_ready(&self) -> bool {
        self.shader.is_some()
    }

    /// Draw the sky around `camera`
    pub fn draw(&self, scene: &Scene, camera: &Camera, backend: &mut dyn RenderBackend) {
        let Some(shader) = self.shader else {
            return;
        };
        backend.bind_shader(shader);
        backend.set_uniform("Scattering", Uniform::Vec3(self.scattering()));
        backend.set_uniform("DensityFalloff", Uniform::Float(self.atmosphere_falloff));
        backend.set_uniform("LightPoints", Uniform::Int(i32::try_from(self.light_points).unwrap_or(i32::MAX)));
        backend.set_uniform(
            "OpticalDepthPoints",
            Uniform::Int(i32::try_from(self.optical_depth_points).unwrap_or(i32::MAX)),
        );
        backend.draw_sky(&SkyDraw {
            shader,
            view_projection: camera.view_projection(),
            camera_position: camera.position(),
            sun_position: self.sun_position(scene.time().day_time()),
            atmosphere_height: self.atmosphere_height,
            cube_size: self.cube_size,
        });
    }
}

impl Component for SkyRenderer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::SkyRenderer
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let owner = self.base.owner();
        if scene.component::<Fog>(owner).is_none() {
            scene.add_component::<Fog>(owner)?;
        }
        scene.request_load((&*self as &dyn Component).handle(), LoadRequest::Shader("sky".to_string()));
        Ok(())
    }

    fn on_asset_loaded(&mut self, _scene: &mut Scene, asset: LoadedAsset) {
        if let LoadedAsset::Shader { name, shader } = asset {
            if shader.is_none() {
                log::warn!("Sky shader '{}' not found", name);
            }
            self.shader = shader;
        }
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::SkyRenderer, self, name, value)
    }
}

impl ComponentType for SkyRenderer {
    const KIND: ComponentKind = ComponentKind::SkyRenderer;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_keyframe_hit_exactly() {
        let model = DaylightKeyframes::default();
        let noon = model.sun_light(0.25);
        assert_relative_eq!(noon.diffuse, Vec3::repeat(1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_interpolates_between_keyframes() {
        let model = DaylightKeyframes::default();
        let light = model.sun_light(0.025);
        let expected = utils::lerp_vec3(&rgb(5, 5, 10), &rgb(255, 147, 41), 0.5);
        assert_relative_eq!(light.diffuse, expected, epsilon = EPSILON);
    }

    #[test]
    fn test_wraps_towards_midnight() {
        let model = DaylightKeyframes::default();
        let light = model.sun_light(0.875);
        let expected = utils::lerp_vec3(&rgb(5, 5, 15), &rgb(10, 10, 20), 0.5);
        assert_relative_eq!(light.ambient, expected, epsilon = EPSILON);
    }

    #[test]
    fn test_sun_circles_at_twice_atmosphere_height() {
        let model = DaylightKeyframes::default();
        let sunrise = model.sun_position(0.0, 100.0);
        let noon = model.sun_position(0.25, 100.0);
        assert_relative_eq!(sunrise, Vec3::new(0.0, 0.0, 200.0), epsilon = 1e-3);
        assert_relative_eq!(noon, Vec3::new(0.0, 200.0, 0.0), epsilon = 1e-3);
    }

    #[test]
    fn test_scattering_favours_blue() {
        let sky = SkyRenderer::default();
        let scattering = sky.scattering();
        assert!(scattering.z > scattering.y && scattering.y > scattering.x);
    }
}
