//! Distance fog parameters

use serde::{Deserialize, Serialize};

use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::color::{self, Color};
use crate::render::{RenderBackend, Uniform};
use crate::scene::{Scene, SceneError};

use super::SkyRenderer;

/// Bit offset of the linear end distance in the packed shader function
pub const LINEAR_END_OFFSET: u32 = 4;

/// Share of the sun's diffuse color used for the fog
pub const DEFAULT_COLOR_FACTOR: f32 = 0.75;

/// Fog falloff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FogFunction {
    /// Linear up to the end distance
    Linear = 0,
    /// Exponential in distance
    Exp = 1,
    /// Exponential in squared distance
    #[default]
    Exp2 = 2,
}

impl FogFunction {
    /// Labels in id order
    pub const LABELS: &'static [&'static str] = &["Linear", "Exponential", "Exponential^2"];

    /// Function for a select index
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Linear),
            1 => Some(Self::Exp),
            2 => Some(Self::Exp2),
            _ => None,
        }
    }
}

/// Fog component.
///
/// Lives next to a [`SkyRenderer`], which adds it, and takes its color from
/// the sky's sun.
#[derive(Debug, Clone)]
pub struct Fog {
    base: ComponentBase,
    /// Falloff function
    pub function: FogFunction,
    /// Density for the exponential functions
    pub density: f32,
    /// Distance where linear fog becomes opaque
    pub linear_end: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            function: FogFunction::default(),
            density: 0.03,
            linear_end: 100.0,
        }
    }
}

const PROPERTIES: &[Property<Fog>] = &[
    Property {
        name: "function",
        editor: EditorKind::Select(FogFunction::LABELS),
        get: |f| PropertyValue::Choice(f.function as u32),
        set: |f, v| {
            v.as_choice()
                .and_then(FogFunction::from_index)
                .map(|function| f.function = function)
                .is_some()
        },
    },
    Property {
        name: "density",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |f| PropertyValue::Number(f.density),
        set: |f, v| v.as_number().map(|n| f.density = n).is_some(),
    },
    Property {
        name: "linear_end",
        editor: EditorKind::Number { min: Some(0.0), max: Some(65_535.0) },
        get: |f| PropertyValue::Number(f.linear_end),
        set: |f, v| v.as_number().map(|n| f.linear_end = n).is_some(),
    },
];

impl Fog {
    /// Function id with the rounded linear end packed above it
    pub fn shader_function(&self) -> i32 {
        let end = self.linear_end.round().max(0.0) as i32;
        (end << LINEAR_END_OFFSET) | self.function as i32
    }

    /// Fog color from the sibling sky at the current time, white without one
    pub fn color(&self, scene: &Scene, factor: f32) -> Color {
        scene
            .entity(self.base.owner())
            .and_then(|entity| entity.get::<SkyRenderer>())
            .map_or(color::WHITE, |sky| sky.sun_light(scene.time().day_time()).diffuse)
            * factor
    }

    /// Set the fog uniforms on the bound shader
    pub fn apply(&self, scene: &Scene, backend: &mut dyn RenderBackend) {
        backend.set_uniform("FogFunction", Uniform::Int(self.shader_function()));
        backend.set_uniform("FogDensity", Uniform::Float(self.density));
        backend.set_uniform("FogColor", Uniform::Vec3(self.color(scene, DEFAULT_COLOR_FACTOR)));
    }
}

impl Component for Fog {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Fog
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::Fog, self, name, value)
    }
}

impl ComponentType for Fog {
    const KIND: ComponentKind = ComponentKind::Fog;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_function_packs_end_above_id() {
        let fog = Fog::default();
        assert_eq!(fog.shader_function(), (100 << 4) | 2);

        let linear = Fog {
            function: FogFunction::Linear,
            linear_end: 42.6,
            ..Fog::default()
        };
        assert_eq!(linear.shader_function(), 43 << 4);
    }

    #[test]
    fn test_function_choice_is_checked() {
        let mut fog = Fog::default();
        fog.set_property("function", PropertyValue::Choice(1)).unwrap();
        assert_eq!(fog.function, FogFunction::Exp);
        assert!(fog.set_property("function", PropertyValue::Choice(3)).is_err());
    }
}
