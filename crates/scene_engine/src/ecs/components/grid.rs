//! Ground grid

use crate::assets::{LoadRequest, LoadedAsset};
use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::color::Color;
use crate::foundation::math::Vec3;
use crate::render::{GridDraw, RenderBackend, ShaderHandle};
use crate::scene::{Scene, SceneError};

use super::Camera;

/// Infinite-looking grid on the ground plane, centred under the camera
#[derive(Debug, Clone)]
pub struct GridRenderer {
    base: ComponentBase,
    /// Half extent of the drawn quad
    pub grid_size: f32,
    /// Edge length of a minor cell
    pub cell_size: f32,
    /// Minor cells per major line
    pub cell_gap: f32,
    /// Major line color
    pub line_color_thick: Color,
    /// Minor line color
    pub line_color_thin: Color,
    shader: Option<ShaderHandle>,
}

impl Default for GridRenderer {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            grid_size: 100.0,
            cell_size: 0.5,
            cell_gap: 2.0,
            line_color_thick: Vec3::repeat(0.5),
            line_color_thin: Vec3::repeat(0.3),
            shader: None,
        }
    }
}

const PROPERTIES: &[Property<GridRenderer>] = &[
    Property {
        name: "grid_size",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |g| PropertyValue::Number(g.grid_size),
        set: |g, v| v.as_number().map(|n| g.grid_size = n).is_some(),
    },
    Property {
        name: "cell_size",
        editor: EditorKind::Number { min: Some(0.001), max: None },
        get: |g| PropertyValue::Number(g.cell_size),
        set: |g, v| v.as_number().map(|n| g.cell_size = n).is_some(),
    },
    Property {
        name: "cell_gap",
        editor: EditorKind::Number { min: Some(1.0), max: None },
        get: |g| PropertyValue::Number(g.cell_gap),
        set: |g, v| v.as_number().map(|n| g.cell_gap = n).is_some(),
    },
    Property {
        name: "line_color_thick",
        editor: EditorKind::Color,
        get: |g| PropertyValue::Color(g.line_color_thick),
        set: |g, v| v.as_vec3().map(|c| g.line_color_thick = c).is_some(),
    },
    Property {
        name: "line_color_thin",
        editor: EditorKind::Color,
        get: |g| PropertyValue::Color(g.line_color_thin),
        set: |g, v| v.as_vec3().map(|c| g.line_color_thin = c).is_some(),
    },
];

impl GridRenderer {
    /// Whether the shader has arrived
    pub fn is_ready(&self) -> bool {
        self.shader.is_some()
    }

    /// Draw the grid under `camera`
    pub fn draw(&self, camera: &Camera, backend: &mut dyn RenderBackend) {
        let Some(shader) = self.shader else {
            return;
        };
        backend.bind_shader(shader);
        backend.draw_grid(&GridDraw {
            shader,
            view_projection: camera.view_projection(),
            target_position: camera.position(),
            grid_size: self.grid_size,
            cell_size: self.cell_size,
            cell_gap: self.cell_gap,
            color: self.line_color_thick,
            sub_color: self.line_color_thin,
        });
    }
}

impl Component for GridRenderer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::GridRenderer
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.request_load((&*self as &dyn Component).handle(), LoadRequest::Shader("grid".to_string()));
        Ok(())
    }

    fn on_asset_loaded(&mut self, _scene: &mut Scene, asset: LoadedAsset) {
        if let LoadedAsset::Shader { name, shader } = asset {
            if shader.is_none() {
                log::warn!("Grid shader '{}' not found", name);
            }
            self.shader = shader;
        }
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::GridRenderer, self, name, value)
    }
}

impl ComponentType for GridRenderer {
    const KIND: ComponentKind = ComponentKind::GridRenderer;
}
