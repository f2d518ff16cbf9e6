//! Textured quads

use crate::assets::{LoadRequest, LoadedAsset};
use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::math::Vec3;
use crate::render::{RenderBackend, Renderer, ShaderHandle, TextureHandle, Uniform};
use crate::scene::{RenderingContext, Scene, SceneError};
use crate::spatial::BoundingBox;

/// A unit quad in the local XY plane, scaled by `width` and `height`.
///
/// The size is written into the transform's scale, so the quad's local
/// bounds stay fixed at ±0.5.
#[derive(Debug, Clone)]
pub struct SpriteRenderer {
    base: ComponentBase,
    /// Horizontal size in world units
    pub width: f32,
    /// Vertical size in world units
    pub height: f32,
    texture_path: Option<String>,
    texture: Option<TextureHandle>,
    shader: Option<ShaderHandle>,
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            width: 1.0,
            height: 1.0,
            texture_path: None,
            texture: None,
            shader: None,
        }
    }
}

const PROPERTIES: &[Property<SpriteRenderer>] = &[
    Property {
        name: "width",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |s| PropertyValue::Number(s.width),
        set: |s, v| v.as_number().map(|n| s.width = n).is_some(),
    },
    Property {
        name: "height",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |s| PropertyValue::Number(s.height),
        set: |s, v| v.as_number().map(|n| s.height = n).is_some(),
    },
];

impl SpriteRenderer {
    /// Local bounds of the quad
    pub const QUAD: BoundingBox = BoundingBox {
        min: Vec3::new(-0.5, -0.5, 0.0),
        max: Vec3::new(0.5, 0.5, 0.0),
    };

    /// Queue `path` as the sprite's texture
    pub fn set_texture(&mut self, scene: &mut Scene, path: impl Into<String>) {
        let path = path.into();
        self.texture = None;
        self.texture_path = Some(path.clone());
        scene.request_load((&*self as &dyn Component).handle(), LoadRequest::Texture(path));
    }

    /// Texture path last requested
    pub fn texture_path(&self) -> Option<&str> {
        self.texture_path.as_deref()
    }

    fn apply_scale(&self, scene: &mut Scene) {
        if let Some(node) = scene.transform_mut(self.base.owner()) {
            node.set_scale(Vec3::new(self.width, self.height, 1.0));
        }
    }
}

impl Component for SpriteRenderer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::SpriteRenderer
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.apply_scale(scene);
        scene.request_load((&*self as &dyn Component).handle(), LoadRequest::Shader("sprite".to_string()));
        Ok(())
    }

    fn on_property_changed(&mut self, scene: &mut Scene, property: &str) {
        if matches!(property, "width" | "height") {
            self.apply_scale(scene);
        }
    }

    fn on_asset_loaded(&mut self, _scene: &mut Scene, asset: LoadedAsset) {
        match asset {
            LoadedAsset::Shader { shader, .. } => self.shader = shader,
            LoadedAsset::Texture { path, texture } => {
                // A newer request may have replaced this one.
                if self.texture_path.as_deref() != Some(path.as_str()) {
                    return;
                }
                if texture.is_none() {
                    log::warn!("Sprite texture '{}' not found", path);
                }
                self.texture = texture;
            }
            LoadedAsset::Model { .. } => {}
        }
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::SpriteRenderer, self, name, value)
    }

    fn as_renderer(&self) -> Option<&dyn Renderer> {
        Some(self)
    }
}

impl Renderer for SpriteRenderer {
    fn draw(&self, ctx: &RenderingContext<'_>, backend: &mut dyn RenderBackend) {
        let (Some(shader), Some(texture)) = (self.shader, self.texture) else {
            return;
        };
        backend.bind_shader(shader);
        backend.set_uniform("MVP", Uniform::Mat4(ctx.mvp()));
        backend.draw_sprite(texture);
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(Self::QUAD)
    }
}

impl ComponentType for SpriteRenderer {
    const KIND: ComponentKind = ComponentKind::SpriteRenderer;
}
