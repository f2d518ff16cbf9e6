//! Debug outline of a sibling renderer's bounds

use crate::assets::{LoadRequest, LoadedAsset};
use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::color::Color;
use crate::foundation::math::Vec3;
use crate::render::{Primitive, RenderBackend, ShaderHandle, Uniform};
use crate::scene::{RenderingContext, Scene, SceneError};
use crate::spatial::{BoundingBox, EDGE_INDICES};

/// Draws the twelve edges of a box.
///
/// Added automatically next to mesh and spline renderers, which hand it
/// their bounds and draw it while `render_bounding_boxes` is set. It is not
/// itself a renderer, so it never becomes the entity's renderer.
#[derive(Debug, Clone)]
pub struct BoundingBoxRenderer {
    base: ComponentBase,
    /// Line color
    pub color: Color,
    bounding_box: Option<BoundingBox>,
    corners: [Vec3; 8],
    shader: Option<ShaderHandle>,
}

impl Default for BoundingBoxRenderer {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            color: Vec3::new(0.5, 1.0, 0.5),
            bounding_box: None,
            corners: [Vec3::zeros(); 8],
            shader: None,
        }
    }
}

const PROPERTIES: &[Property<BoundingBoxRenderer>] = &[Property {
    name: "color",
    editor: EditorKind::Color,
    get: |b| PropertyValue::Color(b.color),
    set: |b, v| v.as_vec3().map(|c| b.color = c).is_some(),
}];

impl BoundingBoxRenderer {
    /// Box being outlined
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// Outline `bounding_box`; an empty box clears the outline
    pub fn set_bounding_box(&mut self, bounding_box: BoundingBox) {
        if bounding_box.is_empty() {
            self.bounding_box = None;
            return;
        }
        self.corners = bounding_box.corners();
        self.bounding_box = Some(bounding_box);
    }

    /// Draw the outline in the space of `ctx`'s entity
    pub fn draw(&self, ctx: &RenderingContext<'_>, backend: &mut dyn RenderBackend) {
        let (Some(shader), Some(_)) = (self.shader, self.bounding_box) else {
            return;
        };
        backend.bind_shader(shader);
        backend.set_uniform("MVP", Uniform::Mat4(ctx.mvp()));
        backend.set_uniform("Color", Uniform::Vec3(self.color));
        backend.draw_lines(Primitive::Lines, &self.corners, Some(&EDGE_INDICES));
    }
}

impl Component for BoundingBoxRenderer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::BoundingBoxRenderer
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.request_load((&*self as &dyn Component).handle(), LoadRequest::Shader("ray".to_string()));
        Ok(())
    }

    fn on_asset_loaded(&mut self, _scene: &mut Scene, asset: LoadedAsset) {
        if let LoadedAsset::Shader { shader, .. } = asset {
            if shader.is_none() {
                log::warn!("Ray shader not found, bounding boxes will not be drawn");
            }
            self.shader = shader;
        }
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::BoundingBoxRenderer, self, name, value)
    }
}

impl ComponentType for BoundingBoxRenderer {
    const KIND: ComponentKind = ComponentKind::BoundingBoxRenderer;
}

/// Draw the bounding-box sibling of `ctx`'s entity when the scene asks for outlines
pub(crate) fn draw_sibling_outline(ctx: &RenderingContext<'_>, backend: &mut dyn RenderBackend) {
    if !ctx.scene.settings().render_bounding_boxes {
        return;
    }
    let outline = ctx
        .scene
        .entity(ctx.entity)
        .and_then(|entity| entity.get::<BoundingBoxRenderer>())
        .filter(|outline| outline.base.is_enabled());
    if let Some(outline) = outline {
        outline.draw(ctx, backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_box_clears_outline() {
        let mut outline = BoundingBoxRenderer::default();
        outline.set_bounding_box(BoundingBox::new(Vec3::repeat(-1.0), Vec3::repeat(1.0)));
        assert!(outline.bounding_box().is_some());
        outline.set_bounding_box(BoundingBox::initial());
        assert!(outline.bounding_box().is_none());
    }
}
