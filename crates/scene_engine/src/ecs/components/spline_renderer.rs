//! Line-strip rendering of a sibling spline

use crate::assets::{LoadRequest, LoadedAsset};
use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::color::{self, Color};
use crate::foundation::math::Vec3;
use crate::render::{Primitive, RenderBackend, Renderer, ShaderHandle, Uniform};
use crate::scene::{RenderingContext, Scene, SceneError};
use crate::spatial::BoundingBox;

use super::bounding_box_renderer::{draw_sibling_outline, BoundingBoxRenderer};
use super::Spline;

/// Draws the [`Spline`] on the same entity as a line strip.
///
/// The sampled points are cached and rebuilt during `update` whenever the
/// spline's sample count changes.
#[derive(Debug, Clone)]
pub struct SplineRenderer {
    base: ComponentBase,
    /// Line color
    pub color: Color,
    points: Vec<Vec3>,
    sampled_len: Option<usize>,
    bounding_box: Option<BoundingBox>,
    shader: Option<ShaderHandle>,
}

impl Default for SplineRenderer {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            color: color::WHITE,
            points: Vec::new(),
            sampled_len: None,
            bounding_box: None,
            shader: None,
        }
    }
}

const PROPERTIES: &[Property<SplineRenderer>] = &[Property {
    name: "color",
    editor: EditorKind::Color,
    get: |r| PropertyValue::Color(r.color),
    set: |r, v| v.as_vec3().map(|c| r.color = c).is_some(),
}];

impl SplineRenderer {
    /// Cached line-strip vertices
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Resample the sibling spline if its sample count changed
    pub fn refresh(&mut self, scene: &mut Scene) {
        let owner = self.base.owner();
        let Some(spline) = scene.component::<Spline>(owner) else {
            return;
        };
        if self.sampled_len == Some(spline.len()) {
            return;
        }
        self.sampled_len = Some(spline.len());
        self.points = spline.points();
        let bounds = BoundingBox::from_points(&self.points);
        self.bounding_box = (!bounds.is_empty()).then_some(bounds);

        if let Some(outline) = scene.component_mut::<BoundingBoxRenderer>(owner) {
            outline.set_bounding_box(bounds);
        }
    }
}

impl Component for SplineRenderer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::SplineRenderer
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let owner = self.base.owner();
        if scene.component::<Spline>(owner).is_none() {
            return Err(SceneError::MissingSibling {
                component: ComponentKind::SplineRenderer,
                required: ComponentKind::Spline,
            });
        }
        if scene.component::<BoundingBoxRenderer>(owner).is_none() {
            scene.add_component::<BoundingBoxRenderer>(owner)?;
        }
        self.refresh(scene);
        scene.request_load((&*self as &dyn Component).handle(), LoadRequest::Shader("ray".to_string()));
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene) {
        self.refresh(scene);
    }

    fn on_asset_loaded(&mut self, _scene: &mut Scene, asset: LoadedAsset) {
        if let LoadedAsset::Shader { shader, .. } = asset {
            if shader.is_none() {
                log::warn!("Ray shader not found, splines will not be drawn");
            }
            self.shader = shader;
        }
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::SplineRenderer, self, name, value)
    }

    fn as_renderer(&self) -> Option<&dyn Renderer> {
        Some(self)
    }
}

impl Renderer for SplineRenderer {
    fn draw(&self, ctx: &RenderingContext<'_>, backend: &mut dyn RenderBackend) {
        let Some(shader) = self.shader else {
            return;
        };
        if self.points.is_empty() {
            return;
        }
        backend.bind_shader(shader);
        backend.set_uniform("MVP", Uniform::Mat4(ctx.mvp()));
        backend.set_uniform("Color", Uniform::Vec3(self.color));
        backend.draw_lines(Primitive::LineStrip, &self.points, None);

        draw_sibling_outline(ctx, backend);
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }
}

impl ComponentType for SplineRenderer {
    const KIND: ComponentKind = ComponentKind::SplineRenderer;
}
