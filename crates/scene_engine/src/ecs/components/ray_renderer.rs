//! Debug line along a ray

use crate::assets::{LoadRequest, LoadedAsset};
use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::color::{self, Color};
use crate::foundation::math::Vec3;
use crate::render::{Primitive, RenderBackend, Renderer, ShaderHandle, Uniform};
use crate::scene::{RenderingContext, Scene, SceneError};
use crate::spatial::{BoundingBox, Ray};

/// Draws one segment from a ray's origin along its direction.
///
/// The ray lives in the entity's local space; on an entity at the origin it
/// is a world ray, which is how picking rays are usually shown. The renderer
/// has no bounds, so it is never picked itself.
#[derive(Debug, Clone)]
pub struct RayRenderer {
    base: ComponentBase,
    /// Line color
    pub color: Color,
    /// Drawn length along the direction
    pub length: f32,
    ray: Ray,
    shader: Option<ShaderHandle>,
}

impl Default for RayRenderer {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            color: color::WHITE,
            length: 100.0,
            ray: Ray::new(Vec3::zeros(), Vec3::y()),
            shader: None,
        }
    }
}

const PROPERTIES: &[Property<RayRenderer>] = &[
    Property {
        name: "color",
        editor: EditorKind::Color,
        get: |r| PropertyValue::Color(r.color),
        set: |r, v| v.as_vec3().map(|c| r.color = c).is_some(),
    },
    Property {
        name: "length",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |r| PropertyValue::Number(r.length),
        set: |r, v| v.as_number().map(|n| r.length = n).is_some(),
    },
];

impl RayRenderer {
    /// Ray being shown
    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Show `ray` from the next frame on
    pub fn set_ray(&mut self, ray: Ray) {
        self.ray = ray;
    }

    /// Start and end of the drawn segment
    pub fn segment(&self) -> [Vec3; 2] {
        [self.ray.origin, self.ray.point_at(self.length)]
    }
}

impl Component for RayRenderer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::RayRenderer
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
                log::warn!("Ray shader not found, rays will not be drawn");
            }
            self.shader = shader;
        }
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::RayRenderer, self, name, value)
    }

    fn as_renderer(&self) -> Option<&dyn Renderer> {
        Some(self)
    }
}

impl Renderer for RayRenderer {
    fn draw(&self, ctx: &RenderingContext<'_>, backend: &mut dyn RenderBackend) {
        let Some(shader) = self.shader else {
            return;
        };
        backend.bind_shader(shader);
        backend.set_uniform("MVP", Uniform::Mat4(ctx.mvp()));
        backend.set_uniform("Color", Uniform::Vec3(self.color));
        backend.draw_lines(Primitive::Lines, &self.segment(), None);
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        None
    }
}

impl ComponentType for RayRenderer {
    const KIND: ComponentKind = ComponentKind::RayRenderer;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssets;
    use crate::ecs::components::Camera;
    use crate::render::{CommandRecorder, DrawCommand};
    use approx::assert_relative_eq;
    use std::time::Duration;

    #[test]
    fn test_segment_follows_the_ray() {
        let mut renderer = RayRenderer {
            length: 4.0,
            ..RayRenderer::default()
        };
        renderer.set_ray(Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0)));
        let [start, end] = renderer.segment();
        assert_relative_eq!(start, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(end, Vec3::new(1.0, 0.0, 4.0));
    }

    #[test]
    fn test_draws_the_picking_ray_once_the_shader_arrives() {
        let mut scene = Scene::new("ray");
        scene.set_asset_source(Box::new(InMemoryAssets::with_builtin_shaders()));
        let camera = scene.create_entity("camera");
        scene.add_component::<Camera>(camera).unwrap();
        let marker = scene.create_entity("ray");
        scene.add_component::<RayRenderer>(marker).unwrap();

        let mut recorder = CommandRecorder::new();
        scene.render(&mut recorder);
        assert_eq!(recorder.draw_count(), 0);

        scene.update(Duration::ZERO);
        let ray = scene.screen_ray(400.0, 300.0).unwrap();
        scene.component_mut::<RayRenderer>(marker).unwrap().set_ray(ray);
        recorder.clear();
        scene.render(&mut recorder);

        let lines: Vec<&Vec<Vec3>> = recorder
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::DrawLines { vertices, .. } => Some(vertices),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 1);
        assert_relative_eq!(lines[0][0], ray.origin);

        // Not pickable, even along its own line.
        assert!(scene.ray_cast(&ray).is_none());
    }
}
