//! Loaded meshes
//!
//! A mesh renderer starts empty. The scene queues its model and shader
//! loads; once the model arrives the renderer keeps its parts and merged
//! bounds and adds a [`BoundingBoxRenderer`] sibling for debugging. Until
//! both model and shader are present it draws nothing and can't be picked.

use crate::assets::{LoadRequest, LoadedAsset, MeshPart, ModelData};
use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::foundation::math::Vec3;
use crate::render::{RenderBackend, Renderer, ShaderHandle, Uniform};
use crate::scene::{RenderingContext, Scene, SceneError};
use crate::spatial::BoundingBox;

use super::bounding_box_renderer::{draw_sibling_outline, BoundingBoxRenderer};
use super::{Fog, SkyRenderer};

/// Scene light used when the camera has no sky
const FALLBACK_LIGHT_POSITION: Vec3 = Vec3::new(0.0, 2.0, 0.0);

/// Mesh renderer component
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    base: ComponentBase,
    model_path: Option<String>,
    parts: Vec<MeshPart>,
    bounding_box: Option<BoundingBox>,
    shader: Option<ShaderHandle>,
}

impl MeshRenderer {
    /// Path of the requested model
    pub fn model_path(&self) -> Option<&str> {
        self.model_path.as_deref()
    }

    /// Drawable parts, empty until loaded
    pub fn parts(&self) -> &[MeshPart] {
        &self.parts
    }

    /// Whether model and shader have both arrived
    pub fn is_ready(&self) -> bool {
        self.shader.is_some() && !self.parts.is_empty()
    }

    /// Queue `path` as this renderer's model
    pub fn load(&mut self, scene: &mut Scene, path: impl Into<String>) {
        let path = path.into();
        self.model_path = Some(path.clone());
        scene.request_load((&*self as &dyn Component).handle(), LoadRequest::Model(path));
    }

    fn set_model(&mut self, scene: &mut Scene, model: ModelData) -> Result<(), SceneError> {
        let bounds = model.bounding_box();
        self.parts = model.parts;
        self.bounding_box = (!bounds.is_empty()).then_some(bounds);

        let owner = self.base.owner();
        if scene.component::<BoundingBoxRenderer>(owner).is_none() {
            scene.add_component::<BoundingBoxRenderer>(owner)?;
        }
        if let Some(outline) = scene.component_mut::<BoundingBoxRenderer>(owner) {
            outline.set_bounding_box(bounds);
        }
        Ok(())
    }

    fn set_scene_light(ctx: &RenderingContext<'_>, backend: &mut dyn RenderBackend) {
        let scene = ctx.scene;
        backend.set_uniform("ViewPosition", Uniform::Vec3(ctx.camera.position()));

        let camera_entity = scene.entity(ctx.camera.base().owner());
        let sky = camera_entity.and_then(|entity| entity.get::<SkyRenderer>());
        let (position, light) = match sky {
            Some(sky) => {
                let day_time = scene.time().day_time();
                let light = sky.sun_light(day_time);
                (sky.sun_position(day_time), [light.ambient, light.diffuse, light.specular])
            }
            None => (
                FALLBACK_LIGHT_POSITION,
                [Vec3::new(0.3, 0.3, 0.35), Vec3::new(1.0, 1.0, 0.9), Vec3::repeat(1.0)],
            ),
        };
        backend.set_uniform("light.position", Uniform::Vec3(position));
        backend.set_uniform("light.ambient", Uniform::Vec3(light[0]));
        backend.set_uniform("light.diffuse", Uniform::Vec3(light[1]));
        backend.set_uniform("light.specular", Uniform::Vec3(light[2]));

        let fog = camera_entity
            .and_then(|entity| entity.get::<Fog>())
            .filter(|fog| fog.base().is_enabled());
        if let Some(fog) = fog {
            fog.apply(scene, backend);
        }
    }
}

impl Component for MeshRenderer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::MeshRenderer
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let shader = scene.settings().default_shader.shader_name();
        scene.request_load((&*self as &dyn Component).handle(), LoadRequest::Shader(shader.to_string()));
        Ok(())
    }

    fn on_asset_loaded(&mut self, scene: &mut Scene, asset: LoadedAsset) {
        match asset {
            LoadedAsset::Model { path, model: Some(model) } => {
                log::debug!("Loaded model '{}' with {} parts", path, model.parts.len());
                if let Err(err) = self.set_model(scene, model) {
                    log::warn!("Failed to attach bounding box for '{}': {}", path, err);
                }
            }
            LoadedAsset::Model { path, model: None } => {
                log::warn!("Mesh file not found: {}", path);
            }
            LoadedAsset::Shader { name, shader } => {
                if shader.is_none() {
                    log::warn!("Shader '{}' not found, mesh will not be drawn", name);
                }
                self.shader = shader;
            }
            LoadedAsset::Texture { .. } => {}
        }
    }

    fn as_renderer(&self) -> Option<&dyn Renderer> {
        Some(self)
    }
}

impl Renderer for MeshRenderer {
    fn draw(&self, ctx: &RenderingContext<'_>, backend: &mut dyn RenderBackend) {
        let Some(shader) = self.shader else {
            return;
        };
        if self.parts.is_empty() {
            return;
        }

        backend.bind_shader(shader);
        Self::set_scene_light(ctx, backend);

        let model = ctx.model_matrix();
        backend.set_uniform("Model", Uniform::Mat4(model));
        backend.set_uniform("MVP", Uniform::Mat4(ctx.camera.create_mvp(&model)));
        for part in &self.parts {
            backend.bind_material(part.material);
            backend.draw_mesh(part.mesh);
        }

        draw_sibling_outline(ctx, backend);
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box.filter(|_| self.is_ready())
    }
}

impl ComponentType for MeshRenderer {
    const KIND: ComponentKind = ComponentKind::MeshRenderer;
}
