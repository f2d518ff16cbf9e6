//! # Rendering
//!
//! The scene-facing half of rendering: the [`RenderBackend`] seam, the
//! [`Renderer`] capability components expose, light packing and a headless
//! [`CommandRecorder`].
//!
//! ## Frame flow
//!
//! `Scene::render` packs the registered lights and uploads them, lets the
//! active camera draw its sky and grid, then walks the root entities with an
//! accumulated parent matrix. Each entity's renderer draws itself through the
//! backend using the matrices in its [`RenderingContext`].

pub mod backend;
pub mod commands;
pub mod lighting;

pub use backend::{
    GridDraw, MaterialHandle, MeshHandle, Primitive, RenderBackend, ShaderHandle, SkyDraw,
    TextureHandle, Uniform,
};
pub use commands::{CommandRecorder, DrawCommand};
pub use lighting::{
    LightBuffer, LightDescription, LightRecord, LightRegistry, LightSource, LightType, MAX_LIGHTS,
};

use crate::scene::RenderingContext;
use crate::spatial::BoundingBox;

/// Capability of components that draw their entity
pub trait Renderer {
    /// Issue the draw calls for this entity
    fn draw(&self, ctx: &RenderingContext<'_>, backend: &mut dyn RenderBackend);

    /// Local-space bounds used for picking, once known
    fn bounding_box(&self) -> Option<BoundingBox>;
}
