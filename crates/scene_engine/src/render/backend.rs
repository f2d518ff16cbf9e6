//! Backend abstraction for scene rendering
//!
//! The scene never talks to a graphics API directly. Renderers bind shaders,
//! set uniforms and issue draws through [`RenderBackend`]; a host supplies the
//! GPU implementation and tests use [`super::CommandRecorder`].

use serde::{Serialize, Deserialize};

use crate::foundation::math::{Mat4, Vec3};
use super::lighting::LightBuffer;

/// Handle to a mesh resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

/// Handle to a material resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub u64);

/// Handle to a compiled shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderHandle(pub u64);

/// Handle to a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

/// Uniform value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    /// Signed integer
    Int(i32),
    /// Scalar
    Float(f32),
    /// Three-component vector
    Vec3(Vec3),
    /// Column-major 4x4 matrix
    Mat4(Mat4),
}

/// Line topology for debug geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Independent segments
    Lines,
    /// Connected polyline
    LineStrip,
}

/// Parameters for the procedural sky pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyDraw {
    /// Sky shader
    pub shader: ShaderHandle,
    /// Camera view-projection
    pub view_projection: Mat4,
    /// Camera world position, also the sky cube centre
    pub camera_position: Vec3,
    /// Current sun position
    pub sun_position: Vec3,
    /// Atmosphere height above the ground plane
    pub atmosphere_height: f32,
    /// Edge length of the sky cube
    pub cube_size: f32,
}

/// Parameters for the ground grid pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDraw {
    /// Grid shader
    pub shader: ShaderHandle,
    /// Camera view-projection
    pub view_projection: Mat4,
    /// Position the grid follows
    pub target_position: Vec3,
    /// Half extent of the grid
    pub grid_size: f32,
    /// Edge length of a cell
    pub cell_size: f32,
    /// Major line every `cell_gap` cells
    pub cell_gap: f32,
    /// Major line color
    pub color: Vec3,
    /// Minor line color
    pub sub_color: Vec3,
}

/// Rendering backend used by the scene
pub trait RenderBackend {
    /// Make `shader` current for the following uniforms and draws
    fn bind_shader(&mut self, shader: ShaderHandle);

    /// Set a uniform on the bound shader
    fn set_uniform(&mut self, name: &str, value: Uniform);

    /// Upload the packed light array for this frame
    fn upload_lights(&mut self, lights: &LightBuffer);

    /// Bind a material's textures and constants
    fn bind_material(&mut self, material: MaterialHandle);

    /// Draw a mesh with the bound shader and material
    fn draw_mesh(&mut self, mesh: MeshHandle);

    /// Draw debug lines
    fn draw_lines(&mut self, primitive: Primitive, vertices: &[Vec3], indices: Option<&[u16]>);

    /// Draw a unit quad in the XY plane textured with `texture`
    fn draw_sprite(&mut self, texture: TextureHandle);

    /// Draw the sky cube
    fn draw_sky(&mut self, sky: &SkyDraw);

    /// Draw the ground grid
    fn draw_grid(&mut self, grid: &GridDraw);
}
