//! Headless command recording
//!
//! [`CommandRecorder`] implements [`RenderBackend`] by appending every call
//! to a list. Hosts without a GPU, the demo binary and the tests render
//! through it and inspect what was drawn.

use crate::foundation::math::{Mat4, Vec3};
use super::backend::{
    GridDraw, MaterialHandle, MeshHandle, Primitive, RenderBackend, ShaderHandle, SkyDraw, TextureHandle,
    Uniform,
};
use super::lighting::LightBuffer;

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Shader bound
    BindShader(ShaderHandle),
    /// Uniform set on the bound shader
    SetUniform {
        /// Uniform name
        name: String,
        /// Value
        value: Uniform,
    },
    /// Light buffer uploaded
    UploadLights {
        /// Number of packed lights
        count: u32,
    },
    /// Material bound
    BindMaterial(MaterialHandle),
    /// Mesh drawn
    DrawMesh(MeshHandle),
    /// Debug lines drawn
    DrawLines {
        /// Topology
        primitive: Primitive,
        /// Vertices submitted
        vertices: Vec<Vec3>,
        /// Indices submitted, if any
        index_count: usize,
    },
    /// Textured quad drawn
    DrawSprite(TextureHandle),
    /// Sky pass
    DrawSky(SkyDraw),
    /// Grid pass
    DrawGrid(GridDraw),
}

/// Backend that records calls instead of executing them
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    lights: Option<LightBuffer>,
}

impl CommandRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in call order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget recorded calls, typically between frames
    pub fn clear(&mut self) {
        self.commands.clear();
        self.lights = None;
    }

    /// Last uploaded light buffer
    pub fn lights(&self) -> Option<&LightBuffer> {
        self.lights.as_ref()
    }

    /// Meshes drawn, in order
    pub fn drawn_meshes(&self) -> Vec<MeshHandle> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::DrawMesh(mesh) => Some(*mesh),
                _ => None,
            })
            .collect()
    }

    /// Number of draws of any kind
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    DrawCommand::DrawMesh(_)
                        | DrawCommand::DrawLines { .. }
                        | DrawCommand::DrawSprite(_)
                        | DrawCommand::DrawSky(_)
                        | DrawCommand::DrawGrid(_)
                )
            })
            .count()
    }

    /// Every matrix set under `name`, in order
    pub fn matrices_named(&self, name: &str) -> Vec<Mat4> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::SetUniform { name: n, value: Uniform::Mat4(m) } if n == name => Some(*m),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for CommandRecorder {
    fn bind_shader(&mut self, shader: ShaderHandle) {
        self.commands.push(DrawCommand::BindShader(shader));
    }

    fn set_uniform(&mut self, name: &str, value: Uniform) {
        self.commands.push(DrawCommand::SetUniform {
            name: name.to_string(),
            value,
        });
    }

    fn upload_lights(&mut self, lights: &LightBuffer) {
        self.commands.push(DrawCommand::UploadLights { count: lights.count() });
        self.lights = Some(lights.clone());
    }

    fn bind_material(&mut self, material: MaterialHandle) {
        self.commands.push(DrawCommand::BindMaterial(material));
    }

    fn draw_mesh(&mut self, mesh: MeshHandle) {
        self.commands.push(DrawCommand::DrawMesh(mesh));
    }

    fn draw_lines(&mut self, primitive: Primitive, vertices: &[Vec3], indices: Option<&[u16]>) {
        self.commands.push(DrawCommand::DrawLines {
            primitive,
            vertices: vertices.to_vec(),
            index_count: indices.map_or(0, <[u16]>::len),
        });
    }

    fn draw_sprite(&mut self, texture: TextureHandle) {
        self.commands.push(DrawCommand::DrawSprite(texture));
    }

    fn draw_sky(&mut self, sky: &SkyDraw) {
        self.commands.push(DrawCommand::DrawSky(*sky));
    }

    fn draw_grid(&mut self, grid: &GridDraw) {
        self.commands.push(DrawCommand::DrawGrid(*grid));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_call_order() {
        let mut recorder = CommandRecorder::new();
        recorder.bind_shader(ShaderHandle(1));
        recorder.set_uniform("Model", Uniform::Mat4(Mat4::identity()));
        recorder.draw_mesh(MeshHandle(7));
        recorder.draw_lines(Primitive::Lines, &[Vec3::zeros(), Vec3::x()], Some(&[0, 1]));

        assert_eq!(recorder.commands()[0], DrawCommand::BindShader(ShaderHandle(1)));
        assert_eq!(recorder.drawn_meshes(), vec![MeshHandle(7)]);
        assert_eq!(recorder.draw_count(), 2);
        assert_eq!(recorder.matrices_named("Model"), vec![Mat4::identity()]);

        recorder.clear();
        assert!(recorder.commands().is_empty());
    }
}
