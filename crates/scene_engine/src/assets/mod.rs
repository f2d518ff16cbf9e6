//! Asset access
//!
//! Parsing model and image files is the host's business. The scene only sees
//! an [`AssetSource`] that turns paths and names into backend handles, plus a
//! queue of [`PendingLoad`]s whose results are delivered to the requesting
//! component at the start of the next update.

use std::collections::HashMap;

use crate::ecs::component::ComponentHandle;
use crate::foundation::color::Color;
use crate::foundation::math::{Vec2, Vec3};
use crate::render::{MaterialHandle, MeshHandle, ShaderHandle, TextureHandle};
use crate::spatial::BoundingBox;

/// Shader names every scene expects to resolve
pub const BUILTIN_SHADERS: [&str; 6] = ["phong", "pbr", "sky", "grid", "ray", "sprite"];

/// One drawable piece of a model
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    /// Geometry
    pub mesh: MeshHandle,
    /// Material bound before drawing
    pub material: MaterialHandle,
    /// Local bounds of this piece
    pub bounding_box: BoundingBox,
}

/// A loaded model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    /// Drawable pieces in file order
    pub parts: Vec<MeshPart>,
}

impl ModelData {
    /// Bounds of every part merged
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bounds = BoundingBox::initial();
        for part in &self.parts {
            bounds.merge(&part.bounding_box);
        }
        bounds
    }
}

/// Triangle-list geometry built on the CPU, three vertices per triangle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Name reported back with the uploaded model
    pub name: String,
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Per-vertex normals
    pub normals: Vec<Vec3>,
    /// Texture coordinates
    pub uvs: Vec<Vec2>,
    /// Per-vertex colors
    pub colors: Vec<Color>,
    /// Bounds of the positions
    pub bounding_box: BoundingBox,
}

impl MeshData {
    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Append one vertex
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2, color: Color) {
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.colors.push(color);
    }
}

/// Something a component asked to load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    /// Model file
    Model(String),
    /// Generated geometry to upload, answered as a model
    Mesh(MeshData),
    /// Shader program by name
    Shader(String),
    /// Texture file
    Texture(String),
}

/// Result of a load, delivered to the requesting component
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedAsset {
    /// Model, `None` when the path didn't resolve
    Model {
        /// Requested path
        path: String,
        /// Loaded data
        model: Option<ModelData>,
    },
    /// Shader, `None` when the name didn't resolve
    Shader {
        /// Requested name
        name: String,
        /// Program handle
        shader: Option<ShaderHandle>,
    },
    /// Texture, `None` when the path didn't resolve
    Texture {
        /// Requested path
        path: String,
        /// Texture handle
        texture: Option<TextureHandle>,
    },
}

/// A queued load and the component waiting for it
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLoad {
    /// Component to deliver the result to, if it still exists
    pub target: ComponentHandle,
    /// What to load
    pub request: LoadRequest,
}

/// Provider of backend resources
pub trait AssetSource {
    /// Load a model by path
    fn load_model(&mut self, path: &str) -> Option<ModelData>;

    /// Look up a shader program by name
    fn load_shader(&mut self, name: &str) -> Option<ShaderHandle>;

    /// Load a texture by path
    fn load_texture(&mut self, path: &str) -> Option<TextureHandle>;

    /// Upload generated geometry as a single-part model.
    ///
    /// Sources without a GPU behind them keep the default, which uploads
    /// nothing.
    fn upload_mesh(&mut self, mesh: &MeshData) -> Option<ModelData> {
        log::debug!("No mesh upload for '{}'", mesh.name);
        None
    }

    /// Resolve a queued request
    fn resolve(&mut self, request: &LoadRequest) -> LoadedAsset {
        match request {
            LoadRequest::Model(path) => LoadedAsset::Model {
                path: path.clone(),
                model: self.load_model(path),
            },
            LoadRequest::Mesh(mesh) => LoadedAsset::Model {
                path: mesh.name.clone(),
                model: self.upload_mesh(mesh),
            },
            LoadRequest::Shader(name) => LoadedAsset::Shader {
                name: name.clone(),
                shader: self.load_shader(name),
            },
            LoadRequest::Texture(path) => LoadedAsset::Texture {
                path: path.clone(),
                texture: self.load_texture(path),
            },
        }
    }
}

/// Asset source backed by registered entries
#[derive(Debug, Default)]
pub struct InMemoryAssets {
    models: HashMap<String, ModelData>,
    shaders: HashMap<String, ShaderHandle>,
    textures: HashMap<String, TextureHandle>,
    next_handle: u64,
}

impl InMemoryAssets {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source with the [`BUILTIN_SHADERS`] registered
    pub fn with_builtin_shaders() -> Self {
        let mut assets = Self::new();
        for name in BUILTIN_SHADERS {
            assets.register_shader(name);
        }
        assets
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Register a shader name, returning its handle
    pub fn register_shader(&mut self, name: &str) -> ShaderHandle {
        if let Some(handle) = self.shaders.get(name) {
            return *handle;
        }
        let handle = ShaderHandle(self.next());
        self.shaders.insert(name.to_string(), handle);
        handle
    }

    /// Register a texture path, returning its handle
    pub fn register_texture(&mut self, path: &str) -> TextureHandle {
        if let Some(handle) = self.textures.get(path) {
            return *handle;
        }
        let handle = TextureHandle(self.next());
        self.textures.insert(path.to_string(), handle);
        handle
    }

    /// Register a model under `path`
    pub fn insert_model(&mut self, path: &str, model: ModelData) {
        self.models.insert(path.to_string(), model);
    }

    /// Register a single-part model with fresh handles and the given bounds
    pub fn insert_box_model(&mut self, path: &str, bounds: BoundingBox) -> ModelData {
        let model = ModelData {
            parts: vec![MeshPart {
                mesh: MeshHandle(self.next()),
                material: MaterialHandle(self.next()),
                bounding_box: bounds,
            }],
        };
        self.insert_model(path, model.clone());
        model
    }
}

impl AssetSource for InMemoryAssets {
    fn load_model(&mut self, path: &str) -> Option<ModelData> {
        self.models.get(path).cloned()
    }

    fn load_shader(&mut self, name: &str) -> Option<ShaderHandle> {
        self.shaders.get(name).copied()
    }

    fn load_texture(&mut self, path: &str) -> Option<TextureHandle> {
        self.textures.get(path).copied()
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> Option<ModelData> {
        if mesh.triangle_count() == 0 {
            return None;
        }
        Some(ModelData {
            parts: vec![MeshPart {
                mesh: MeshHandle(self.next()),
                material: MaterialHandle(self.next()),
                bounding_box: mesh.bounding_box,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_bounds_merge_parts() {
        let mut assets = InMemoryAssets::new();
        let mut model = assets.insert_box_model("a.obj", BoundingBox::new(Vec3::zeros(), Vec3::repeat(1.0)));
        model.parts.push(MeshPart {
            mesh: MeshHandle(99),
            material: MaterialHandle(100),
            bounding_box: BoundingBox::new(Vec3::repeat(-2.0), Vec3::zeros()),
        });
        let bounds = model.bounding_box();
        assert_eq!(bounds.min, Vec3::repeat(-2.0));
        assert_eq!(bounds.max, Vec3::repeat(1.0));
    }

    #[test]
    fn test_resolve_reports_missing_entries() {
        let mut assets = InMemoryAssets::with_builtin_shaders();
        let shader = assets.resolve(&LoadRequest::Shader("sky".to_string()));
        assert!(matches!(shader, LoadedAsset::Shader { shader: Some(_), .. }));

        let model = assets.resolve(&LoadRequest::Model("missing.obj".to_string()));
        assert_eq!(
            model,
            LoadedAsset::Model { path: "missing.obj".to_string(), model: None }
        );
    }

    #[test]
    fn test_generated_meshes_upload_as_models() {
        let mut assets = InMemoryAssets::new();
        let mut mesh = MeshData {
            name: "tri".to_string(),
            ..MeshData::default()
        };
        let empty = assets.resolve(&LoadRequest::Mesh(mesh.clone()));
        assert_eq!(empty, LoadedAsset::Model { path: "tri".to_string(), model: None });

        for position in [Vec3::zeros(), Vec3::x(), Vec3::z()] {
            mesh.push_vertex(position, Vec3::y(), Vec2::zeros(), Vec3::repeat(1.0));
        }
        mesh.bounding_box = BoundingBox::from_points(&mesh.positions);
        let LoadedAsset::Model { model: Some(model), .. } = assets.resolve(&LoadRequest::Mesh(mesh)) else {
            panic!("mesh was not uploaded");
        };
        assert_eq!(model.parts.len(), 1);
        assert_eq!(model.bounding_box().max, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_handles_are_stable_per_name() {
        let mut assets = InMemoryAssets::new();
        let first = assets.register_shader("pbr");
        assert_eq!(assets.register_shader("pbr"), first);
        assert_ne!(assets.register_shader("phong"), first);
    }
}
