//! Procedural heightfield terrain
//!
//! Samples [`Perlin`] noise over a `width` x `depth` vertex grid, builds a
//! flat-shaded triangle list and hands it to the [`MeshRenderer`] on the same
//! entity as a generated mesh. The renderer is added if missing.

use crate::assets::{LoadRequest, MeshData};
use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::color::Color;
use crate::foundation::math::{utils, Vec2, Vec3};
use crate::foundation::noise::Perlin;
use crate::scene::{Scene, SceneError};
use crate::spatial::BoundingBox;

use super::MeshRenderer;

/// Largest grid edge, in vertices
const MAX_GRID: f32 = 512.0;

/// Heightfield generator
#[derive(Debug, Clone)]
pub struct Terrain {
    base: ComponentBase,
    /// Generate as soon as the component is added
    pub generate_on_awake: bool,
    /// Regenerate whenever an inspector writes a property
    pub generate_on_property_write: bool,
    /// Peak displacement along +y
    pub height: f32,
    /// Vertices along x, at least 2
    pub width: u32,
    /// Vertices along z, at least 2
    pub depth: u32,
    /// Noise features per grid; smaller is rougher
    pub scale: f32,
    /// Shift of the sampled window in grid units
    pub offset: f32,
    /// Noise seed
    pub seed: u32,
    mesh: Option<MeshData>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            generate_on_awake: true,
            generate_on_property_write: true,
            height: 2.0,
            width: 10,
            depth: 10,
            scale: 1.0,
            offset: 0.0,
            seed: 0,
            mesh: None,
        }
    }
}

const PROPERTIES: &[Property<Terrain>] = &[
    Property {
        name: "generate_on_awake",
        editor: EditorKind::Boolean,
        get: |t| PropertyValue::Bool(t.generate_on_awake),
        set: |t, v| v.as_bool().map(|b| t.generate_on_awake = b).is_some(),
    },
    Property {
        name: "generate_on_property_write",
        editor: EditorKind::Boolean,
        get: |t| PropertyValue::Bool(t.generate_on_property_write),
        set: |t, v| v.as_bool().map(|b| t.generate_on_property_write = b).is_some(),
    },
    Property {
        name: "height",
        editor: EditorKind::NUMBER,
        get: |t| PropertyValue::Number(t.height),
        set: |t, v| v.as_number().map(|n| t.height = n).is_some(),
    },
    Property {
        name: "width",
        editor: EditorKind::Number { min: Some(2.0), max: Some(MAX_GRID) },
        get: |t| PropertyValue::Number(t.width as f32),
        set: |t, v| v.as_number().map(|n| t.width = n.round() as u32).is_some(),
    },
    Property {
        name: "depth",
        editor: EditorKind::Number { min: Some(2.0), max: Some(MAX_GRID) },
        get: |t| PropertyValue::Number(t.depth as f32),
        set: |t, v| v.as_number().map(|n| t.depth = n.round() as u32).is_some(),
    },
    Property {
        name: "scale",
        editor: EditorKind::Number { min: Some(0.01), max: None },
        get: |t| PropertyValue::Number(t.scale),
        set: |t, v| v.as_number().map(|n| t.scale = n).is_some(),
    },
    Property {
        name: "offset",
        editor: EditorKind::NUMBER,
        get: |t| PropertyValue::Number(t.offset),
        set: |t, v| v.as_number().map(|n| t.offset = n).is_some(),
    },
    Property {
        name: "seed",
        editor: EditorKind::Number { min: Some(0.0), max: None },
        get: |t| PropertyValue::Number(t.seed as f32),
        set: |t, v| v.as_number().map(|n| t.seed = n.round() as u32).is_some(),
    },
];

impl Terrain {
    /// Last generated geometry
    pub fn mesh(&self) -> Option<&MeshData> {
        self.mesh.as_ref()
    }

    fn triangle_normal(v0: &Vec3, v1: &Vec3, v2: &Vec3) -> Vec3 {
        utils::normalize_or_zero(&(v0 - v1).cross(&(v0 - v2)))
    }

    fn shade(&self, position: &Vec3) -> Color {
        let c = if self.height == 0.0 {
            0.5
        } else {
            position.y / self.height / 2.0 + 0.5
        };
        Vec3::new(c / 2.0, c, c / 2.0)
    }

    /// Build the triangle list without touching the scene.
    ///
    /// Grids smaller than 2x2 and non-positive scales give an empty mesh.
    pub fn build_mesh(&self, name: impl Into<String>) -> MeshData {
        let mut mesh = MeshData {
            name: name.into(),
            ..MeshData::default()
        };
        let (width, depth) = (self.width as usize, self.depth as usize);
        if width < 2 || depth < 2 || self.scale <= 0.0 {
            return mesh;
        }

        let perlin = Perlin::new(self.seed);
        let mut grid = Vec::with_capacity(width * depth);
        for y in 0..depth {
            for x in 0..width {
                let height = perlin.noise(
                    (x as f32 + self.offset) / (width as f32 * self.scale),
                    (y as f32 + self.offset) / (depth as f32 * self.scale),
                ) * self.height;
                grid.push(Vec3::new(x as f32, height, y as f32));
            }
        }
        mesh.bounding_box = BoundingBox::from_points(&grid);

        let last_x = (width - 1) as f32;
        let last_y = (depth - 1) as f32;
        for y0 in 0..depth - 1 {
            let y1 = y0 + 1;
            let v0 = y0 as f32 / last_y;
            let v1 = y1 as f32 / last_y;
            for x0 in 0..width - 1 {
                let x1 = x0 + 1;
                let u0 = 1.0 - x0 as f32 / last_x;
                let u1 = 1.0 - x1 as f32 / last_x;

                let p00 = grid[y0 * width + x0];
                let p10 = grid[y0 * width + x1];
                let p01 = grid[y1 * width + x0];
                let p11 = grid[y1 * width + x1];

                let n0 = Self::triangle_normal(&p10, &p00, &p01);
                for (position, uv) in [(p10, Vec2::new(u1, v0)), (p00, Vec2::new(u0, v0)), (p01, Vec2::new(u0, v1))] {
                    mesh.push_vertex(position, n0, uv, self.shade(&position));
                }
                let n1 = Self::triangle_normal(&p10, &p01, &p11);
                for (position, uv) in [(p10, Vec2::new(u1, v0)), (p01, Vec2::new(u0, v1)), (p11, Vec2::new(u1, v1))] {
                    mesh.push_vertex(position, n1, uv, self.shade(&position));
                }
            }
        }
        mesh
    }

    /// Rebuild the mesh and queue it for the sibling [`MeshRenderer`]
    pub fn generate(&mut self, scene: &mut Scene) {
        let owner = self.base.owner();
        let Some(entity) = scene.entity(owner) else {
            return;
        };
        let name = entity.name().to_string();
        let Some(target) = entity.get::<MeshRenderer>().map(|renderer| (renderer as &dyn Component).handle()) else {
            log::warn!("Terrain on '{}' has no MeshRenderer to feed", name);
            return;
        };

        let mesh = self.build_mesh(name);
        log::debug!(
            "Generated terrain '{}': {}x{} vertices, {} triangles",
            mesh.name,
            self.width,
            self.depth,
            mesh.triangle_count()
        );
        scene.request_load(target, LoadRequest::Mesh(mesh.clone()));
        self.mesh = Some(mesh);
    }
}

impl Component for Terrain {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Terrain
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let owner = self.base.owner();
        if scene.component::<MeshRenderer>(owner).is_none() {
            scene.add_component::<MeshRenderer>(owner)?;
        }
        if self.generate_on_awake {
            self.generate(scene);
        }
        Ok(())
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::Terrain, self, name, value)
    }

    fn on_property_changed(&mut self, scene: &mut Scene, _property: &str) {
        if self.generate_on_property_write {
            self.generate(scene);
        }
    }
}

impl ComponentType for Terrain {
    const KIND: ComponentKind = ComponentKind::Terrain;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssets;
    use crate::spatial::Ray;
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn terrain_scene() -> Scene {
        let mut scene = Scene::new("terrain");
        scene.set_asset_source(Box::new(InMemoryAssets::with_builtin_shaders()));
        scene
    }

    #[test]
    fn test_grid_triangulation() {
        let terrain = Terrain {
            width: 4,
            depth: 3,
            ..Terrain::default()
        };
        let mesh = terrain.build_mesh("grid");
        assert_eq!(mesh.triangle_count(), 3 * 2 * 2);
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert_eq!(mesh.positions.len(), mesh.uvs.len());
        assert_relative_eq!(mesh.bounding_box.min.x, 0.0);
        assert_relative_eq!(mesh.bounding_box.max.x, 3.0);
        assert_relative_eq!(mesh.bounding_box.max.z, 2.0);
        assert!(mesh.bounding_box.max.y.abs() <= terrain.height);
    }

    #[test]
    fn test_flat_terrain_faces_up() {
        let terrain = Terrain {
            height: 0.0,
            ..Terrain::default()
        };
        let mesh = terrain.build_mesh("flat");
        for normal in &mesh.normals {
            assert_relative_eq!(*normal, Vec3::y(), epsilon = 1e-6);
        }
        assert_relative_eq!(mesh.colors[0], Vec3::new(0.25, 0.5, 0.25));
    }

    #[test]
    fn test_degenerate_grid_is_empty() {
        let terrain = Terrain {
            width: 1,
            ..Terrain::default()
        };
        assert_eq!(terrain.build_mesh("line").triangle_count(), 0);
    }

    #[test]
    fn test_seed_and_offset_change_the_surface() {
        let base = Terrain::default().build_mesh("a");
        let seeded = Terrain { seed: 9, ..Terrain::default() }.build_mesh("b");
        let shifted = Terrain { offset: 0.5, ..Terrain::default() }.build_mesh("c");
        assert_ne!(base.positions, seeded.positions);
        assert_ne!(base.positions, shifted.positions);
    }

    #[test]
    fn test_awake_feeds_a_mesh_renderer() {
        let mut scene = terrain_scene();
        let entity = scene.create_entity("hills");
        scene.add_component::<Terrain>(entity).unwrap();
        assert!(scene.component::<MeshRenderer>(entity).is_some());
        assert_eq!(scene.entity(entity).unwrap().renderer_kind(), Some(ComponentKind::MeshRenderer));

        scene.update(Duration::ZERO);
        let renderer = scene.component::<MeshRenderer>(entity).unwrap();
        assert!(renderer.is_ready());
        let expected = scene.component::<Terrain>(entity).unwrap().mesh().unwrap().bounding_box;
        assert_eq!(renderer.parts()[0].bounding_box, expected);

        // Straight down onto the middle of the grid.
        let ray = Ray::new(Vec3::new(4.5, 50.0, 4.5), Vec3::new(0.0, -1.0, 0.0));
        let hit = scene.ray_cast(&ray).unwrap();
        assert_eq!(hit.entity, entity);
    }

    #[test]
    fn test_property_write_regenerates() {
        let mut scene = terrain_scene();
        let entity = scene.create_entity("hills");
        scene.add_component::<Terrain>(entity).unwrap();
        scene.update(Duration::ZERO);

        scene
            .set_component_property(entity, ComponentKind::Terrain, "width", PropertyValue::Number(20.0))
            .unwrap();
        let terrain = scene.component::<Terrain>(entity).unwrap();
        assert_eq!(terrain.mesh().unwrap().triangle_count(), 19 * 9 * 2);

        // The renderer receives the new geometry with the next update.
        scene.update(Duration::from_millis(16));
        let renderer = scene.component::<MeshRenderer>(entity).unwrap();
        assert_relative_eq!(renderer.parts()[0].bounding_box.max.x, 19.0);
    }

    #[test]
    fn test_property_write_can_skip_regeneration() {
        let mut scene = terrain_scene();
        let entity = scene.create_entity("hills");
        scene.add_component::<Terrain>(entity).unwrap().generate_on_property_write = false;
        scene.update(Duration::ZERO);

        scene
            .set_component_property(entity, ComponentKind::Terrain, "depth", PropertyValue::Number(30.0))
            .unwrap();
        scene.update(Duration::from_millis(16));
        let terrain = scene.component::<Terrain>(entity).unwrap();
        assert_eq!(terrain.depth, 30);
        assert_eq!(terrain.mesh().unwrap().triangle_count(), 9 * 9 * 2);
    }

    #[test]
    fn test_grid_size_is_clamped() {
        let mut terrain = Terrain::default();
        terrain.set_property("width", PropertyValue::Number(0.0)).unwrap();
        assert_eq!(terrain.width, 2);
    }
}
