//! Built-in components
//!
//! One module per component family. Every type here implements
//! [`crate::ecs::ComponentType`] so it can be added with
//! [`crate::scene::Scene::add_component`].

pub mod bounding_box_renderer;
pub mod camera;
pub mod fog;
pub mod grid;
pub mod lights;
pub mod mesh_renderer;
pub mod movement;
pub mod ray_renderer;
pub mod rigid_body;
pub mod sky;
pub mod sphere_collider;
pub mod spline;
pub mod spline_renderer;
pub mod sprite_renderer;
pub mod terrain;

pub use bounding_box_renderer::BoundingBoxRenderer;
pub use camera::Camera;
pub use fog::{Fog, FogFunction};
pub use grid::GridRenderer;
pub use lights::{DirectionalLight, GlobalIllumination, PointLight, SpotLight, Sun};
pub use mesh_renderer::MeshRenderer;
pub use movement::Movement;
pub use ray_renderer::RayRenderer;
pub use rigid_body::RigidBody;
pub use sky::{DaylightKeyframes, Keyframe, SkyModel, SkyRenderer, SunLight};
pub use sphere_collider::SphereCollider;
pub use spline::{BezierCurve, Spline};
pub use spline_renderer::SplineRenderer;
pub use sprite_renderer::SpriteRenderer;
pub use terrain::Terrain;
