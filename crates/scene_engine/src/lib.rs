//! # Scene Engine
//!
//! The scene core of a small real-time 3D renderer: entities with boxed
//! components, a transform hierarchy stored in an arena, a sphere collision
//! pass on a fixed clock, packed light uploads and ray picking. Drawing goes
//! through the [`render::RenderBackend`] trait, so the core runs headless.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! let mut scene = Scene::new("demo");
//! let camera = scene.create_entity("camera");
//! scene.add_component::<Camera>(camera)?;
//! scene.transform_mut(camera).unwrap().set_position(Vec3::new(0.0, 1.0, 5.0));
//!
//! let ball = scene.create_entity("ball");
//! scene.add_component::<SphereCollider>(ball)?;
//!
//! let mut backend = CommandRecorder::new();
//! scene.tick();
//! scene.render(&mut backend);
//! # Ok::<(), SceneError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod assets;
pub mod config;
pub mod ecs;
pub mod editor;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetSource, InMemoryAssets, LoadRequest, LoadedAsset, MeshData, ModelData},
        config::Config,
        core::config::{EngineConfig, SceneSettings, TimeConfig},
        ecs::{
            components::{
                BezierCurve, BoundingBoxRenderer, Camera, DirectionalLight, Fog, GlobalIllumination, GridRenderer,
                MeshRenderer, Movement, PointLight, RayRenderer, RigidBody, SkyRenderer, SphereCollider, Spline,
                SplineRenderer, SpotLight, SpriteRenderer, Sun, Terrain,
            },
            Component, ComponentHandle, ComponentKind, ComponentType, Entity,
        },
        foundation::{
            collections::{EntityId, TransformId},
            math::{Mat4, Quat, Vec2, Vec3},
            time::{Stopwatch, Time},
        },
        input::{InputState, KeyCode, MouseButton},
        render::{CommandRecorder, LightBuffer, RenderBackend, Renderer},
        scene::{Scene, SceneDescription, SceneError, TransformNode},
        spatial::{BoundingBox, Ray, RayHit},
    };
}
