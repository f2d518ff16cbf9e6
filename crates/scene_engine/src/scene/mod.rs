//! Scene management
//!
//! The [`Scene`] owns entities and their transforms and drives the frame:
//! asset-load delivery, fixed steps with the collision pass, per-frame
//! updates, rendering and picking.
//!
//! ## Layout
//!
//! ```text
//! Scene
//!  ├─ entities (slotmap) + flat list of roots
//!  ├─ TransformArena (parent/child links by id)
//!  ├─ light and collider registries (component handles)
//!  └─ Time, InputState, SceneSettings, pending loads
//! ```
//!
//! Scenes can be written by hand or built from a [`SceneDescription`].

mod context;
mod error;
pub mod loader;
#[allow(clippy::module_inception)]
mod scene;
pub mod transform;

pub use context::{RayCastContext, RenderingContext};
pub use error::SceneError;
pub use loader::{ComponentDescription, EntityDescription, SceneDescription, TransformDescription};
pub use scene::Scene;
pub use transform::{TransformArena, TransformNode};
