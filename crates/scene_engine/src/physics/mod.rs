//! Physics module for collision detection and response
//!
//! Rigid-body integration lives on the [`crate::ecs::components::RigidBody`]
//! component; this module holds the scene-wide sphere collision pass that
//! runs after it on every fixed step.

pub mod collision;

pub use collision::{resolve_overlaps, separate, BoundingSphere, SphereBody};
