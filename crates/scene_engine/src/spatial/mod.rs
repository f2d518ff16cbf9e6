//! Spatial primitives
//!
//! Local-space bounding boxes and the rays used for picking.

mod bounding_box;
mod ray;

pub use bounding_box::{BoundingBox, EDGE_INDICES};
pub use ray::{Ray, RayHit};
