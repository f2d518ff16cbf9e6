//! Entities and components
//!
//! An [`Entity`] is a named transform plus at most one component per
//! [`ComponentKind`]. Components are boxed [`Component`] trait objects with
//! lifecycle hooks; the built-in set lives in [`components`]. Capabilities
//! such as drawing or lighting are exposed through `as_renderer` and
//! `as_light` rather than type checks.

pub mod component;
pub mod components;
pub mod entity;

pub use component::{Component, ComponentBase, ComponentHandle, ComponentKind, ComponentType};
pub use entity::Entity;
