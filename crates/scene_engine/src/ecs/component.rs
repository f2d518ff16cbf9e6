//! Component trait and kinds
//!
//! Components are boxed trait objects stored on their entity, one per
//! [`ComponentKind`]. Lifecycle hooks receive the whole [`Scene`] mutably;
//! the scene detaches the component from its slot for the duration of the
//! call, so a hook may freely create entities, add siblings or query other
//! components.

use std::any::Any;
use std::fmt;

use crate::assets::LoadedAsset;
use crate::editor::{PropertyEntry, PropertyValue};
use crate::foundation::collections::EntityId;
use crate::render::{LightSource, Renderer};
use crate::scene::{Scene, SceneError};

/// Closed set of component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Perspective camera
    Camera,
    /// Keyboard and pointer driven fly movement
    Movement,
    /// Velocity integration with drag and gravity
    RigidBody,
    /// Sphere for the collision pass
    SphereCollider,
    /// Omnidirectional light
    PointLight,
    /// Parallel light along the entity's forward axis
    DirectionalLight,
    /// Cone light along the entity's forward axis
    SpotLight,
    /// Ambient light from the sky model
    GlobalIllumination,
    /// Directional light following the sky's sun
    Sun,
    /// Loaded mesh
    MeshRenderer,
    /// Line strip through a spline
    SplineRenderer,
    /// Camera-independent textured quad
    SpriteRenderer,
    /// Debug box around a sibling renderer
    BoundingBoxRenderer,
    /// Ground grid drawn by the camera
    GridRenderer,
    /// Procedural sky drawn by the camera
    SkyRenderer,
    /// Distance fog parameters
    Fog,
    /// Cubic Bézier spline data
    Spline,
    /// Debug line along a ray
    RayRenderer,
    /// Noise heightfield feeding a mesh renderer
    Terrain,
}

impl ComponentKind {
    /// Every kind, in declaration order
    pub const ALL: [Self; 19] = [
        Self::Camera,
        Self::Movement,
        Self::RigidBody,
        Self::SphereCollider,
        Self::PointLight,
        Self::DirectionalLight,
        Self::SpotLight,
        Self::GlobalIllumination,
        Self::Sun,
        Self::MeshRenderer,
        Self::SplineRenderer,
        Self::SpriteRenderer,
        Self::BoundingBoxRenderer,
        Self::GridRenderer,
        Self::SkyRenderer,
        Self::Fog,
        Self::Spline,
        Self::RayRenderer,
        Self::Terrain,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Camera => "Camera",
            Self::Movement => "Movement",
            Self::RigidBody => "RigidBody",
            Self::SphereCollider => "SphereCollider",
            Self::PointLight => "PointLight",
            Self::DirectionalLight => "DirectionalLight",
            Self::SpotLight => "SpotLight",
            Self::GlobalIllumination => "GlobalIllumination",
            Self::Sun => "Sun",
            Self::MeshRenderer => "MeshRenderer",
            Self::SplineRenderer => "SplineRenderer",
            Self::SpriteRenderer => "SpriteRenderer",
            Self::BoundingBoxRenderer => "BoundingBoxRenderer",
            Self::GridRenderer => "GridRenderer",
            Self::SkyRenderer => "SkyRenderer",
            Self::Fog => "Fog",
            Self::Spline => "Spline",
            Self::RayRenderer => "RayRenderer",
            Self::Terrain => "Terrain",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State shared by every component
#[derive(Debug, Clone)]
pub struct ComponentBase {
    owner: EntityId,
    enabled: bool,
    serial: u64,
}

impl Default for ComponentBase {
    fn default() -> Self {
        Self {
            owner: EntityId::default(),
            enabled: true,
            serial: 0,
        }
    }
}

impl ComponentBase {
    /// Entity the component is attached to
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Whether hooks and capabilities are active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the component
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Scene-unique number distinguishing this instance from replacements
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub(crate) fn bind(&mut self, owner: EntityId, serial: u64) {
        self.owner = owner;
        self.serial = serial;
    }
}

/// Weak reference to a component instance.
///
/// Resolving fails once the entity is deleted or the component replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    /// Owning entity
    pub entity: EntityId,
    /// Component kind
    pub kind: ComponentKind,
    /// Instance serial
    pub serial: u64,
}

/// Upcast helper implemented for every `'static` type
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;

    /// Borrow mutably as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour attached to an entity
#[allow(unused_variables)]
pub trait Component: AsAny {
    /// Kind of this component
    fn kind(&self) -> ComponentKind;

    /// Shared state
    fn base(&self) -> &ComponentBase;

    /// Shared state, mutably
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Called once after the component is bound to its entity.
    ///
    /// An error aborts the add and the component is dropped.
    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        Ok(())
    }

    /// Called once per frame while enabled and the entity is active
    fn update(&mut self, scene: &mut Scene) {}

    /// Called once per fixed step while enabled and the entity is active
    fn fixed_update(&mut self, scene: &mut Scene) {}

    /// Called when the component is replaced or its entity deleted
    fn delete(&mut self, scene: &mut Scene) {}

    /// Called after an inspector wrote `property`
    fn on_property_changed(&mut self, scene: &mut Scene, property: &str) {}

    /// Called with the result of a load this component queued
    fn on_asset_loaded(&mut self, scene: &mut Scene, asset: LoadedAsset) {}

    /// Property rows with current values
    fn properties(&self) -> Vec<PropertyEntry> {
        Vec::new()
    }

    /// Write a property value
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        Err(SceneError::UnknownProperty {
            kind: self.kind(),
            property: name.to_string(),
        })
    }

    /// Renderer capability
    fn as_renderer(&self) -> Option<&dyn Renderer> {
        None
    }

    /// Light capability
    fn as_light(&self) -> Option<&dyn LightSource> {
        None
    }
}

impl<'a> dyn Component + 'a {
    /// Downcast to a concrete component
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast mutably to a concrete component
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Owning entity
    pub fn owner(&self) -> EntityId {
        self.base().owner()
    }

    /// Whether the component is enabled
    pub fn is_enabled(&self) -> bool {
        self.base().is_enabled()
    }

    /// Weak handle to this instance
    pub fn handle(&self) -> ComponentHandle {
        ComponentHandle {
            entity: self.base().owner(),
            kind: self.kind(),
            serial: self.base().serial(),
        }
    }
}

/// Components the scene can construct by type
pub trait ComponentType: Component + Default {
    /// Kind of every instance
    const KIND: ComponentKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Dummy {
        base: ComponentBase,
    }

    impl Component for Dummy {
        fn kind(&self) -> ComponentKind {
            ComponentKind::Fog
        }

        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let mut boxed: Box<dyn Component> = Box::new(Dummy::default());
        boxed.base_mut().bind(EntityId::default(), 7);
        let component: &dyn Component = boxed.as_ref();
        assert!(component.downcast_ref::<Dummy>().is_some());
        assert_eq!(component.handle().serial, 7);
        assert_eq!(component.handle().kind, ComponentKind::Fog);
    }

    #[test]
    fn test_kind_names_are_unique() {
        let mut names: Vec<_> = ComponentKind::ALL.iter().map(|kind| kind.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ComponentKind::ALL.len());
    }
}
