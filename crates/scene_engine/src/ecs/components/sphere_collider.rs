//! Sphere collider

use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::scene::{Scene, SceneError};

/// Sphere around the owning entity's world position.
///
/// Registered with the scene while alive; the fixed-step collision pass
/// pushes overlapping spheres apart.
#[derive(Debug, Clone)]
pub struct SphereCollider {
    base: ComponentBase,
    /// Sphere radius in world units
    pub radius: f32,
}

impl Default for SphereCollider {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            radius: 1.0,
        }
    }
}

const PROPERTIES: &[Property<SphereCollider>] = &[Property {
    name: "radius",
    editor: EditorKind::Number { min: Some(0.0), max: None },
    get: |c| PropertyValue::Number(c.radius),
    set: |c, v| v.as_number().map(|n| c.radius = n).is_some(),
}];

impl Component for SphereCollider {
    fn kind(&self) -> ComponentKind {
        ComponentKind::SphereCollider
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.add_collider((&*self as &dyn Component).handle());
        Ok(())
    }

    fn delete(&mut self, scene: &mut Scene) {
        scene.remove_collider(&(&*self as &dyn Component).handle());
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::SphereCollider, self, name, value)
    }
}

impl ComponentType for SphereCollider {
    const KIND: ComponentKind = ComponentKind::SphereCollider;
}
