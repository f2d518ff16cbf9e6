//! Entity implementation
//!
//! An entity is a named transform with an insertion-ordered set of component
//! slots, at most one per [`ComponentKind`]. Entities are created and
//! destroyed through the [`crate::scene::Scene`], which owns the lifecycle.

use crate::foundation::collections::{EntityId, TransformId};
use super::component::{Component, ComponentKind, ComponentType};

struct ComponentSlot {
    kind: ComponentKind,
    component: Option<Box<dyn Component>>,
}

/// A named object in the scene
pub struct Entity {
    id: u64,
    key: EntityId,
    name: String,
    transform: TransformId,
    slots: Vec<ComponentSlot>,
    renderer: Option<ComponentKind>,
    active: bool,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("components", &self.component_kinds().collect::<Vec<_>>())
            .field("active", &self.active)
            .finish()
    }
}

impl Entity {
    pub(crate) fn new(id: u64, key: EntityId, name: String, transform: TransformId) -> Self {
        Self {
            id,
            key,
            name,
            transform,
            slots: Vec::new(),
            renderer: None,
            active: true,
        }
    }

    /// Monotonic scene-unique id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Generational handle of this entity
    pub fn key(&self) -> EntityId {
        self.key
    }

    /// Display name, not necessarily unique
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Transform node owned by this entity
    pub fn transform(&self) -> TransformId {
        self.transform
    }

    /// Whether the entity updates and renders
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Kind of the component that draws this entity
    pub fn renderer_kind(&self) -> Option<ComponentKind> {
        self.renderer
    }

    /// The renderer component, when attached and not detached for a hook
    pub fn renderer(&self) -> Option<&dyn Component> {
        self.renderer.and_then(|kind| self.component(kind))
    }

    /// Kinds of attached components, in insertion order
    pub fn component_kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.slots.iter().map(|slot| slot.kind)
    }

    /// Whether a component of `kind` is attached
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.slots.iter().any(|slot| slot.kind == kind)
    }

    /// Borrow the component of `kind`
    pub fn component(&self, kind: ComponentKind) -> Option<&dyn Component> {
        self.slots
            .iter()
            .find(|slot| slot.kind == kind)
            .and_then(|slot| slot.component.as_deref())
    }

    /// Borrow the component of `kind` mutably
    pub fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut (dyn Component + 'static)> {
        self.slots
            .iter_mut()
            .find(|slot| slot.kind == kind)
            .and_then(|slot| slot.component.as_deref_mut())
    }

    /// Borrow a component by type
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.component(T::KIND)?.downcast_ref::<T>()
    }

    /// Borrow a component mutably by type
    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.component_mut(T::KIND)?.downcast_mut::<T>()
    }

    /// Attached components, in insertion order
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> + '_ {
        self.slots.iter().filter_map(|slot| slot.component.as_deref())
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot_enabled(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .and_then(|slot| slot.component.as_deref())
            .is_some_and(|component| component.base().is_enabled())
    }

    /// Take the component at `index` out of its slot, leaving the slot in place
    pub(crate) fn take_slot(&mut self, index: usize) -> Option<Box<dyn Component>> {
        self.slots.get_mut(index)?.component.take()
    }

    /// Take the component of `kind` out of its slot, leaving the slot in place
    pub(crate) fn take_kind(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        self.slots
            .iter_mut()
            .find(|slot| slot.kind == kind)?
            .component
            .take()
    }

    /// Put a detached component back into its vacant slot.
    ///
    /// Fails, handing the component back, when the slot was removed or
    /// refilled while it was detached.
    pub(crate) fn restore(&mut self, component: Box<dyn Component>) -> Result<(), Box<dyn Component>> {
        let kind = component.kind();
        match self.slots.iter_mut().find(|slot| slot.kind == kind) {
            Some(slot) if slot.component.is_none() => {
                slot.component = Some(component);
                Ok(())
            }
            _ => Err(component),
        }
    }

    /// Store a component in its kind's slot, returning any previous occupant.
    ///
    /// A new kind is appended; an existing kind keeps its position.
    pub(crate) fn insert(&mut self, component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        let kind = component.kind();
        if self.renderer.is_none() && component.as_renderer().is_some() {
            self.renderer = Some(kind);
        }
        match self.slots.iter_mut().find(|slot| slot.kind == kind) {
            Some(slot) => slot.component.replace(component),
            None => {
                self.slots.push(ComponentSlot {
                    kind,
                    component: Some(component),
                });
                None
            }
        }
    }

    /// Remove the slot of `kind` entirely
    pub(crate) fn remove(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        let index = self.slots.iter().position(|slot| slot.kind == kind)?;
        let removed = self.slots.remove(index).component;
        if self.renderer == Some(kind) {
            // Fall back to the next renderer in insertion order.
            self.renderer = self
                .slots
                .iter()
                .filter_map(|slot| slot.component.as_deref())
                .find(|component| component.as_renderer().is_some())
                .map(|component| component.kind());
        }
        removed
    }

    /// Empty every slot, returning the components in insertion order
    pub(crate) fn drain(&mut self) -> Vec<Box<dyn Component>> {
        self.renderer = None;
        self.slots
            .drain(..)
            .filter_map(|slot| slot.component)
            .collect()
    }
}
