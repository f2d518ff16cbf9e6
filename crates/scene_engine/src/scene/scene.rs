//! The scene
//!
//! [`Scene`] owns every entity, the transform arena and the per-frame
//! services components talk to: clocks, input, settings, the light and
//! collider registries and the asset-load queue.
//!
//! ## Frame flow
//!
//! ```text
//! update(now)
//!   ├─ deliver pending asset loads
//!   ├─ fixed steps (bounded catch-up): fixed_update hooks, collision pass
//!   ├─ advance frame clock and day cycle
//!   ├─ camera switching keys
//!   └─ update hooks: active camera entity first, then the flat list
//! render(backend)
//!   ├─ pack and upload lights
//!   ├─ camera sky and grid
//!   └─ draw the flat list depth-first, excluding the camera entity
//! ```
//!
//! Hooks receive `&mut Scene`. The component being called is taken out of
//! its slot for the duration and put back afterwards; if the slot was removed
//! or refilled meanwhile, the detached instance is stale and gets its
//! `delete` hook instead.

use std::collections::VecDeque;
use std::time::Duration;

use crate::assets::{AssetSource, InMemoryAssets, LoadRequest, PendingLoad};
use crate::core::config::{DefaultShader, EngineConfig, SceneSettings};
use crate::ecs::component::{Component, ComponentHandle, ComponentKind, ComponentType};
use crate::ecs::components::{Camera, GridRenderer, MeshRenderer, Movement, SkyRenderer, SphereCollider};
use crate::ecs::entity::Entity;
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::collections::{EntityId, SlotMap, TransformId};
use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::foundation::time::{Stopwatch, Time};
use crate::input::{InputState, KeyCode};
use crate::physics::{self, SphereBody};
use crate::render::{LightBuffer, LightDescription, LightRegistry, RenderBackend};
use crate::spatial::{Ray, RayHit};

use super::context::{RayCastContext, RenderingContext};
use super::error::SceneError;
use super::transform::{TransformArena, TransformNode};

/// Default drawing surface size in pixels
const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1600.0, 900.0);

const DEFAULT_SHADERS: &[&str] = &["phong", "pbr"];

const SETTINGS: &[Property<SceneSettings>] = &[
    Property {
        name: "do_camera_switching",
        editor: EditorKind::Boolean,
        get: |s| PropertyValue::Bool(s.do_camera_switching),
        set: |s, v| v.as_bool().map(|b| s.do_camera_switching = b).is_some(),
    },
    Property {
        name: "do_render_sky",
        editor: EditorKind::Boolean,
        get: |s| PropertyValue::Bool(s.do_render_sky),
        set: |s, v| v.as_bool().map(|b| s.do_render_sky = b).is_some(),
    },
    Property {
        name: "do_render_grid",
        editor: EditorKind::Boolean,
        get: |s| PropertyValue::Bool(s.do_render_grid),
        set: |s, v| v.as_bool().map(|b| s.do_render_grid = b).is_some(),
    },
    Property {
        name: "render_bounding_boxes",
        editor: EditorKind::Boolean,
        get: |s| PropertyValue::Bool(s.render_bounding_boxes),
        set: |s, v| v.as_bool().map(|b| s.render_bounding_boxes = b).is_some(),
    },
    Property {
        name: "default_shader",
        editor: EditorKind::Select(DEFAULT_SHADERS),
        get: |s| {
            PropertyValue::Choice(match s.default_shader {
                DefaultShader::Phong => 0,
                DefaultShader::Pbr => 1,
            })
        },
        set: |s, v| {
            v.as_choice()
                .map(|index| {
                    s.default_shader = if index == 0 { DefaultShader::Phong } else { DefaultShader::Pbr };
                })
                .is_some()
        },
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Update,
    Fixed,
}

/// Entities, transforms and frame services
pub struct Scene {
    name: String,
    entities: SlotMap<EntityId, Entity>,
    order: Vec<EntityId>,
    transforms: TransformArena,
    next_entity_id: u64,
    next_serial: u64,
    active_camera: Option<ComponentHandle>,
    time: Time,
    settings: SceneSettings,
    lights: LightRegistry,
    light_buffer: LightBuffer,
    colliders: Vec<ComponentHandle>,
    pending_loads: VecDeque<PendingLoad>,
    assets: Box<dyn AssetSource>,
    input: InputState,
    clock: Stopwatch,
    viewport: Vec2,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("entities", &self.entities.len())
            .field("roots", &self.order.len())
            .field("lights", &self.lights.len())
            .field("colliders", &self.colliders.len())
            .field("pending_loads", &self.pending_loads.len())
            .finish()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Scene")
    }
}

impl Scene {
    /// Create an empty scene with the default configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &EngineConfig::default())
    }

    /// Create an empty scene from `config`.
    ///
    /// Assets resolve against [`InMemoryAssets::with_builtin_shaders`] until
    /// the host installs its own source.
    pub fn with_config(name: impl Into<String>, config: &EngineConfig) -> Self {
        Self {
            name: name.into(),
            entities: SlotMap::with_key(),
            order: Vec::new(),
            transforms: TransformArena::new(),
            next_entity_id: 0,
            next_serial: 0,
            active_camera: None,
            time: Time::new(&config.time),
            settings: config.settings.clone(),
            lights: LightRegistry::with_capacity(config.lighting.max_lights),
            light_buffer: LightBuffer::new(),
            colliders: Vec::new(),
            pending_loads: VecDeque::new(),
            assets: Box::new(InMemoryAssets::with_builtin_shaders()),
            input: InputState::new(),
            clock: Stopwatch::start_new(),
            viewport: DEFAULT_VIEWPORT,
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the asset source used for queued loads
    pub fn set_asset_source(&mut self, assets: Box<dyn AssetSource>) {
        self.assets = assets;
    }

    // ---------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------

    /// Create an entity with an identity transform at the end of the flat list
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.create_entity_with_transform(name, TransformNode::default())
    }

    /// Create an entity owning `transform`
    pub fn create_entity_with_transform(&mut self, name: impl Into<String>, transform: TransformNode) -> EntityId {
        let transform = self.transforms.insert(transform);
        self.next_entity_id += 1;
        let id = self.next_entity_id;
        let name = name.into();
        let entity = self
            .entities
            .insert_with_key(|key| Entity::new(id, key, name, transform));
        self.transforms.set_owner(transform, entity);
        self.order.push(entity);
        log::debug!("Created entity #{} '{}'", id, self.entities[entity].name());
        entity
    }

    /// Create an entity with a [`MeshRenderer`] loading `path`
    pub fn load_entity(&mut self, name: impl Into<String>, path: impl Into<String>) -> Result<EntityId, SceneError> {
        let entity = self.create_entity(name);
        self.add_component::<MeshRenderer>(entity)?;
        let path = path.into();
        self.with_component::<MeshRenderer, _>(entity, |renderer, scene| renderer.load(scene, path));
        Ok(entity)
    }

    /// Borrow an entity
    pub fn entity(&self, entity: EntityId) -> Option<&Entity> {
        self.entities.get(entity)
    }

    /// Borrow an entity mutably
    pub fn entity_mut(&mut self, entity: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(entity)
    }

    /// Whether `entity` is live
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities, parented or not
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities in the flat list, in insertion order
    pub fn root_entities(&self) -> &[EntityId] {
        &self.order
    }

    /// Oldest entity called `name`
    pub fn find_entity(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.name() == name)
            .min_by_key(|(_, entity)| entity.id())
            .map(|(key, _)| key)
    }

    /// Activate or deactivate an entity and its subtree
    pub fn set_entity_active(&mut self, entity: EntityId, active: bool) -> Result<(), SceneError> {
        self.entities
            .get_mut(entity)
            .ok_or(SceneError::EntityNotFound)?
            .set_active(active);
        Ok(())
    }

    /// Parent `child` under `parent`.
    ///
    /// The child leaves the flat list and is reached through its parent from
    /// then on.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        let parent_transform = self.transform_id(parent).ok_or(SceneError::EntityNotFound)?;
        let child_transform = self.transform_id(child).ok_or(SceneError::EntityNotFound)?;
        if !self.transforms.add_child(parent_transform, child_transform) {
            return Err(SceneError::InvalidParent);
        }
        self.remove_from_scene(child);
        Ok(())
    }

    /// Detach `child` from its parent and append it to the flat list
    pub fn unparent(&mut self, child: EntityId) -> Result<(), SceneError> {
        let transform = self.transform_id(child).ok_or(SceneError::EntityNotFound)?;
        self.transforms.detach(transform);
        if !self.order.contains(&child) {
            self.order.push(child);
        }
        Ok(())
    }

    /// Drop `entity` from the flat list without deleting it
    pub fn remove_from_scene(&mut self, entity: EntityId) -> bool {
        let before = self.order.len();
        self.order.retain(|&id| id != entity);
        before != self.order.len()
    }

    /// Delete `entity` and every entity parented under it.
    ///
    /// Each component's `delete` hook runs first, so registries never keep
    /// handles to a deleted entity. Returns `false` for a stale handle.
    pub fn delete_entity(&mut self, entity: EntityId) -> bool {
        let Some(record) = self.entities.get_mut(entity) else {
            return false;
        };
        record.set_active(false);
        let transform = record.transform();
        let components = record.drain();
        log::debug!("Deleting entity #{} '{}'", record.id(), record.name());

        for mut component in components {
            component.delete(self);
        }
        for child in self.child_entities(entity) {
            self.delete_entity(child);
        }

        self.order.retain(|&id| id != entity);
        self.transforms.remove(transform);
        self.entities.remove(entity);
        if self.active_camera.is_some_and(|handle| handle.entity == entity) {
            self.active_camera = None;
        }
        true
    }

    /// Delete every entity
    pub fn clear(&mut self) {
        let entities: Vec<EntityId> = self.entities.keys().collect();
        for entity in entities {
            self.delete_entity(entity);
        }
        self.pending_loads.clear();
        log::info!("Cleared scene '{}'", self.name);
    }

    fn child_entities(&self, entity: EntityId) -> Vec<EntityId> {
        self.transform_id(entity)
            .and_then(|id| self.transforms.get(id))
            .map(|node| {
                node.children()
                    .iter()
                    .filter_map(|&child| self.transforms.get(child).and_then(TransformNode::owner))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // Transforms
    // ---------------------------------------------------------------------

    /// The transform arena
    pub fn transforms(&self) -> &TransformArena {
        &self.transforms
    }

    /// The transform arena, mutably
    pub fn transforms_mut(&mut self) -> &mut TransformArena {
        &mut self.transforms
    }

    /// Transform id of `entity`
    pub fn transform_id(&self, entity: EntityId) -> Option<TransformId> {
        self.entities.get(entity).map(Entity::transform)
    }

    /// Transform node of `entity`
    pub fn transform(&self, entity: EntityId) -> Option<&TransformNode> {
        self.transforms.get(self.transform_id(entity)?)
    }

    /// Transform node of `entity`, mutably
    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut TransformNode> {
        let id = self.transform_id(entity)?;
        self.transforms.get_mut(id)
    }

    /// Local matrix of `entity`, identity when missing
    pub fn local_matrix(&self, entity: EntityId) -> Mat4 {
        self.transform_id(entity)
            .map_or_else(Mat4::identity, |id| self.transforms.local_matrix(id))
    }

    /// World matrix of `entity`
    pub fn world_matrix(&self, entity: EntityId) -> Option<Mat4> {
        self.transform_id(entity).map(|id| self.transforms.world_matrix(id))
    }

    /// World position of `entity`
    pub fn world_position(&self, entity: EntityId) -> Option<Vec3> {
        self.transform_id(entity).map(|id| self.transforms.world_position(id))
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Add a default `T` to `entity` and run its `awake` hook.
    ///
    /// An existing `T` is replaced and receives its `delete` hook. If `awake`
    /// fails the new component is dropped and the error returned.
    pub fn add_component<T: ComponentType>(&mut self, entity: EntityId) -> Result<&mut T, SceneError> {
        self.attach(entity, Box::new(T::default()))?;
        self.entities
            .get_mut(entity)
            .and_then(Entity::get_mut::<T>)
            .ok_or(SceneError::ComponentNotFound(T::KIND))
    }

    /// Add an already constructed component, see [`Scene::add_component`]
    pub fn attach(&mut self, entity: EntityId, mut component: Box<dyn Component>) -> Result<ComponentHandle, SceneError> {
        if !self.entities.contains_key(entity) {
            return Err(SceneError::EntityNotFound);
        }
        self.next_serial += 1;
        component.base_mut().bind(entity, self.next_serial);
        let kind = component.kind();

        if let Err(err) = component.awake(self) {
            log::debug!("{} awake failed: {}", kind, err);
            return Err(err);
        }

        let Some(record) = self.entities.get_mut(entity) else {
            // The entity was deleted from inside awake.
            component.delete(self);
            return Err(SceneError::EntityNotFound);
        };
        let handle = component.handle();
        if let Some(mut previous) = record.insert(component) {
            log::debug!("Replaced {} on entity #{}", kind, record.id());
            previous.delete(self);
        } else {
            log::trace!("Added {} to entity #{}", kind, record.id());
        }
        Ok(handle)
    }

    /// Remove the component of `kind` from `entity`, running its `delete` hook
    pub fn remove_component(&mut self, entity: EntityId, kind: ComponentKind) -> Result<(), SceneError> {
        let mut component = self
            .entities
            .get_mut(entity)
            .ok_or(SceneError::EntityNotFound)?
            .remove(kind)
            .ok_or(SceneError::ComponentNotFound(kind))?;
        component.delete(self);
        Ok(())
    }

    /// Borrow a component by type
    pub fn component<T: ComponentType>(&self, entity: EntityId) -> Option<&T> {
        self.entities.get(entity)?.get::<T>()
    }

    /// Borrow a component mutably by type
    pub fn component_mut<T: ComponentType>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.entities.get_mut(entity)?.get_mut::<T>()
    }

    /// Run `f` with a component and the rest of the scene
    pub fn with_component<T: ComponentType, R>(
        &mut self,
        entity: EntityId,
        f: impl FnOnce(&mut T, &mut Scene) -> R,
    ) -> Option<R> {
        self.run_detached(entity, T::KIND, |component, scene| {
            component.downcast_mut::<T>().map(|component| f(component, scene))
        })
        .flatten()
    }

    /// Resolve a handle to the live instance it was issued for
    pub fn resolve(&self, handle: &ComponentHandle) -> Option<&dyn Component> {
        self.entities
            .get(handle.entity)?
            .component(handle.kind)
            .filter(|component| component.base().serial() == handle.serial)
    }

    /// Property rows of a component
    pub fn component_properties(&self, entity: EntityId, kind: ComponentKind) -> Result<Vec<PropertyEntry>, SceneError> {
        let component = self
            .entities
            .get(entity)
            .ok_or(SceneError::EntityNotFound)?
            .component(kind)
            .ok_or(SceneError::ComponentNotFound(kind))?;
        Ok(component.properties())
    }

    /// Write a component property and notify the component
    pub fn set_component_property(
        &mut self,
        entity: EntityId,
        kind: ComponentKind,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), SceneError> {
        let record = self.entities.get(entity).ok_or(SceneError::EntityNotFound)?;
        if !record.has_component(kind) {
            return Err(SceneError::ComponentNotFound(kind));
        }
        self.run_detached(entity, kind, |component, scene| {
            component.set_property(name, value)?;
            component.on_property_changed(scene, name);
            Ok(())
        })
        .ok_or(SceneError::ComponentNotFound(kind))?
    }

    pub(crate) fn run_detached<R>(
        &mut self,
        entity: EntityId,
        kind: ComponentKind,
        f: impl FnOnce(&mut (dyn Component + 'static), &mut Scene) -> R,
    ) -> Option<R> {
        let mut component = self.entities.get_mut(entity)?.take_kind(kind)?;
        let result = f(component.as_mut(), self);
        self.reattach(entity, component);
        Some(result)
    }

    fn reattach(&mut self, entity: EntityId, component: Box<dyn Component>) {
        let rejected = match self.entities.get_mut(entity) {
            Some(record) => record.restore(component).err(),
            None => Some(component),
        };
        if let Some(mut stale) = rejected {
            log::debug!("{} was removed during its own hook", stale.kind());
            stale.delete(self);
        }
    }

    // ---------------------------------------------------------------------
    // Services
    // ---------------------------------------------------------------------

    /// Frame and physics clocks
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Frame and physics clocks, mutably
    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    /// Input snapshot for the current frame
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Input snapshot, for hosts feeding events
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Runtime switches
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Runtime switches, mutably
    pub fn settings_mut(&mut self) -> &mut SceneSettings {
        &mut self.settings
    }

    /// Settings as inspector rows
    pub fn settings_properties(&self) -> Vec<PropertyEntry> {
        editor::describe(SETTINGS, &self.settings)
    }

    /// Write one setting by name
    pub fn set_setting(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        let property = SETTINGS
            .iter()
            .find(|property| property.name == name)
            .ok_or_else(|| SceneError::UnknownSetting(name.to_string()))?;
        if let (EditorKind::Select(options), PropertyValue::Choice(index)) = (property.editor, value) {
            if index as usize >= options.len() {
                return Err(SceneError::PropertyType {
                    property: name.to_string(),
                    expected: "choice within range",
                    found: value.type_name(),
                });
            }
        }
        if !(property.set)(&mut self.settings, value) {
            return Err(SceneError::PropertyType {
                property: name.to_string(),
                expected: match property.editor {
                    EditorKind::Select(_) => "choice",
                    _ => "bool",
                },
                found: value.type_name(),
            });
        }
        log::debug!("Setting '{}' changed", name);
        Ok(())
    }

    /// Drawing surface size in pixels
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Resize the drawing surface and the active camera's aspect ratio
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::warn!("Ignoring viewport size {}x{}", width, height);
            return;
        }
        self.viewport = Vec2::new(width, height);
        if let Some(entity) = self.active_camera_entity() {
            if let Some(camera) = self.component_mut::<Camera>(entity) {
                camera.set_aspect_ratio(width / height);
            }
        }
    }

    /// Queue a load whose result goes to `target` at the start of the next update
    pub fn request_load(&mut self, target: ComponentHandle, request: LoadRequest) {
        log::trace!("Queued {:?} for {}", request, target.kind);
        self.pending_loads.push_back(PendingLoad { target, request });
    }

    /// Loads waiting for the next update
    pub fn pending_loads(&self) -> impl Iterator<Item = &PendingLoad> + '_ {
        self.pending_loads.iter()
    }

    fn process_pending_loads(&mut self) {
        let pending = std::mem::take(&mut self.pending_loads);
        for PendingLoad { target, request } in pending {
            if self.resolve(&target).is_none() {
                log::debug!("Discarding {:?}, its {} is gone", request, target.kind);
                continue;
            }
            let asset = self.assets.resolve(&request);
            self.run_detached(target.entity, target.kind, |component, scene| {
                component.on_asset_loaded(scene, asset);
            });
        }
    }

    // ---------------------------------------------------------------------
    // Registries
    // ---------------------------------------------------------------------

    /// Register a light. Returns `false` when the registry is full.
    pub fn add_light(&mut self, handle: ComponentHandle) -> bool {
        self.lights.add(handle)
    }

    /// Deregister a light
    pub fn remove_light(&mut self, handle: &ComponentHandle) -> bool {
        self.lights.remove(handle)
    }

    /// Registered lights
    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    /// Register a sphere collider
    pub fn add_collider(&mut self, handle: ComponentHandle) {
        if !self.colliders.contains(&handle) {
            self.colliders.push(handle);
        }
    }

    /// Deregister a sphere collider
    pub fn remove_collider(&mut self, handle: &ComponentHandle) -> bool {
        let before = self.colliders.len();
        self.colliders.retain(|h| h != handle);
        before != self.colliders.len()
    }

    /// Registered sphere colliders
    pub fn colliders(&self) -> &[ComponentHandle] {
        &self.colliders
    }

    /// Describe every enabled registered light and pack them for upload
    pub fn pack_lights(&mut self) -> &LightBuffer {
        let lights: Vec<LightDescription> = self
            .lights
            .handles()
            .iter()
            .filter(|handle| self.entities.get(handle.entity).is_some_and(Entity::is_active))
            .filter_map(|handle| self.resolve(handle))
            .filter(|component| component.is_enabled())
            .filter_map(|component| component.as_light())
            .map(|light| light.describe(self))
            .collect();
        self.light_buffer.pack(&lights);
        &self.light_buffer
    }

    /// Lights packed by the last [`Scene::pack_lights`]
    pub fn light_buffer(&self) -> &LightBuffer {
        &self.light_buffer
    }

    // ---------------------------------------------------------------------
    // Cameras
    // ---------------------------------------------------------------------

    /// Handle of the active camera component
    pub fn active_camera_handle(&self) -> Option<ComponentHandle> {
        self.active_camera
    }

    /// Entity of the active camera
    pub fn active_camera_entity(&self) -> Option<EntityId> {
        self.active_camera
            .map(|handle| handle.entity)
            .filter(|&entity| self.entities.contains_key(entity))
    }

    /// The active camera component
    pub fn active_camera(&self) -> Option<&Camera> {
        let handle = self.active_camera?;
        self.resolve(&handle)?.downcast_ref::<Camera>()
    }

    pub(crate) fn set_active_camera_handle(&mut self, handle: ComponentHandle) {
        self.active_camera = Some(handle);
    }

    pub(crate) fn clear_active_camera(&mut self) {
        self.active_camera = None;
    }

    /// Make the camera on `entity` active.
    ///
    /// Movement is enabled on the new camera entity and disabled on every
    /// other camera entity, so only the active camera responds to input.
    pub fn set_active_camera(&mut self, entity: EntityId) -> Result<(), SceneError> {
        let record = self.entities.get(entity).ok_or(SceneError::EntityNotFound)?;
        let handle = record
            .component(ComponentKind::Camera)
            .map(|camera| camera.handle())
            .ok_or(SceneError::ComponentNotFound(ComponentKind::Camera))?;
        let name = record.name().to_string();

        for camera in self.cameras() {
            if let Some(movement) = self.component_mut::<Movement>(camera) {
                movement.base_mut().set_enabled(camera == entity);
            }
        }
        let viewport = self.viewport;
        if let Some(camera) = self.component_mut::<Camera>(entity) {
            camera.set_aspect_ratio(viewport.x / viewport.y);
        }

        self.active_camera = Some(handle);
        log::info!("Active camera is now '{}'", name);
        Ok(())
    }

    /// Camera entities in creation order
    pub fn cameras(&self) -> Vec<EntityId> {
        let mut cameras: Vec<(u64, EntityId)> = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.has_component(ComponentKind::Camera))
            .map(|(key, entity)| (entity.id(), key))
            .collect();
        cameras.sort_unstable_by_key(|(id, _)| *id);
        cameras.into_iter().map(|(_, key)| key).collect()
    }

    /// React to a key press.
    ///
    /// With camera switching on, digit `n` activates the `n`-th camera in
    /// creation order and `0` the tenth. Returns whether the press was used.
    pub fn handle_key_press(&mut self, key: KeyCode) -> bool {
        if !self.settings.do_camera_switching {
            return false;
        }
        let Some(digit) = key.digit() else {
            return false;
        };
        let index = if digit == 0 { 9 } else { usize::from(digit) - 1 };
        let Some(&camera) = self.cameras().get(index) else {
            return false;
        };
        if self.active_camera_entity() == Some(camera) {
            return false;
        }
        self.set_active_camera(camera).is_ok()
    }

    // ---------------------------------------------------------------------
    // Frame
    // ---------------------------------------------------------------------

    /// Run one frame at host timestamp `now`
    pub fn update(&mut self, now: Duration) {
        self.process_pending_loads();

        let steps = self.time.consume_fixed_steps(now);
        for _ in 0..steps {
            self.run_pass(Pass::Fixed);
            self.resolve_collisions();
        }

        self.time.advance(now);

        let pressed: Vec<KeyCode> = self.input.just_pressed().collect();
        for key in pressed {
            self.handle_key_press(key);
        }

        self.run_pass(Pass::Update);
        self.input.end_frame();
    }

    /// Run one frame stamped with the scene's own stopwatch
    pub fn tick(&mut self) {
        let now = self.clock.elapsed();
        self.update(now);
    }

    fn run_pass(&mut self, pass: Pass) {
        let camera = self.active_camera_entity();
        if let Some(camera) = camera {
            self.run_tree(camera, pass, None);
        }
        // Entities created by hooks are appended and picked up this pass.
        let mut index = 0;
        while index < self.order.len() {
            let entity = self.order[index];
            index += 1;
            if Some(entity) != camera {
                self.run_tree(entity, pass, camera);
            }
        }
    }

    fn run_tree(&mut self, entity: EntityId, pass: Pass, skip: Option<EntityId>) {
        if !self.entities.get(entity).is_some_and(Entity::is_active) {
            return;
        }
        self.run_hooks(entity, pass);
        for child in self.child_entities(entity) {
            if Some(child) != skip {
                self.run_tree(child, pass, skip);
            }
        }
    }

    fn run_hooks(&mut self, entity: EntityId, pass: Pass) {
        let mut index = 0;
        loop {
            let Some(record) = self.entities.get_mut(entity) else {
                return;
            };
            if !record.is_active() || index >= record.slot_count() {
                return;
            }
            if record.slot_enabled(index) {
                if let Some(mut component) = record.take_slot(index) {
                    match pass {
                        Pass::Update => component.update(self),
                        Pass::Fixed => component.fixed_update(self),
                    }
                    self.reattach(entity, component);
                }
            }
            index += 1;
        }
    }

    fn resolve_collisions(&mut self) {
        if self.colliders.len() < 2 {
            return;
        }
        let bodies: Vec<SphereBody> = self
            .colliders
            .iter()
            .filter_map(|handle| {
                let entity = self.entities.get(handle.entity).filter(|entity| entity.is_active())?;
                let collider = entity
                    .get::<SphereCollider>()
                    .filter(|collider| collider.base().serial() == handle.serial && collider.base().is_enabled())?;
                Some(SphereBody {
                    transform: entity.transform(),
                    radius: collider.radius,
                })
            })
            .collect();
        physics::resolve_overlaps(&mut self.transforms, &bodies);
    }

    /// Draw the frame through `backend`
    pub fn render(&mut self, backend: &mut dyn RenderBackend) {
        self.pack_lights();
        backend.upload_lights(&self.light_buffer);

        let Some(camera_entity) = self.active_camera_entity() else {
            log::trace!("No active camera, nothing to draw");
            return;
        };
        self.prepare_camera(camera_entity);

        let scene: &Scene = self;
        let Some(record) = scene.entities.get(camera_entity) else {
            return;
        };
        let Some(camera) = record.get::<Camera>() else {
            return;
        };
        if scene.settings.do_render_sky {
            if let Some(sky) = record.get::<SkyRenderer>().filter(|sky| sky.base().is_enabled()) {
                sky.draw(scene, camera, backend);
            }
        }
        if scene.settings.do_render_grid && camera.render_grid {
            if let Some(grid) = record.get::<GridRenderer>().filter(|grid| grid.base().is_enabled()) {
                grid.draw(camera, backend);
            }
        }

        for &entity in &scene.order {
            scene.render_entity(entity, camera_entity, camera, &Mat4::identity(), backend);
        }
    }

    /// Refresh the camera view and add the sky and grid the settings ask for.
    ///
    /// Helpers added here wait for their shaders, so they start drawing on a
    /// later frame.
    fn prepare_camera(&mut self, camera_entity: EntityId) {
        self.with_component::<Camera, _>(camera_entity, |camera, scene| camera.refresh_view(scene));

        if self.settings.do_render_sky && self.component::<SkyRenderer>(camera_entity).is_none() {
            if let Err(err) = self.add_component::<SkyRenderer>(camera_entity) {
                log::warn!("Failed to add a sky to the active camera: {}", err);
            }
        }
        let wants_grid = self
            .component::<Camera>(camera_entity)
            .is_some_and(|camera| camera.render_grid);
        if self.settings.do_render_grid && wants_grid && self.component::<GridRenderer>(camera_entity).is_none() {
            if let Err(err) = self.add_component::<GridRenderer>(camera_entity) {
                log::warn!("Failed to add a grid to the active camera: {}", err);
            }
        }
    }

    fn render_entity(
        &self,
        entity: EntityId,
        camera_entity: EntityId,
        camera: &Camera,
        parent: &Mat4,
        backend: &mut dyn RenderBackend,
    ) {
        // The camera never draws itself, wherever it sits in the hierarchy.
        if entity == camera_entity {
            return;
        }
        let Some(record) = self.entities.get(entity).filter(|record| record.is_active()) else {
            return;
        };
        let renderer = record
            .renderer()
            .filter(|component| component.is_enabled())
            .and_then(|component| component.as_renderer());
        if let Some(renderer) = renderer {
            let ctx = RenderingContext::new(self, camera, entity, *parent);
            renderer.draw(&ctx, backend);
        }

        let world = parent * self.transforms.local_matrix(record.transform());
        for child in self.child_entities(entity) {
            self.render_entity(child, camera_entity, camera, &world, backend);
        }
    }

    // ---------------------------------------------------------------------
    // Picking
    // ---------------------------------------------------------------------

    /// Closest entity whose renderer bounds `ray` enters
    pub fn ray_cast(&self, ray: &Ray) -> Option<RayHit> {
        let ctx = RayCastContext::root(*ray);
        let mut closest = None;
        for &entity in &self.order {
            self.ray_cast_entity(entity, &ctx, &mut closest);
        }
        closest
    }

    fn ray_cast_entity(&self, entity: EntityId, ctx: &RayCastContext, closest: &mut Option<RayHit>) {
        let Some(record) = self.entities.get(entity).filter(|record| record.is_active()) else {
            return;
        };
        let world = ctx.parent_matrix * self.transforms.local_matrix(record.transform());

        let bounds = record
            .renderer()
            .filter(|component| component.is_enabled())
            .and_then(|component| component.as_renderer())
            .and_then(|renderer| renderer.bounding_box())
            .filter(|bounds| !bounds.is_empty());
        // A singular world matrix (zero scale) has no local space to test in.
        if let Some((bounds, inverse)) = bounds.zip(world.try_inverse()) {
            let local = ctx.ray.transformed(&inverse);
            if let Some(distance) = bounds.intersect_ray(&local) {
                if closest.map_or(true, |hit| distance < hit.distance) {
                    *closest = Some(RayHit { entity, distance });
                }
            }
        }

        let child_ctx = ctx.child(world);
        for child in self.child_entities(entity) {
            self.ray_cast_entity(child, &child_ctx, closest);
        }
    }

    /// World ray through pixel `(x, y)` of the active camera
    pub fn screen_ray(&self, x: f32, y: f32) -> Option<Ray> {
        let camera = self.active_camera()?;
        Some(camera.screen_position_to_world_ray(&Vec2::new(x, y), &self.viewport))
    }

    /// Entity under pixel `(x, y)`
    pub fn pick(&self, x: f32, y: f32) -> Option<RayHit> {
        let hit = self.ray_cast(&self.screen_ray(x, y)?);
        if let Some(hit) = &hit {
            log::debug!("Picked {:?} at distance {:.3}", hit.entity, hit.distance);
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{PointLight, RigidBody, Spline, SplineRenderer};
    use crate::render::{CommandRecorder, DrawCommand};
    use crate::spatial::BoundingBox;
    use approx::assert_relative_eq;

    fn step(scene: &mut Scene, ms: u64) {
        scene.update(Duration::from_millis(ms));
    }

    fn grid_draws(recorder: &CommandRecorder) -> usize {
        recorder
            .commands()
            .iter()
            .filter(|command| matches!(command, DrawCommand::DrawGrid(_)))
            .count()
    }

    #[test]
    fn test_entity_ids_are_monotonic() {
        let mut scene = Scene::default();
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        assert!(scene.entity(b).unwrap().id() > scene.entity(a).unwrap().id());
        assert_eq!(scene.root_entities(), &[a, b]);
        assert_eq!(scene.find_entity("b"), Some(b));
    }

    #[test]
    fn test_add_child_leaves_flat_list() {
        let mut scene = Scene::default();
        let parent = scene.create_entity("parent");
        let child = scene.create_entity("child");
        scene.add_child(parent, child).unwrap();
        assert_eq!(scene.root_entities(), &[parent]);
        assert!(matches!(scene.add_child(child, parent), Err(SceneError::InvalidParent)));

        scene.transform_mut(parent).unwrap().set_position(Vec3::new(1.0, 0.0, 0.0));
        scene.transform_mut(child).unwrap().set_position(Vec3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(scene.world_position(child).unwrap(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_delete_cascades_to_children() {
        let mut scene = Scene::default();
        let parent = scene.create_entity("parent");
        let child = scene.create_entity("child");
        scene.add_child(parent, child).unwrap();
        scene.add_component::<SphereCollider>(child).unwrap();
        assert_eq!(scene.colliders().len(), 1);

        assert!(scene.delete_entity(parent));
        assert!(!scene.contains(child));
        assert!(scene.colliders().is_empty());
        assert!(scene.transforms().is_empty());
        assert!(!scene.delete_entity(parent));
    }

    #[test]
    fn test_replacing_runs_delete_hook() {
        let mut scene = Scene::default();
        let entity = scene.create_entity("light");
        let first = scene.add_component::<PointLight>(entity).map(|light| (&*light as &dyn Component).handle()).unwrap();
        assert_eq!(scene.lights().handles(), &[first]);

        let second = scene.add_component::<PointLight>(entity).map(|light| (&*light as &dyn Component).handle()).unwrap();
        assert_ne!(first.serial, second.serial);
        assert_eq!(scene.lights().handles(), &[second]);
        assert!(scene.resolve(&first).is_none());
    }

    #[test]
    fn test_missing_sibling_aborts_add() {
        let mut scene = Scene::default();
        let entity = scene.create_entity("spline");
        let err = scene.add_component::<SplineRenderer>(entity).unwrap_err();
        assert!(matches!(err, SceneError::MissingSibling { required: ComponentKind::Spline, .. }));
        assert!(scene.component::<SplineRenderer>(entity).is_none());

        scene.add_component::<Spline>(entity).unwrap();
        assert!(scene.add_component::<SplineRenderer>(entity).is_ok());
    }

    #[test]
    fn test_first_camera_becomes_active() {
        let mut scene = Scene::default();
        let first = scene.create_entity("first");
        scene.add_component::<Camera>(first).unwrap();
        let second = scene.create_entity("second");
        scene.add_component::<Camera>(second).unwrap();
        assert_eq!(scene.active_camera_entity(), Some(first));

        scene.delete_entity(first);
        assert_eq!(scene.active_camera_entity(), None);
        scene.set_active_camera(second).unwrap();
        assert_eq!(scene.active_camera_entity(), Some(second));
    }

    #[test]
    fn test_digit_keys_switch_cameras() {
        let mut scene = Scene::default();
        let first = scene.create_entity("first");
        scene.add_component::<Camera>(first).unwrap();
        scene.add_component::<Movement>(first).unwrap();
        let second = scene.create_entity("second");
        scene.add_component::<Camera>(second).unwrap();
        scene.add_component::<Movement>(second).unwrap();

        assert!(scene.handle_key_press(KeyCode::Digit2));
        assert_eq!(scene.active_camera_entity(), Some(second));
        assert!(!scene.component::<Movement>(first).unwrap().base().is_enabled());
        assert!(scene.component::<Movement>(second).unwrap().base().is_enabled());
        assert!(!scene.handle_key_press(KeyCode::Digit3));

        scene.settings_mut().do_camera_switching = false;
        assert!(!scene.handle_key_press(KeyCode::Digit1));
        assert_eq!(scene.active_camera_entity(), Some(second));
    }

    #[test]
    fn test_loads_arrive_on_next_update() {
        let mut scene = Scene::default();
        let entity = scene.create_entity("sky");
        scene.add_component::<SkyRenderer>(entity).unwrap();
        assert!(!scene.component::<SkyRenderer>(entity).unwrap().is_ready());
        assert_eq!(scene.pending_loads().count(), 1);

        step(&mut scene, 0);
        assert!(scene.component::<SkyRenderer>(entity).unwrap().is_ready());
        assert_eq!(scene.pending_loads().count(), 0);
    }

    #[test]
    fn test_fixed_steps_drive_rigid_bodies() {
        let mut scene = Scene::default();
        let entity = scene.create_entity("body");
        scene.add_component::<RigidBody>(entity).unwrap().add_velocity(&Vec3::new(1.0, 0.0, 0.0));

        step(&mut scene, 0);
        assert_relative_eq!(scene.world_position(entity).unwrap().x, 0.0);
        step(&mut scene, 100);
        assert!(scene.world_position(entity).unwrap().x > 0.0);
    }

    #[test]
    fn test_ray_cast_uses_renderer_bounds() {
        let mut scene = Scene::default();
        let mut assets = InMemoryAssets::with_builtin_shaders();
        assets.insert_box_model("cube", BoundingBox::new(Vec3::repeat(-1.0), Vec3::repeat(1.0)));
        scene.set_asset_source(Box::new(assets));

        let near = scene.load_entity("near", "cube").unwrap();
        let far = scene.load_entity("far", "cube").unwrap();
        scene.transform_mut(far).unwrap().set_position(Vec3::new(0.0, 0.0, -10.0));
        step(&mut scene, 0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.ray_cast(&ray).unwrap();
        assert_eq!(hit.entity, near);
        assert_relative_eq!(hit.distance, 9.0, epsilon = 1e-4);

        scene.set_entity_active(near, false).unwrap();
        assert_eq!(scene.ray_cast(&ray).unwrap().entity, far);
    }

    #[test]
    fn test_render_skips_camera_entity_and_adds_grid() {
        let mut scene = Scene::default();
        let camera = scene.create_entity("camera");
        scene.add_component::<Camera>(camera).unwrap();
        let mut recorder = CommandRecorder::new();

        scene.render(&mut recorder);
        assert!(scene.component::<GridRenderer>(camera).is_some());
        assert_eq!(grid_draws(&recorder), 0);

        step(&mut scene, 0);
        recorder.clear();
        scene.render(&mut recorder);
        assert_eq!(grid_draws(&recorder), 1);
    }

    #[test]
    fn test_settings_table() {
        let mut scene = Scene::default();
        scene.set_setting("do_render_sky", PropertyValue::Bool(true)).unwrap();
        assert!(scene.settings().do_render_sky);
        scene.set_setting("default_shader", PropertyValue::Choice(0)).unwrap();
        assert_eq!(scene.settings().default_shader, DefaultShader::Phong);
        assert!(matches!(
            scene.set_setting("default_shader", PropertyValue::Choice(5)),
            Err(SceneError::PropertyType { .. })
        ));
        assert!(matches!(
            scene.set_setting("nope", PropertyValue::Bool(true)),
            Err(SceneError::UnknownSetting(_))
        ));
        assert_eq!(scene.settings_properties().len(), 5);
    }
}
