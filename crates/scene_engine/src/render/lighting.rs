//! Light aggregation
//!
//! Light components register a [`ComponentHandle`] with the scene's
//! [`LightRegistry`]. Each frame the enabled ones describe themselves and the
//! descriptions are packed, in registration order, into a [`LightBuffer`] of
//! std140-friendly 16-float records followed by an integer count.

use bytemuck::{Pod, Zeroable};

use crate::ecs::component::ComponentHandle;
use crate::foundation::math::{utils, Vec3};
use crate::scene::Scene;

/// Hard capacity of the light buffer
pub const MAX_LIGHTS: usize = 64;

/// Floats per packed light
pub const LIGHT_FLOATS: usize = 16;

/// Light types, encoded as the first float of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Point light (like a lightbulb)
    Point = 0,
    /// Directional light (like sunlight)
    Directional = 1,
    /// Spot light (like a flashlight)
    Spot = 2,
}

/// A light as seen by the shader, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDescription {
    /// Light type
    pub light_type: LightType,
    /// World position
    pub position: Vec3,
    /// Direction the light travels; normalized when packed
    pub direction: Vec3,
    /// Linear RGB color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Cosine of the spot half-angle
    pub cos_angle: f32,
}

/// Packed light record
///
/// Layout in floats: `[type, intensity, cos, _]`, `[position, _]`,
/// `[color, _]`, `[direction, _]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct LightRecord {
    /// Type, intensity, cos(angle), padding
    pub header: [f32; 4],
    /// World position, padding
    pub position: [f32; 4],
    /// Color, padding
    pub color: [f32; 4],
    /// Normalized direction, padding
    pub direction: [f32; 4],
}

impl From<&LightDescription> for LightRecord {
    fn from(light: &LightDescription) -> Self {
        let direction = utils::normalize_or_zero(&light.direction);
        let pad = |v: &Vec3| [v.x, v.y, v.z, 0.0];
        Self {
            header: [light.light_type as u8 as f32, light.intensity, light.cos_angle, 0.0],
            position: pad(&light.position),
            color: pad(&light.color),
            direction: pad(&direction),
        }
    }
}

/// Capability of components that contribute a light
pub trait LightSource {
    /// Describe the light for this frame
    fn describe(&self, scene: &Scene) -> LightDescription;
}

/// Fixed-size array of packed lights plus the active count
#[derive(Debug, Clone, PartialEq)]
pub struct LightBuffer {
    records: Vec<LightRecord>,
    count: u32,
}

impl Default for LightBuffer {
    fn default() -> Self {
        Self {
            records: vec![LightRecord::default(); MAX_LIGHTS],
            count: 0,
        }
    }
}

impl LightBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the buffer with `lights`, zeroing unused slots.
    ///
    /// Lights beyond [`MAX_LIGHTS`] are ignored.
    pub fn pack<'a>(&mut self, lights: impl IntoIterator<Item = &'a LightDescription>) {
        self.records.fill(LightRecord::default());
        let mut count = 0;
        for (slot, light) in self.records.iter_mut().zip(lights) {
            *slot = LightRecord::from(light);
            count += 1;
        }
        self.count = count;
    }

    /// Number of packed lights
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Packed records, including zeroed unused slots
    pub fn records(&self) -> &[LightRecord] {
        &self.records
    }

    /// Records as one flat float slice of `MAX_LIGHTS * 16` values
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.records)
    }

    /// Uniform-buffer bytes: the records, then the count as `i32` padded to 16 bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MAX_LIGHTS * LIGHT_FLOATS * 4 + 16);
        bytes.extend_from_slice(bytemuck::cast_slice(&self.records));
        let count = i32::try_from(self.count).unwrap_or(i32::MAX);
        bytes.extend_from_slice(bytemuck::bytes_of(&[count, 0, 0, 0]));
        bytes
    }
}

/// Ordered set of registered light components
#[derive(Debug, Clone)]
pub struct LightRegistry {
    handles: Vec<ComponentHandle>,
    capacity: usize,
    dropped: u64,
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_LIGHTS)
    }
}

impl LightRegistry {
    /// Create a registry holding at most `capacity` lights, clamped to [`MAX_LIGHTS`]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::new(),
            capacity: capacity.min(MAX_LIGHTS),
            dropped: 0,
        }
    }

    /// Register a light. Returns `false` and counts a drop when full.
    pub fn add(&mut self, handle: ComponentHandle) -> bool {
        if self.handles.contains(&handle) {
            return true;
        }
        if self.handles.len() >= self.capacity {
            self.dropped += 1;
            log::warn!(
                "Light limit of {} reached, {} on entity {:?} will not be rendered",
                self.capacity,
                handle.kind,
                handle.entity
            );
            return false;
        }
        self.handles.push(handle);
        true
    }

    /// Deregister a light
    pub fn remove(&mut self, handle: &ComponentHandle) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| h != handle);
        before != self.handles.len()
    }

    /// Registered lights in packing order
    pub fn handles(&self) -> &[ComponentHandle] {
        &self.handles
    }

    /// Number of registered lights
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no light is registered
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Registration capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registrations refused because the registry was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Forget every registration
    pub fn clear(&mut self) {
        self.handles.clear();
    }
}
