//! Transform hierarchy
//!
//! Transforms live in a [`TransformArena`] and refer to each other by
//! [`TransformId`]. Each node memoises its local matrix and inverse until the
//! next setter call; world matrices are recomputed on every query by walking
//! up to the root, so moving a parent never leaves a child stale.

use std::cell::Cell;

use crate::foundation::collections::{EntityId, SlotMap, TransformId};
use crate::foundation::math::{axes, utils, Mat3, Mat4, Mat4Ext, Quat, Rotation3, Unit, Vec3};

/// Threshold above which `look_at` treats forward and up as parallel
const PARALLEL_DOT: f32 = 0.99999;

/// Local position, rotation and scale with cached matrices
#[derive(Debug, Clone)]
pub struct TransformNode {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    matrix: Cell<Option<Mat4>>,
    inverse: Cell<Option<Mat4>>,
    parent: Option<TransformId>,
    children: Vec<TransformId>,
    owner: Option<EntityId>,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Quat::identity(), Vec3::repeat(1.0))
    }
}

impl TransformNode {
    /// Create a detached node
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            matrix: Cell::new(None),
            inverse: Cell::new(None),
            parent: None,
            children: Vec::new(),
            owner: None,
        }
    }

    /// Create a detached node at `position`
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::identity(), Vec3::repeat(1.0))
    }

    fn invalidate(&self) {
        self.matrix.set(None);
        self.inverse.set(None);
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Overwrite the local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.invalidate();
    }

    /// Overwrite the local rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.invalidate();
    }

    /// Overwrite the local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.invalidate();
    }

    /// Move by `delta` in parent space
    pub fn translate(&mut self, delta: &Vec3) {
        self.set_position(self.position + delta);
    }

    /// Rotate about a local axis by `angle` radians
    pub fn rotate(&mut self, axis: &Unit<Vec3>, angle: f32) {
        self.set_rotation(self.rotation * Quat::from_axis_angle(axis, angle));
    }

    /// Apply Euler angles in degrees on top of the current rotation
    pub fn rotate_degrees(&mut self, euler: &Vec3) {
        self.set_rotation(self.rotation * utils::quat_from_euler_degrees(euler));
    }

    /// Orient the forward axis toward `target`.
    ///
    /// When the view direction is (nearly) parallel to `up`, [`axes::LEFT`]
    /// is used as the up vector instead.
    pub fn look_at(&mut self, target: &Vec3, up: &Vec3) {
        let Some(forward) = (target - self.position).try_normalize(f32::EPSILON) else {
            return;
        };
        let up = if forward.dot(up).abs() > PARALLEL_DOT { axes::LEFT } else { *up };
        let right = utils::normalize_or_zero(&up.cross(&forward));
        let new_up = forward.cross(&right);
        let basis = Mat3::from_columns(&[right, new_up, forward]);
        self.set_rotation(Quat::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis)));
    }

    /// Local forward axis
    pub fn forward(&self) -> Vec3 {
        self.rotation * axes::FORWARD
    }

    /// Local left axis
    pub fn left(&self) -> Vec3 {
        self.rotation * axes::LEFT
    }

    /// Local up axis
    pub fn up(&self) -> Vec3 {
        self.rotation * axes::UP
    }

    /// Local matrix `T * R * S`, memoised until the next setter
    pub fn matrix(&self) -> Mat4 {
        if let Some(matrix) = self.matrix.get() {
            return matrix;
        }
        let matrix = Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale);
        self.matrix.set(Some(matrix));
        matrix
    }

    /// Inverse of [`Self::matrix`], memoised likewise
    pub fn inverse_matrix(&self) -> Mat4 {
        if let Some(inverse) = self.inverse.get() {
            return inverse;
        }
        let inverse = self.matrix().inverse_or_identity();
        self.inverse.set(Some(inverse));
        inverse
    }

    /// Parent node, if attached
    pub fn parent(&self) -> Option<TransformId> {
        self.parent
    }

    /// Children in attachment order
    pub fn children(&self) -> &[TransformId] {
        &self.children
    }

    /// Entity this transform belongs to
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    #[cfg(test)]
    fn is_cached(&self) -> bool {
        self.matrix.get().is_some()
    }
}

/// Arena of transform nodes linked by id
#[derive(Debug, Default)]
pub struct TransformArena {
    nodes: SlotMap<TransformId, TransformNode>,
}

impl TransformArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached node
    pub fn insert(&mut self, node: TransformNode) -> TransformId {
        self.nodes.insert(node)
    }

    /// Remove a node, unlinking it from its parent and orphaning its children
    pub fn remove(&mut self, id: TransformId) -> Option<TransformNode> {
        self.detach(id);
        let node = self.nodes.remove(id)?;
        for child in &node.children {
            if let Some(child) = self.nodes.get_mut(*child) {
                child.parent = None;
            }
        }
        Some(node)
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: TransformId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node
    pub fn get(&self, id: TransformId) -> Option<&TransformNode> {
        self.nodes.get(id)
    }

    /// Borrow a node mutably
    pub fn get_mut(&mut self, id: TransformId) -> Option<&mut TransformNode> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn set_owner(&mut self, id: TransformId, owner: EntityId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.owner = Some(owner);
        }
    }

    /// Attach `child` under `parent`, detaching it from any previous parent.
    ///
    /// Returns `false` when either node is missing or the link would form a cycle.
    pub fn add_child(&mut self, parent: TransformId, child: TransformId) -> bool {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            log::warn!("Refusing to parent a transform under its own descendant");
            return false;
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        true
    }

    /// Unlink `child` from its parent, if any
    pub fn detach(&mut self, child: TransformId) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|&id| id != child);
        }
    }

    /// Ancestors from the immediate parent up to the root
    pub fn ancestors(&self, id: TransformId) -> impl Iterator<Item = TransformId> + '_ {
        std::iter::successors(self.get(id).and_then(TransformNode::parent), move |&current| {
            self.get(current).and_then(TransformNode::parent)
        })
    }

    /// Local matrix of `id`, identity for a missing node
    pub fn local_matrix(&self, id: TransformId) -> Mat4 {
        self.get(id).map_or_else(Mat4::identity, TransformNode::matrix)
    }

    /// World matrix: ancestor local matrices folded root to leaf
    pub fn world_matrix(&self, id: TransformId) -> Mat4 {
        let Some(node) = self.get(id) else {
            return Mat4::identity();
        };
        match node.parent {
            Some(parent) => self.world_matrix(parent) * node.matrix(),
            None => node.matrix(),
        }
    }

    /// World matrix of the parent, identity for roots
    pub fn parent_world_matrix(&self, id: TransformId) -> Mat4 {
        self.get(id)
            .and_then(TransformNode::parent)
            .map_or_else(Mat4::identity, |parent| self.world_matrix(parent))
    }

    /// World-space position
    pub fn world_position(&self, id: TransformId) -> Vec3 {
        utils::translation_of(&self.world_matrix(id))
    }

    /// World-space forward axis, normalized
    pub fn world_forward(&self, id: TransformId) -> Vec3 {
        let direction = utils::transform_direction(&self.world_matrix(id), &axes::FORWARD);
        utils::normalize_or_zero(&direction)
    }

    /// World-space up axis, normalized
    pub fn world_up(&self, id: TransformId) -> Vec3 {
        let direction = utils::transform_direction(&self.world_matrix(id), &axes::UP);
        utils::normalize_or_zero(&direction)
    }

    /// Place `id` so its world position becomes `world`
    pub fn set_world_position(&mut self, id: TransformId, world: &Vec3) {
        let inverse_parent = self.parent_world_matrix(id).inverse_or_identity();
        let local = utils::transform_point(&inverse_parent, world);
        if let Some(node) = self.get_mut(id) {
            node.set_position(local);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_matrix_is_translation_rotation_scale() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), 0.7);
        let node = TransformNode::new(Vec3::new(1.0, 2.0, 3.0), rotation, Vec3::new(2.0, 1.0, 0.5));
        let expected = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0))
            * rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 0.5));
        assert_relative_eq!(node.matrix(), expected, epsilon = EPSILON);
        assert_relative_eq!(node.matrix() * node.inverse_matrix(), Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_setters_invalidate_cache() {
        let mut node = TransformNode::default();
        let _ = node.matrix();
        assert!(node.is_cached());
        node.set_position(Vec3::new(0.0, 4.0, 0.0));
        assert!(!node.is_cached());
        assert_relative_eq!(utils::translation_of(&node.matrix()), Vec3::new(0.0, 4.0, 0.0));
        assert_relative_eq!(
            utils::transform_point(&node.inverse_matrix(), &Vec3::new(0.0, 4.0, 0.0)),
            Vec3::zeros()
        );
    }

    #[test]
    fn test_repeated_matrix_reads_are_identical() {
        let rotation = Quat::from_euler_angles(0.4, 1.1, -0.6);
        let node = TransformNode::new(Vec3::new(0.3, -1.7, 2.9), rotation, Vec3::new(1.5, 0.25, 3.0));
        let first = node.matrix();
        assert_eq!(node.matrix(), first);
        let inverse = node.inverse_matrix();
        assert_eq!(node.inverse_matrix(), inverse);

        let mut arena = TransformArena::new();
        let parent = arena.insert(TransformNode::new(Vec3::new(0.3, -1.7, 2.9), rotation, Vec3::new(1.5, 0.25, 3.0)));
        let child = arena.insert(TransformNode::from_position(Vec3::new(1.0, 2.0, 3.0)));
        assert!(arena.add_child(parent, child));
        let world = arena.world_matrix(child);
        assert_eq!(arena.world_matrix(child), world);
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut arena = TransformArena::new();
        let parent = arena.insert(TransformNode::from_position(Vec3::new(1.0, 0.0, 0.0)));
        let child = arena.insert(TransformNode::from_position(Vec3::new(0.0, 1.0, 0.0)));
        assert!(arena.add_child(parent, child));

        assert_relative_eq!(arena.world_position(child), Vec3::new(1.0, 1.0, 0.0), epsilon = EPSILON);

        arena.get_mut(parent).unwrap().set_position(Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(arena.world_position(child), Vec3::new(0.0, 1.0, 5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_reparenting_detaches_from_old_parent() {
        let mut arena = TransformArena::new();
        let first = arena.insert(TransformNode::default());
        let second = arena.insert(TransformNode::default());
        let child = arena.insert(TransformNode::default());

        arena.add_child(first, child);
        arena.add_child(second, child);

        assert!(arena.get(first).unwrap().children().is_empty());
        assert_eq!(arena.get(second).unwrap().children(), &[child]);
        assert_eq!(arena.get(child).unwrap().parent(), Some(second));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut arena = TransformArena::new();
        let root = arena.insert(TransformNode::default());
        let child = arena.insert(TransformNode::default());
        arena.add_child(root, child);
        assert!(!arena.add_child(child, root));
        assert!(!arena.add_child(root, root));
    }

    #[test]
    fn test_remove_orphans_children() {
        let mut arena = TransformArena::new();
        let root = arena.insert(TransformNode::default());
        let child = arena.insert(TransformNode::default());
        arena.add_child(root, child);
        arena.remove(root);
        assert_eq!(arena.get(child).unwrap().parent(), None);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut node = TransformNode::default();
        node.look_at(&Vec3::new(3.0, 0.0, 0.0), &axes::UP);
        assert_relative_eq!(node.forward(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(node.up(), axes::UP, epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_straight_up_uses_fallback_axis() {
        let mut node = TransformNode::default();
        node.look_at(&Vec3::new(0.0, 10.0, 0.0), &axes::UP);
        let forward = node.forward();
        assert!(forward.iter().all(|c| c.is_finite()));
        assert_relative_eq!(forward, axes::UP, epsilon = EPSILON);
    }

    #[test]
    fn test_set_world_position_respects_parent() {
        let mut arena = TransformArena::new();
        let parent = arena.insert(TransformNode::new(
            Vec3::new(0.0, 0.0, 1.0),
            Quat::identity(),
            Vec3::repeat(2.0),
        ));
        let child = arena.insert(TransformNode::default());
        arena.add_child(parent, child);

        arena.set_world_position(child, &Vec3::new(2.0, 0.0, 1.0));
        assert_relative_eq!(arena.get(child).unwrap().position(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(arena.world_position(child), Vec3::new(2.0, 0.0, 1.0), epsilon = EPSILON);
    }
}
