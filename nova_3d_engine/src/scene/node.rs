/// Scene node: a named transform in the hierarchy carrying attachments.

use rustc_hash::FxHashMap;
use slotmap::new_key_type;
use crate::math::Aabb;
use crate::transform::Transform;
use super::entity::{DebugVolumeKey, EntityKey};

new_key_type! {
    /// Stable key for a SceneNode within a SceneTree.
    pub struct NodeKey;
}

/// Reference to any object attachable to a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movable {
    Entity(EntityKey),
    DebugVolume(DebugVolumeKey),
}

/// One node of the scene hierarchy.
///
/// Structure (parent/children) is owned by the SceneTree; the node only
/// records it. Attachments are keyed by the movable's name, so attaching
/// under an occupied name replaces the previous occupant.
#[derive(Debug)]
pub struct SceneNode {
    name: String,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    pub(crate) transform: Transform,
    attachments: FxHashMap<String, Movable>,
    /// Union of attachment bounds and child bounds, world space.
    pub(crate) world_bounds: Aabb,
    /// Parent transform generation last composed against. A mismatch means
    /// the cached world terms are stale even if the local terms are not.
    pub(crate) last_parent_generation: u64,
}

impl SceneNode {
    pub(crate) fn new(name: &str, parent: Option<NodeKey>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            transform: Transform::new(),
            attachments: FxHashMap::default(),
            world_bounds: Aabb::EMPTY,
            last_parent_generation: u64::MAX,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeKey>) {
        self.parent = parent;
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: NodeKey) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: NodeKey) {
        self.children.retain(|&c| c != child);
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Attach a movable under `name`. Returns the previous occupant of the
    /// name, if the attach replaced one.
    pub(crate) fn attach(&mut self, name: &str, movable: Movable) -> Option<Movable> {
        self.attachments.insert(name.to_string(), movable)
    }

    pub(crate) fn detach(&mut self, name: &str) -> Option<Movable> {
        self.attachments.remove(name)
    }

    pub fn attachment(&self, name: &str) -> Option<Movable> {
        self.attachments.get(name).copied()
    }

    pub fn attachments(&self) -> impl Iterator<Item = (&str, Movable)> {
        self.attachments.iter().map(|(n, &m)| (n.as_str(), m))
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// World-space bounds aggregated over this node's attachments and its
    /// entire subtree. Valid after the tree's per-frame update.
    pub fn world_bounds(&self) -> &Aabb {
        &self.world_bounds
    }
}
