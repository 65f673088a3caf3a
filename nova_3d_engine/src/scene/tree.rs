/// Scene tree — flat arena of nodes with explicit parent-before-child
/// resolution.
///
/// Nodes live in a SlotMap; hierarchy is by key. World state is refreshed
/// two ways: a per-frame `update` pass that walks the whole tree in
/// pre-order (each node composed at most once, after its parent), and an
/// on-demand `resolve` that walks one ancestor chain for mid-frame world
/// reads. Both use the same staleness rule: a node recomposes when its own
/// transform is dirty or when the parent generation it last composed
/// against no longer matches.

use glam::{Mat4, Quat, Vec3};
use slotmap::SlotMap;
use crate::camera::{Frustum, FrustumTest};
use crate::math::Aabb;
use crate::resource::MaterialRegistry;
use crate::queue::RenderQueue;
use crate::transform::{DirectionMode, Transform, TransformSpace};
use crate::{engine_bail, engine_err};
use crate::error::Result;
use super::entity::{DebugVolume, DebugVolumeKey, Entity, EntityKey};
use super::node::{Movable, NodeKey, SceneNode};

/// The node hierarchy of one scene.
pub struct SceneTree {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
    /// Reused across update passes
    traversal_stack: Vec<NodeKey>,
}

impl SceneTree {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new("root", None));
        Self {
            nodes,
            root,
            traversal_stack: Vec::new(),
        }
    }

    /// The fixed root node. Identity transform unless moved explicitly.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node(&self, key: NodeKey) -> Result<&SceneNode> {
        self.nodes.get(key).ok_or_else(|| {
            engine_err!("nova3d::SceneTree", Structural, "node key {:?} is not in this tree", key)
        })
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Result<&mut SceneNode> {
        self.nodes.get_mut(key).ok_or_else(|| {
            engine_err!("nova3d::SceneTree", Structural, "node key {:?} is not in this tree", key)
        })
    }

    // ===== STRUCTURE =====

    /// Create a new child node under `parent`.
    pub fn create_child(&mut self, parent: NodeKey, name: &str) -> Result<NodeKey> {
        if !self.nodes.contains_key(parent) {
            engine_bail!("nova3d::SceneTree", Structural,
                "cannot create child '{}': parent key {:?} is not in this tree", name, parent);
        }
        let child = self.nodes.insert(SceneNode::new(name, Some(parent)));
        self.nodes[parent].add_child(child);
        Ok(child)
    }

    /// Destroy `key` and its entire subtree.
    ///
    /// Attachments are detached, not destroyed; their keys are returned so
    /// the owner can clear back-references. The root cannot be destroyed.
    pub fn destroy_node(&mut self, key: NodeKey) -> Result<Vec<Movable>> {
        if key == self.root {
            engine_bail!("nova3d::SceneTree", Structural, "the root node cannot be destroyed");
        }
        let parent = match self.nodes.get(key) {
            Some(node) => node.parent(),
            None => engine_bail!("nova3d::SceneTree", Structural,
                "cannot destroy node: key {:?} is not in this tree", key),
        };
        if let Some(parent) = parent {
            self.nodes[parent].remove_child(key);
        }

        let mut detached = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(node) = self.nodes.remove(k) {
                stack.extend_from_slice(node.children());
                detached.extend(node.attachments().map(|(_, m)| m));
            }
        }
        Ok(detached)
    }

    /// Move `child` (with its subtree) under `new_parent`.
    ///
    /// Rejects the root, unknown keys, self-parenting, and any reparent
    /// that would create a cycle.
    pub fn reparent(&mut self, child: NodeKey, new_parent: NodeKey) -> Result<()> {
        if child == self.root {
            engine_bail!("nova3d::SceneTree", Structural, "the root node cannot be reparented");
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(new_parent) {
            engine_bail!("nova3d::SceneTree", Structural,
                "reparent with a key that is not in this tree");
        }

        // Walk new_parent's ancestors; finding child means a cycle
        let mut cursor = Some(new_parent);
        while let Some(k) = cursor {
            if k == child {
                engine_bail!("nova3d::SceneTree", Structural,
                    "reparenting '{}' under its own subtree would create a cycle",
                    self.nodes[child].name());
            }
            cursor = self.nodes[k].parent();
        }

        if let Some(old_parent) = self.nodes[child].parent() {
            self.nodes[old_parent].remove_child(child);
        }
        self.nodes[new_parent].add_child(child);
        let node = &mut self.nodes[child];
        node.set_parent(Some(new_parent));
        node.transform.require_update();
        Ok(())
    }

    // ===== RESOLUTION =====

    fn parent_generation(&self, key: NodeKey) -> u64 {
        match self.nodes[key].parent() {
            Some(p) => self.nodes[p].transform.generation(),
            None => 0,
        }
    }

    fn is_stale(&self, key: NodeKey) -> bool {
        let node = &self.nodes[key];
        node.transform.is_dirty() || node.last_parent_generation != self.parent_generation(key)
    }

    /// Bring one node's world state up to date by walking its ancestor
    /// chain top-down. Clean chains recompute nothing, so repeated reads
    /// are bit-identical.
    pub fn resolve(&mut self, key: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(key) {
            engine_bail!("nova3d::SceneTree", Structural,
                "cannot resolve node: key {:?} is not in this tree", key);
        }

        // Collect the chain root-first
        let mut chain = Vec::new();
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            chain.push(k);
            cursor = self.nodes[k].parent();
        }
        chain.reverse();

        for k in chain {
            if self.is_stale(k) {
                let parent_snapshot: Option<Transform> =
                    self.nodes[k].parent().map(|p| self.nodes[p].transform);
                let generation = self.parent_generation(k);
                let node = &mut self.nodes[k];
                node.transform.update_with_parent(parent_snapshot.as_ref());
                node.last_parent_generation = generation;
            }
            self.nodes[k].transform.update_matrix();
        }
        Ok(())
    }

    // ===== WORLD READS =====

    pub fn world_position(&mut self, key: NodeKey) -> Result<Vec3> {
        self.resolve(key)?;
        Ok(self.nodes[key].transform.world_position())
    }

    pub fn world_rotation(&mut self, key: NodeKey) -> Result<Quat> {
        self.resolve(key)?;
        Ok(self.nodes[key].transform.world_rotation())
    }

    pub fn world_scale(&mut self, key: NodeKey) -> Result<Vec3> {
        self.resolve(key)?;
        Ok(self.nodes[key].transform.world_scale())
    }

    pub fn world_matrix(&mut self, key: NodeKey) -> Result<Mat4> {
        self.resolve(key)?;
        Ok(self.nodes[key].transform.world_matrix())
    }

    // ===== MUTATIONS =====
    //
    // World-space operations resolve first: their math reads cached world
    // state (the parent's or the node's own), which must be current.

    pub fn set_position(&mut self, key: NodeKey, position: Vec3) -> Result<()> {
        self.node_mut(key)?.transform.set_position(position);
        Ok(())
    }

    pub fn set_rotation(&mut self, key: NodeKey, rotation: Quat) -> Result<()> {
        self.node_mut(key)?.transform.set_rotation(rotation);
        Ok(())
    }

    pub fn set_scale(&mut self, key: NodeKey, scale: Vec3) -> Result<()> {
        self.node_mut(key)?.transform.set_scale(scale);
        Ok(())
    }

    pub fn translate(&mut self, key: NodeKey, delta: Vec3, space: TransformSpace) -> Result<()> {
        let parent_snapshot = self.resolved_parent_snapshot(key, space)?;
        self.nodes[key]
            .transform
            .translate(delta, space, parent_snapshot.as_ref());
        Ok(())
    }

    pub fn rotate(&mut self, key: NodeKey, delta: Quat, space: TransformSpace) -> Result<()> {
        if space == TransformSpace::World {
            self.resolve(key)?;
        } else if !self.nodes.contains_key(key) {
            engine_bail!("nova3d::SceneTree", Structural,
                "cannot rotate node: key {:?} is not in this tree", key);
        }
        self.nodes[key].transform.rotate(delta, space);
        Ok(())
    }

    pub fn yaw(&mut self, key: NodeKey, angle: f32, space: TransformSpace) -> Result<()> {
        self.rotate(key, Quat::from_rotation_y(angle), space)
    }

    pub fn pitch(&mut self, key: NodeKey, angle: f32, space: TransformSpace) -> Result<()> {
        self.rotate(key, Quat::from_rotation_x(angle), space)
    }

    pub fn roll(&mut self, key: NodeKey, angle: f32, space: TransformSpace) -> Result<()> {
        self.rotate(key, Quat::from_rotation_z(angle), space)
    }

    pub fn scale_by(&mut self, key: NodeKey, factor: Vec3) -> Result<()> {
        self.node_mut(key)?.transform.scale_by(factor);
        Ok(())
    }

    pub fn set_direction(
        &mut self,
        key: NodeKey,
        dir: Vec3,
        mode: DirectionMode,
    ) -> Result<()> {
        self.resolve(key)?;
        let parent_snapshot: Option<Transform> =
            self.nodes[key].parent().map(|p| self.nodes[p].transform);
        self.nodes[key]
            .transform
            .set_direction(dir, mode, parent_snapshot.as_ref());
        Ok(())
    }

    pub fn look_at(&mut self, key: NodeKey, point: Vec3, mode: DirectionMode) -> Result<()> {
        self.resolve(key)?;
        let parent_snapshot: Option<Transform> =
            self.nodes[key].parent().map(|p| self.nodes[p].transform);
        self.nodes[key]
            .transform
            .look_at(point, mode, parent_snapshot.as_ref());
        Ok(())
    }

    pub fn set_from_matrix(&mut self, key: NodeKey, matrix: &Mat4) -> Result<()> {
        self.node_mut(key)?.transform.set_from_matrix(matrix);
        Ok(())
    }

    /// Resolved parent snapshot for operations that convert from world
    /// space. Local/Parent space operations skip the resolution.
    fn resolved_parent_snapshot(
        &mut self,
        key: NodeKey,
        space: TransformSpace,
    ) -> Result<Option<Transform>> {
        if !self.nodes.contains_key(key) {
            engine_bail!("nova3d::SceneTree", Structural,
                "cannot transform node: key {:?} is not in this tree", key);
        }
        if space != TransformSpace::World {
            return Ok(None);
        }
        if let Some(parent) = self.nodes[key].parent() {
            self.resolve(parent)?;
            Ok(Some(self.nodes[parent].transform))
        } else {
            Ok(None)
        }
    }

    // ===== FRAME UPDATE =====

    /// Phase-1 frame pass: recompose every stale transform (pre-order, so
    /// parents always before children) and re-aggregate world bounds
    /// bottom-up.
    pub fn update(
        &mut self,
        entities: &mut SlotMap<EntityKey, Entity>,
        volumes: &mut SlotMap<DebugVolumeKey, DebugVolume>,
    ) {
        let mut stack = std::mem::take(&mut self.traversal_stack);
        stack.clear();
        stack.push(self.root);

        while let Some(key) = stack.pop() {
            if self.is_stale(key) {
                let parent_snapshot: Option<Transform> =
                    self.nodes[key].parent().map(|p| self.nodes[p].transform);
                let generation = self.parent_generation(key);
                let node = &mut self.nodes[key];
                node.transform.update_with_parent(parent_snapshot.as_ref());
                node.last_parent_generation = generation;
            }
            self.nodes[key].transform.update_matrix();
            stack.extend_from_slice(self.nodes[key].children());
        }

        self.traversal_stack = stack;
        self.aggregate_bounds(self.root, entities, volumes);
    }

    /// Post-order bounds pass. Each node's world bounds is the union of its
    /// attachments' (freshly re-projected) world bounds and its children's
    /// aggregated bounds.
    fn aggregate_bounds(
        &mut self,
        key: NodeKey,
        entities: &mut SlotMap<EntityKey, Entity>,
        volumes: &mut SlotMap<DebugVolumeKey, DebugVolume>,
    ) -> Aabb {
        let world = self.nodes[key].transform.world_matrix();
        let mut bounds = Aabb::EMPTY;

        for (_, movable) in self.nodes[key].attachments() {
            match movable {
                Movable::Entity(k) => {
                    if let Some(entity) = entities.get_mut(k) {
                        entity.update_world_bounds(&world);
                        bounds.merge(entity.world_bounds());
                    }
                }
                Movable::DebugVolume(k) => {
                    if let Some(volume) = volumes.get_mut(k) {
                        volume.update_world_bounds(&world);
                        bounds.merge(volume.world_bounds());
                    }
                }
            }
        }

        let child_count = self.nodes[key].children().len();
        for i in 0..child_count {
            let child = self.nodes[key].children()[i];
            let child_bounds = self.aggregate_bounds(child, entities, volumes);
            bounds.merge(&child_bounds);
        }

        self.nodes[key].world_bounds = bounds;
        bounds
    }

    // ===== VISIBILITY =====

    /// Phase-2 frame pass: hierarchical frustum cull, depositing records
    /// for every visible movable.
    ///
    /// Nodes classified `Outside` prune their whole subtree; `Inside`
    /// subtrees skip per-object tests; `Partial` nodes test each attachment
    /// individually.
    pub fn find_visible_objects(
        &self,
        frustum: &Frustum,
        queue: &mut RenderQueue,
        entities: &mut SlotMap<EntityKey, Entity>,
        volumes: &SlotMap<DebugVolumeKey, DebugVolume>,
        materials: &MaterialRegistry,
    ) -> Result<()> {
        let mut stack = vec![(self.root, false)];

        while let Some((key, inherited_inside)) = stack.pop() {
            let node = &self.nodes[key];

            let skip_object_tests = if inherited_inside {
                true
            } else {
                match frustum.classify_aabb(&node.world_bounds) {
                    FrustumTest::Outside => continue,
                    FrustumTest::Inside => true,
                    FrustumTest::Partial => false,
                }
            };

            let world = node.transform.world_matrix();
            for (_, movable) in node.attachments() {
                match movable {
                    Movable::Entity(k) => {
                        if let Some(entity) = entities.get_mut(k) {
                            if !entity.is_visible() {
                                continue;
                            }
                            if !skip_object_tests
                                && !frustum.intersects_aabb(entity.world_bounds())
                            {
                                continue;
                            }
                            entity.populate_queue(&world, queue, materials)?;
                        }
                    }
                    Movable::DebugVolume(k) => {
                        if let Some(volume) = volumes.get(k) {
                            if !volume.is_visible() {
                                continue;
                            }
                            if !skip_object_tests
                                && !frustum.intersects_aabb(volume.world_bounds())
                            {
                                continue;
                            }
                            volume.populate_queue(&world, queue, materials)?;
                        }
                    }
                }
            }

            for &child in node.children() {
                stack.push((child, skip_object_tests));
            }
        }

        Ok(())
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
