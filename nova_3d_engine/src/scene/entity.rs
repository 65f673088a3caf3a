/// Movable leaves: entities, sub-entities, and debug volumes.
///
/// An Entity wraps a shared mesh; each sub-mesh gets a SubEntity carrying
/// the active material, the render-key list (one key per material pass),
/// and an optional instancing batch id. Sub-entities live and die with
/// their entity — replacing a material regenerates keys, never the
/// sub-entity itself.

use std::sync::Arc;
use bitflags::bitflags;
use glam::Mat4;
use slotmap::new_key_type;
use crate::engine_err;
use crate::error::Result;
use crate::math::Aabb;
use crate::queue::{QueueGroupId, RenderQueue, GROUP_DEFAULT, GROUP_OVERLAY};
use crate::renderer::{PrimitiveTopology, RenderRecord};
use crate::resource::{MaterialId, MaterialRegistry, Mesh};
use super::node::NodeKey;

new_key_type! {
    /// Stable key for an Entity within a SceneManager.
    pub struct EntityKey;

    /// Stable key for a DebugVolume within a SceneManager.
    pub struct DebugVolumeKey;
}

bitflags! {
    /// Per-entity render flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntityFlags: u32 {
        const VISIBLE        = 1 << 0;
        const CAST_SHADOW    = 1 << 1;
        const RECEIVE_SHADOW = 1 << 2;
    }
}

/// Sort/routing key for one material pass of a renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderKey {
    pub material: MaterialId,
    pub pass_id: u16,
    pub group: QueueGroupId,
    pub transparent: bool,
}

/// One sub-mesh worth of renderable state.
#[derive(Debug)]
pub struct SubEntity {
    sub_mesh_index: usize,
    material: MaterialId,
    default_material: MaterialId,
    batch_id: Option<u32>,
    keys: Vec<RenderKey>,
    seen_technique_generation: u32,
}

impl SubEntity {
    fn new(sub_mesh_index: usize, default_material: MaterialId) -> Self {
        Self {
            sub_mesh_index,
            material: default_material,
            default_material,
            batch_id: None,
            keys: Vec::new(),
            // Forces key generation on first sync
            seen_technique_generation: u32::MAX,
        }
    }

    pub fn sub_mesh_index(&self) -> usize {
        self.sub_mesh_index
    }

    /// Active material id.
    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// One key per pass of the active material's technique.
    pub fn keys(&self) -> &[RenderKey] {
        &self.keys
    }

    /// Identifies the geometry/material combination this sub-entity may be
    /// instanced under. `None` disables instancing.
    pub fn batch_id(&self) -> Option<u32> {
        self.batch_id
    }

    pub fn set_batch_id(&mut self, batch_id: Option<u32>) {
        self.batch_id = batch_id;
    }

    /// Assign a material. `None` falls back to the sub-mesh's default.
    ///
    /// Re-assigning the active material with an unchanged technique is a
    /// no-op: keys are not regenerated.
    pub fn set_material(
        &mut self,
        material: Option<MaterialId>,
        registry: &MaterialRegistry,
        group: QueueGroupId,
    ) -> Result<()> {
        let id = material.unwrap_or(self.default_material);
        let mat = registry.get(id).ok_or_else(|| {
            engine_err!("nova3d::SubEntity", NotFound, "material id {} is not registered", id)
        })?;

        if id == self.material && mat.technique_generation() == self.seen_technique_generation {
            return Ok(());
        }

        self.material = id;
        self.refresh_keys(registry, group)
    }

    /// Frame-boundary technique observer: regenerate keys if the active
    /// material's technique generation moved since last observed.
    pub fn sync_with_material(
        &mut self,
        registry: &MaterialRegistry,
        group: QueueGroupId,
    ) -> Result<()> {
        let mat = registry.get(self.material).ok_or_else(|| {
            engine_err!("nova3d::SubEntity", NotFound,
                "material id {} is not registered", self.material)
        })?;
        if mat.technique_generation() == self.seen_technique_generation {
            return Ok(());
        }
        self.refresh_keys(registry, group)
    }

    /// Rebuild the key list against the active material's pass count.
    ///
    /// More passes than keys: append fresh keys. Fewer: trim from the
    /// tail. Existing keys keep their position — never reindexed — and
    /// have their material/pass/transparency fields refreshed in place.
    fn refresh_keys(&mut self, registry: &MaterialRegistry, group: QueueGroupId) -> Result<()> {
        let mat = registry.get(self.material).ok_or_else(|| {
            engine_err!("nova3d::SubEntity", NotFound,
                "material id {} is not registered", self.material)
        })?;

        let pass_count = mat.pass_count();
        if self.keys.len() < pass_count {
            for pass in self.keys.len()..pass_count {
                self.keys.push(RenderKey {
                    material: self.material,
                    pass_id: pass as u16,
                    group,
                    transparent: mat.is_transparent(),
                });
            }
        } else if self.keys.len() > pass_count {
            self.keys.truncate(pass_count);
        }

        for (pass, key) in self.keys.iter_mut().enumerate() {
            key.material = self.material;
            key.pass_id = pass as u16;
            key.transparent = mat.is_transparent();
        }

        self.seen_technique_generation = mat.technique_generation();
        Ok(())
    }

    /// Rewrite the group id in place in every existing key.
    pub fn set_queue_group(&mut self, group: QueueGroupId) {
        for key in &mut self.keys {
            key.group = group;
        }
    }
}

/// A renderable object attachable to one scene node.
#[derive(Debug)]
pub struct Entity {
    name: String,
    mesh: Arc<Mesh>,
    sub_entities: Vec<SubEntity>,
    queue_group: QueueGroupId,
    flags: EntityFlags,
    world_bounds: Aabb,
    attached_to: Option<NodeKey>,
}

impl Entity {
    pub(crate) fn new(name: &str, mesh: Arc<Mesh>) -> Self {
        let sub_entities = (0..mesh.sub_mesh_count())
            .map(|i| {
                // sub_mesh(i) is valid by construction of the range
                let default_material = mesh.sub_mesh(i).map(|sm| sm.material()).unwrap_or(0);
                SubEntity::new(i, default_material)
            })
            .collect();

        Self {
            name: name.to_string(),
            mesh,
            sub_entities,
            queue_group: GROUP_DEFAULT,
            flags: EntityFlags::VISIBLE,
            world_bounds: Aabb::EMPTY,
            attached_to: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn sub_entity_count(&self) -> usize {
        self.sub_entities.len()
    }

    pub fn sub_entity(&self, index: usize) -> Option<&SubEntity> {
        self.sub_entities.get(index)
    }

    pub fn sub_entity_mut(&mut self, index: usize) -> Option<&mut SubEntity> {
        self.sub_entities.get_mut(index)
    }

    /// Sub-entity by its sub-mesh's name, or a not-found error.
    pub fn sub_entity_by_name(&mut self, name: &str) -> Result<&mut SubEntity> {
        let index = self.mesh.sub_mesh_index(name)?;
        Ok(&mut self.sub_entities[index])
    }

    pub fn queue_group(&self) -> QueueGroupId {
        self.queue_group
    }

    /// Reassign the queue group, propagating it into every existing key.
    pub fn set_queue_group(&mut self, group: QueueGroupId) {
        self.queue_group = group;
        for se in &mut self.sub_entities {
            se.set_queue_group(group);
        }
    }

    pub fn flags(&self) -> EntityFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: EntityFlags) {
        self.flags = flags;
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(EntityFlags::VISIBLE)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(EntityFlags::VISIBLE, visible);
    }

    /// Node this entity is currently attached to, if any.
    pub fn attached_to(&self) -> Option<NodeKey> {
        self.attached_to
    }

    pub(crate) fn set_attached_to(&mut self, node: Option<NodeKey>) {
        self.attached_to = node;
    }

    /// Mesh bounds brought into world space via the owning node's matrix.
    /// Refreshed during the tree's bounds aggregation.
    pub fn world_bounds(&self) -> &Aabb {
        &self.world_bounds
    }

    pub(crate) fn update_world_bounds(&mut self, world: &Mat4) {
        self.world_bounds = self.mesh.bounds().transformed(world);
    }

    /// Contribute one record per sub-entity per render key.
    ///
    /// Runs at the frame boundary, so this is also where stale key lists
    /// are regenerated from their material's technique generation.
    pub(crate) fn populate_queue(
        &mut self,
        world: &Mat4,
        queue: &mut RenderQueue,
        materials: &MaterialRegistry,
    ) -> Result<()> {
        let group = self.queue_group;
        for se in &mut self.sub_entities {
            se.sync_with_material(materials, group)?;

            let sub_mesh = match self.mesh.sub_mesh(se.sub_mesh_index) {
                Some(sm) => sm,
                None => continue,
            };

            for key in &se.keys {
                let record = RenderRecord {
                    topology: sub_mesh.topology(),
                    vertex_offset: sub_mesh.vertex_offset(),
                    vertex_count: sub_mesh.vertex_count(),
                    index_offset: sub_mesh.index_offset(),
                    index_count: sub_mesh.index_count(),
                    material: key.material,
                    pass_id: key.pass_id,
                    world: *world,
                    instance_count: 1,
                    sort_key: RenderRecord::sort_key_for(key.material, key.pass_id),
                    transparent: key.transparent,
                    batch_key: None,
                };
                match se.batch_id {
                    Some(batch_id) => queue.add_instanced(record, key.group, batch_id),
                    None => queue.add_renderable(record, key.group),
                }
            }
        }
        Ok(())
    }
}

/// A wireframe bounding-box renderable for debugging.
#[derive(Debug)]
pub struct DebugVolume {
    name: String,
    bounds: Aabb,
    material: MaterialId,
    queue_group: QueueGroupId,
    visible: bool,
    world_bounds: Aabb,
    attached_to: Option<NodeKey>,
}

impl DebugVolume {
    pub(crate) fn new(name: &str, bounds: Aabb, material: MaterialId) -> Self {
        Self {
            name: name.to_string(),
            bounds,
            material,
            // Draws on top of the scene by default
            queue_group: GROUP_OVERLAY,
            visible: true,
            world_bounds: Aabb::EMPTY,
            attached_to: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn queue_group(&self) -> QueueGroupId {
        self.queue_group
    }

    pub fn set_queue_group(&mut self, group: QueueGroupId) {
        self.queue_group = group;
    }

    pub fn attached_to(&self) -> Option<NodeKey> {
        self.attached_to
    }

    pub(crate) fn set_attached_to(&mut self, node: Option<NodeKey>) {
        self.attached_to = node;
    }

    pub fn world_bounds(&self) -> &Aabb {
        &self.world_bounds
    }

    pub(crate) fn update_world_bounds(&mut self, world: &Mat4) {
        self.world_bounds = self.bounds.transformed(world);
    }

    /// Contribute one line-list record covering the 12 box edges.
    pub(crate) fn populate_queue(
        &self,
        world: &Mat4,
        queue: &mut RenderQueue,
        materials: &MaterialRegistry,
    ) -> Result<()> {
        let mat = materials.get(self.material).ok_or_else(|| {
            engine_err!("nova3d::DebugVolume", NotFound,
                "material id {} is not registered", self.material)
        })?;

        let record = RenderRecord {
            topology: PrimitiveTopology::LineList,
            vertex_offset: 0,
            vertex_count: 24,
            index_offset: 0,
            index_count: 0,
            material: self.material,
            pass_id: 0,
            world: *world,
            instance_count: 1,
            sort_key: RenderRecord::sort_key_for(self.material, 0),
            transparent: mat.is_transparent(),
            batch_key: None,
        };
        queue.add_renderable(record, self.queue_group);
        Ok(())
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
