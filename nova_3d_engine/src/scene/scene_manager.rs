/// SceneManager — owns one scene and runs its frame loop.
///
/// Single-threaded by construction: every frame runs three phases in order
/// on the caller's thread. (1) tree update, recomposing stale transforms
/// parent-before-child and re-aggregating bounds; (2) queue population,
/// culling against the active camera's frustum, folding instance buckets
/// into aggregates, and sorting; (3) consumption, handing every record to
/// the renderer between begin_frame and end_frame.

use std::sync::Arc;
use slotmap::SlotMap;
use rustc_hash::FxHashMap;
use crate::camera::CameraManager;
use crate::error::Result;
use crate::math::Aabb;
use crate::queue::{InstanceBatchManager, RenderQueue};
use crate::renderer::{Renderer, Viewport};
use crate::resource::{MaterialDesc, MaterialId, MaterialRegistry, Mesh};
use crate::utils::IdAllocator;
use crate::{engine_bail, engine_err, engine_warn};
use super::entity::{DebugVolume, DebugVolumeKey, Entity, EntityKey};
use super::node::{Movable, NodeKey};
use super::tree::SceneTree;

pub struct SceneManager {
    tree: SceneTree,
    entities: SlotMap<EntityKey, Entity>,
    entity_names: FxHashMap<String, EntityKey>,
    volumes: SlotMap<DebugVolumeKey, DebugVolume>,
    materials: MaterialRegistry,
    cameras: CameraManager,
    queue: RenderQueue,
    batches: InstanceBatchManager,
    material_ids: IdAllocator,
}

impl SceneManager {
    pub fn new() -> Self {
        Self {
            tree: SceneTree::new(),
            entities: SlotMap::with_key(),
            entity_names: FxHashMap::default(),
            volumes: SlotMap::with_key(),
            materials: MaterialRegistry::new(),
            cameras: CameraManager::new(),
            queue: RenderQueue::new(),
            batches: InstanceBatchManager::new(),
            material_ids: IdAllocator::new(),
        }
    }

    // ===== ACCESS =====

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeKey {
        self.tree.root()
    }

    pub fn cameras(&self) -> &CameraManager {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut CameraManager {
        &mut self.cameras
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialRegistry {
        &mut self.materials
    }

    /// Last frame's populated queue (valid until the next render call).
    pub fn queue(&self) -> &RenderQueue {
        &self.queue
    }

    pub fn batches(&self) -> &InstanceBatchManager {
        &self.batches
    }

    // ===== MATERIALS =====

    pub fn create_material(&mut self, desc: MaterialDesc) -> MaterialId {
        self.materials.create(&mut self.material_ids, desc)
    }

    pub fn destroy_material(&mut self, id: MaterialId) -> Result<()> {
        self.materials.remove(&mut self.material_ids, id)
    }

    // ===== ENTITIES =====

    /// Create an entity over a shared mesh. Names are unique per manager.
    pub fn create_entity(&mut self, name: &str, mesh: Arc<Mesh>) -> Result<EntityKey> {
        if self.entity_names.contains_key(name) {
            engine_bail!("nova3d::SceneManager", InvalidResource,
                "an entity named '{}' already exists", name);
        }
        let key = self.entities.insert(Entity::new(name, mesh));
        self.entity_names.insert(name.to_string(), key);
        Ok(key)
    }

    pub fn entity(&self, key: EntityKey) -> Result<&Entity> {
        self.entities.get(key).ok_or_else(|| {
            engine_err!("nova3d::SceneManager", NotFound, "entity key {:?} does not exist", key)
        })
    }

    pub fn entity_mut(&mut self, key: EntityKey) -> Result<&mut Entity> {
        self.entities.get_mut(key).ok_or_else(|| {
            engine_err!("nova3d::SceneManager", NotFound, "entity key {:?} does not exist", key)
        })
    }

    pub fn entity_by_name(&self, name: &str) -> Result<EntityKey> {
        self.entity_names.get(name).copied().ok_or_else(|| {
            engine_err!("nova3d::SceneManager", NotFound, "no entity named '{}'", name)
        })
    }

    /// Destroy an entity, detaching it from its node first.
    pub fn destroy_entity(&mut self, key: EntityKey) -> Result<()> {
        let (name, attached_to) = {
            let entity = self.entity(key)?;
            (entity.name().to_string(), entity.attached_to())
        };
        if let Some(node) = attached_to {
            if let Ok(node) = self.tree.node_mut(node) {
                node.detach(&name);
            }
        }
        self.entity_names.remove(&name);
        self.entities.remove(key);
        Ok(())
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ===== DEBUG VOLUMES =====

    /// Create a wireframe box renderable over `bounds`.
    pub fn create_debug_volume(
        &mut self,
        name: &str,
        bounds: Aabb,
        material: MaterialId,
    ) -> Result<DebugVolumeKey> {
        if self.materials.get(material).is_none() {
            engine_bail!("nova3d::SceneManager", NotFound,
                "debug volume '{}' references unregistered material id {}", name, material);
        }
        Ok(self.volumes.insert(DebugVolume::new(name, bounds, material)))
    }

    pub fn debug_volume(&self, key: DebugVolumeKey) -> Result<&DebugVolume> {
        self.volumes.get(key).ok_or_else(|| {
            engine_err!("nova3d::SceneManager", NotFound,
                "debug volume key {:?} does not exist", key)
        })
    }

    pub fn debug_volume_mut(&mut self, key: DebugVolumeKey) -> Result<&mut DebugVolume> {
        self.volumes.get_mut(key).ok_or_else(|| {
            engine_err!("nova3d::SceneManager", NotFound,
                "debug volume key {:?} does not exist", key)
        })
    }

    pub fn destroy_debug_volume(&mut self, key: DebugVolumeKey) -> Result<()> {
        let (name, attached_to) = {
            let volume = self.debug_volume(key)?;
            (volume.name().to_string(), volume.attached_to())
        };
        if let Some(node) = attached_to {
            if let Ok(node) = self.tree.node_mut(node) {
                node.detach(&name);
            }
        }
        self.volumes.remove(key);
        Ok(())
    }

    // ===== ATTACHMENT =====

    /// Attach an entity to a node. Attaching under a name already occupied
    /// on that node replaces the occupant (which ends up detached);
    /// attaching an entity already attached elsewhere moves it.
    pub fn attach_entity(&mut self, node: NodeKey, key: EntityKey) -> Result<()> {
        let name = self.entity(key)?.name().to_string();

        if let Some(old_node) = self.entity(key)?.attached_to() {
            if let Ok(old) = self.tree.node_mut(old_node) {
                old.detach(&name);
            }
        }

        let replaced = self.tree.node_mut(node)?.attach(&name, Movable::Entity(key));
        if let Some(movable) = replaced {
            engine_warn!("nova3d::SceneManager",
                "attachment '{}' replaced an existing object on the node", name);
            self.clear_attachment_backref(movable);
        }

        self.entities[key].set_attached_to(Some(node));
        Ok(())
    }

    /// Attach a debug volume to a node, with the same replace semantics as
    /// [`attach_entity`](Self::attach_entity).
    pub fn attach_debug_volume(&mut self, node: NodeKey, key: DebugVolumeKey) -> Result<()> {
        let name = self.debug_volume(key)?.name().to_string();

        if let Some(old_node) = self.debug_volume(key)?.attached_to() {
            if let Ok(old) = self.tree.node_mut(old_node) {
                old.detach(&name);
            }
        }

        let replaced = self
            .tree
            .node_mut(node)?
            .attach(&name, Movable::DebugVolume(key));
        if let Some(movable) = replaced {
            engine_warn!("nova3d::SceneManager",
                "attachment '{}' replaced an existing object on the node", name);
            self.clear_attachment_backref(movable);
        }

        self.volumes[key].set_attached_to(Some(node));
        Ok(())
    }

    /// Detach the named object from a node. Returns what was detached, if
    /// anything.
    pub fn detach_object(&mut self, node: NodeKey, name: &str) -> Result<Option<Movable>> {
        let detached = self.tree.node_mut(node)?.detach(name);
        if let Some(movable) = detached {
            self.clear_attachment_backref(movable);
        }
        Ok(detached)
    }

    fn clear_attachment_backref(&mut self, movable: Movable) {
        match movable {
            Movable::Entity(k) => {
                if let Some(entity) = self.entities.get_mut(k) {
                    entity.set_attached_to(None);
                }
            }
            Movable::DebugVolume(k) => {
                if let Some(volume) = self.volumes.get_mut(k) {
                    volume.set_attached_to(None);
                }
            }
        }
    }

    // ===== NODES =====

    pub fn create_child_node(&mut self, parent: NodeKey, name: &str) -> Result<NodeKey> {
        self.tree.create_child(parent, name)
    }

    /// Destroy a node and its subtree. Attached objects survive, detached.
    pub fn destroy_node(&mut self, key: NodeKey) -> Result<()> {
        let detached = self.tree.destroy_node(key)?;
        for movable in detached {
            self.clear_attachment_backref(movable);
        }
        Ok(())
    }

    // ===== FRAME =====

    /// Render one frame through `camera_name` into `viewport`.
    pub fn render_scene(
        &mut self,
        viewport: Viewport,
        camera_name: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        // Phase 1: transforms and bounds
        self.tree.update(&mut self.entities, &mut self.volumes);

        let camera = self.cameras.camera_mut(camera_name)?;
        camera.notify_viewport(&viewport);
        if let Some(node_key) = camera.attached_node() {
            let node = self.tree.node(node_key)?;
            let world = node.transform().world_matrix();
            let generation = node.transform().generation();
            camera.notify_parent_transform(&world, generation);
        }
        let frustum = *camera.frustum();
        let view = camera.view_matrix();

        // Phase 2: populate, batch, sort
        self.queue.clear();
        self.tree.find_visible_objects(
            &frustum,
            &mut self.queue,
            &mut self.entities,
            &self.volumes,
            &self.materials,
        )?;
        self.batches.aggregate(&mut self.queue);
        self.queue.sort(&view);

        // Phase 3: consumption
        renderer.begin_frame()?;
        renderer.set_viewport(&viewport)?;
        for (_, group) in self.queue.groups() {
            for record in group.solids().iter().chain(group.transparents().iter()) {
                match record.batch_key {
                    Some(key) => {
                        let batch = self.batches.batch(key).ok_or_else(|| {
                            engine_err!("nova3d::SceneManager", Structural,
                                "aggregate record references missing batch key {:#x}", key)
                        })?;
                        renderer.draw_instanced(record, batch.transform_bytes())?;
                    }
                    None => renderer.draw(record)?,
                }
            }
        }
        renderer.end_frame()
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_manager_tests.rs"]
mod tests;
