/// Tests for Entity, SubEntity render-key maintenance, and DebugVolume

use super::*;
use crate::math::Aabb;
use crate::queue::{GROUP_BACKGROUND, GROUP_DEFAULT, GROUP_OVERLAY};
use crate::resource::{MaterialDesc, MaterialId, MaterialRegistry, Mesh, Technique};
use crate::utils::IdAllocator;
use glam::Vec3;

fn setup_materials() -> (MaterialRegistry, IdAllocator) {
    (MaterialRegistry::new(), IdAllocator::new())
}

fn create_material(
    registry: &mut MaterialRegistry,
    ids: &mut IdAllocator,
    name: &str,
    transparent: bool,
    passes: usize,
) -> MaterialId {
    registry.create(ids, MaterialDesc {
        name: name.to_string(),
        transparent,
        technique: Technique::with_pass_count(passes),
    })
}

fn box_entity(material: MaterialId) -> Entity {
    let mesh = Mesh::from_desc(Mesh::unit_box_desc("box", material)).unwrap();
    Entity::new("crate", mesh)
}

// ============================================================================
// Tests: Entity construction
// ============================================================================

#[test]
fn test_new_entity_defaults() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 1);
    let entity = box_entity(material);

    assert_eq!(entity.name(), "crate");
    assert_eq!(entity.sub_entity_count(), 1);
    assert_eq!(entity.queue_group(), GROUP_DEFAULT);
    assert!(entity.is_visible());
    assert!(entity.flags().contains(EntityFlags::VISIBLE));
    assert!(entity.world_bounds().is_empty());
    assert!(entity.attached_to().is_none());
    assert_eq!(entity.sub_entity(0).unwrap().material(), material);
}

#[test]
fn test_set_visible_updates_flags() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 1);
    let mut entity = box_entity(material);

    entity.set_visible(false);
    assert!(!entity.is_visible());
    assert!(!entity.flags().contains(EntityFlags::VISIBLE));
    entity.set_visible(true);
    assert!(entity.is_visible());
}

#[test]
fn test_sub_entity_by_name() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 1);
    let mut entity = box_entity(material);

    assert!(entity.sub_entity_by_name("box").is_ok());
    assert!(entity.sub_entity_by_name("lid").is_err());
}

#[test]
fn test_update_world_bounds_transforms_mesh_bounds() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 1);
    let mut entity = box_entity(material);

    entity.update_world_bounds(&Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
    assert_eq!(entity.world_bounds().min, Vec3::new(9.5, -0.5, -0.5));
    assert_eq!(entity.world_bounds().max, Vec3::new(10.5, 0.5, 0.5));
}

// ============================================================================
// Tests: Render keys
// ============================================================================

#[test]
fn test_keys_generated_on_first_sync() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 2);
    let mut entity = box_entity(material);

    let se = entity.sub_entity_mut(0).unwrap();
    assert!(se.keys().is_empty());
    se.sync_with_material(&registry, GROUP_DEFAULT).unwrap();

    let keys = entity.sub_entity(0).unwrap().keys();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].pass_id, 0);
    assert_eq!(keys[1].pass_id, 1);
    assert_eq!(keys[0].material, material);
    assert!(!keys[0].transparent);
}

#[test]
fn test_technique_growth_appends_keys() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 1);
    let mut entity = box_entity(material);
    entity.set_queue_group(GROUP_BACKGROUND);

    let se = entity.sub_entity_mut(0).unwrap();
    se.sync_with_material(&registry, GROUP_BACKGROUND).unwrap();
    assert_eq!(se.keys().len(), 1);

    // Grow the technique to three passes
    registry.get_mut(material).unwrap().set_technique(Technique::with_pass_count(3));
    se.sync_with_material(&registry, GROUP_BACKGROUND).unwrap();

    let keys = se.keys();
    assert_eq!(keys.len(), 3);
    // Appended keys carry the renderable's current group
    assert!(keys.iter().all(|k| k.group == GROUP_BACKGROUND));
    assert_eq!(keys.iter().map(|k| k.pass_id).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn test_technique_shrink_truncates_keys() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 3);
    let mut entity = box_entity(material);

    let se = entity.sub_entity_mut(0).unwrap();
    se.sync_with_material(&registry, GROUP_DEFAULT).unwrap();
    assert_eq!(se.keys().len(), 3);

    registry.get_mut(material).unwrap().set_technique(Technique::single_pass());
    se.sync_with_material(&registry, GROUP_DEFAULT).unwrap();
    assert_eq!(se.keys().len(), 1);
    assert_eq!(se.keys()[0].pass_id, 0);
}

#[test]
fn test_sync_without_change_is_noop() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 1);
    let mut entity = box_entity(material);

    let se = entity.sub_entity_mut(0).unwrap();
    se.sync_with_material(&registry, GROUP_DEFAULT).unwrap();
    let before = se.keys().to_vec();
    se.sync_with_material(&registry, GROUP_DEFAULT).unwrap();
    assert_eq!(se.keys(), before.as_slice());
}

#[test]
fn test_transparency_change_propagates_to_keys() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 1);
    let mut entity = box_entity(material);

    let se = entity.sub_entity_mut(0).unwrap();
    se.sync_with_material(&registry, GROUP_DEFAULT).unwrap();
    assert!(!se.keys()[0].transparent);

    registry.get_mut(material).unwrap().set_transparent(true);
    se.sync_with_material(&registry, GROUP_DEFAULT).unwrap();
    assert!(se.keys()[0].transparent);
}

#[test]
fn test_set_material_replaces_keys() {
    let (mut registry, mut ids) = setup_materials();
    let default = create_material(&mut registry, &mut ids, "default", false, 1);
    let other = create_material(&mut registry, &mut ids, "other", true, 2);
    let mut entity = box_entity(default);

    let se = entity.sub_entity_mut(0).unwrap();
    se.set_material(Some(other), &registry, GROUP_DEFAULT).unwrap();
    assert_eq!(se.material(), other);
    assert_eq!(se.keys().len(), 2);
    assert!(se.keys()[0].transparent);

    // None falls back to the sub-mesh default
    se.set_material(None, &registry, GROUP_DEFAULT).unwrap();
    assert_eq!(se.material(), default);
    assert_eq!(se.keys().len(), 1);
}

#[test]
fn test_set_material_unknown_fails() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 1);
    let mut entity = box_entity(material);

    let se = entity.sub_entity_mut(0).unwrap();
    assert!(se.set_material(Some(999), &registry, GROUP_DEFAULT).is_err());
    // The active material is untouched on failure
    assert_eq!(se.material(), material);
}

#[test]
fn test_set_queue_group_rewrites_existing_keys() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 2);
    let mut entity = box_entity(material);

    entity.sub_entity_mut(0).unwrap().sync_with_material(&registry, GROUP_DEFAULT).unwrap();
    entity.set_queue_group(GROUP_OVERLAY);

    assert_eq!(entity.queue_group(), GROUP_OVERLAY);
    assert!(entity.sub_entity(0).unwrap().keys().iter().all(|k| k.group == GROUP_OVERLAY));
}

// ============================================================================
// Tests: Queue population
// ============================================================================

#[test]
fn test_populate_queue_one_record_per_pass() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 3);
    let mut entity = box_entity(material);

    let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let mut queue = RenderQueue::new();
    entity.populate_queue(&world, &mut queue, &registry).unwrap();

    let solids = queue.group(GROUP_DEFAULT).unwrap().solids();
    assert_eq!(solids.len(), 3);
    for (pass, record) in solids.iter().enumerate() {
        assert_eq!(record.pass_id, pass as u16);
        assert_eq!(record.material, material);
        assert_eq!(record.world, world);
        assert_eq!(record.instance_count, 1);
        assert_eq!(record.sort_key, RenderRecord::sort_key_for(material, pass as u16));
    }
}

#[test]
fn test_populate_queue_with_batch_id_goes_pending() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "m", false, 1);
    let mut entity = box_entity(material);
    entity.sub_entity_mut(0).unwrap().set_batch_id(Some(7));

    let mut queue = RenderQueue::new();
    entity.populate_queue(&Mat4::IDENTITY, &mut queue, &registry).unwrap();

    // Nothing in the group lists until aggregation runs
    assert_eq!(queue.record_count(), 0);
    assert_eq!(queue.pending_buckets_mut().map(|b| b.records.len()).sum::<usize>(), 1);
}

#[test]
fn test_populate_queue_transparent_material() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "glass", true, 1);
    let mut entity = box_entity(material);

    let mut queue = RenderQueue::new();
    entity.populate_queue(&Mat4::IDENTITY, &mut queue, &registry).unwrap();

    let group = queue.group(GROUP_DEFAULT).unwrap();
    assert_eq!(group.solids().len(), 0);
    assert_eq!(group.transparents().len(), 1);
}

// ============================================================================
// Tests: DebugVolume
// ============================================================================

#[test]
fn test_debug_volume_defaults() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "wire", false, 1);
    let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    let volume = DebugVolume::new("marker", bounds, material);

    assert_eq!(volume.name(), "marker");
    assert_eq!(volume.queue_group(), GROUP_OVERLAY);
    assert!(volume.is_visible());
    assert_eq!(*volume.bounds(), bounds);
}

#[test]
fn test_debug_volume_populates_line_list_record() {
    let (mut registry, mut ids) = setup_materials();
    let material = create_material(&mut registry, &mut ids, "wire", false, 1);
    let volume = DebugVolume::new("marker", Aabb::new(Vec3::ZERO, Vec3::ONE), material);

    let mut queue = RenderQueue::new();
    volume.populate_queue(&Mat4::IDENTITY, &mut queue, &registry).unwrap();

    let record = queue.group(GROUP_OVERLAY).unwrap().solids()[0];
    assert_eq!(record.topology, PrimitiveTopology::LineList);
    assert_eq!(record.vertex_count, 24);
    assert_eq!(record.material, material);
}

#[test]
fn test_debug_volume_unknown_material_fails() {
    let (registry, _) = setup_materials();
    let volume = DebugVolume::new("marker", Aabb::new(Vec3::ZERO, Vec3::ONE), 42);

    let mut queue = RenderQueue::new();
    assert!(volume.populate_queue(&Mat4::IDENTITY, &mut queue, &registry).is_err());
}
