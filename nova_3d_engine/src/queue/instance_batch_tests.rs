/// Tests for InstanceBatchManager

use super::*;
use crate::queue::{fold_batch_key, RenderQueue, GROUP_DEFAULT, GROUP_OVERLAY};
use crate::renderer::{PrimitiveTopology, RenderRecord};
use glam::Vec3;

fn instanced_record(material: u32, position: Vec3) -> RenderRecord {
    RenderRecord {
        topology: PrimitiveTopology::TriangleList,
        vertex_offset: 0,
        vertex_count: 24,
        index_offset: 0,
        index_count: 36,
        material,
        pass_id: 0,
        world: Mat4::from_translation(position),
        instance_count: 1,
        sort_key: RenderRecord::sort_key_for(material, 0),
        transparent: false,
        batch_key: None,
    }
}

// ============================================================================
// Tests: Aggregation
// ============================================================================

#[test]
fn test_aggregate_with_no_pending_records() {
    let mut queue = RenderQueue::new();
    let mut batches = InstanceBatchManager::new();
    batches.aggregate(&mut queue);
    assert_eq!(queue.record_count(), 0);
    assert_eq!(batches.batch_count(), 0);
}

#[test]
fn test_same_batch_id_folds_to_one_record() {
    let mut queue = RenderQueue::new();
    let mut batches = InstanceBatchManager::new();

    for i in 0..5 {
        queue.add_instanced(
            instanced_record(1, Vec3::new(i as f32, 0.0, 0.0)),
            GROUP_DEFAULT,
            7,
        );
    }
    batches.aggregate(&mut queue);

    // Exactly one aggregate, counted once, positioned at the instance mean
    assert_eq!(queue.record_count(), 1);
    let aggregate = queue.group(GROUP_DEFAULT).unwrap().solids()[0];
    assert_eq!(aggregate.instance_count, 5);
    assert_eq!(aggregate.world, Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
    assert_eq!(aggregate.batch_key, Some(fold_batch_key(GROUP_DEFAULT, 7)));

    let batch = batches.batch(fold_batch_key(GROUP_DEFAULT, 7)).unwrap();
    assert_eq!(batch.instance_count(), 5);
    assert_eq!(batch.transforms()[3], Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)));
}

#[test]
fn test_distinct_batch_ids_stay_separate() {
    let mut queue = RenderQueue::new();
    let mut batches = InstanceBatchManager::new();

    queue.add_instanced(instanced_record(1, Vec3::ZERO), GROUP_DEFAULT, 7);
    queue.add_instanced(instanced_record(1, Vec3::X), GROUP_DEFAULT, 7);
    queue.add_instanced(instanced_record(1, Vec3::Y), GROUP_DEFAULT, 9);
    batches.aggregate(&mut queue);

    // Two buckets, two aggregates in the solid list
    let solids = queue.group(GROUP_DEFAULT).unwrap().solids();
    assert_eq!(solids.len(), 2);
    assert_eq!(batches.batch_count(), 2);

    let counts: Vec<u32> = {
        let mut c: Vec<u32> = solids.iter().map(|r| r.instance_count).collect();
        c.sort_unstable();
        c
    };
    assert_eq!(counts, vec![1, 2]);
}

#[test]
fn test_same_batch_id_in_different_groups_stays_separate() {
    let mut queue = RenderQueue::new();
    let mut batches = InstanceBatchManager::new();

    queue.add_instanced(instanced_record(1, Vec3::ZERO), GROUP_DEFAULT, 7);
    queue.add_instanced(instanced_record(1, Vec3::X), GROUP_OVERLAY, 7);
    batches.aggregate(&mut queue);

    assert_eq!(batches.batch_count(), 2);
    assert_eq!(queue.group(GROUP_DEFAULT).unwrap().solids().len(), 1);
    assert_eq!(queue.group(GROUP_OVERLAY).unwrap().solids().len(), 1);
}

#[test]
fn test_transparent_aggregate_routes_to_transparents() {
    let mut queue = RenderQueue::new();
    let mut batches = InstanceBatchManager::new();

    let mut r = instanced_record(1, Vec3::ZERO);
    r.transparent = true;
    queue.add_instanced(r, GROUP_DEFAULT, 3);
    batches.aggregate(&mut queue);

    let group = queue.group(GROUP_DEFAULT).unwrap();
    assert_eq!(group.solids().len(), 0);
    assert_eq!(group.transparents().len(), 1);
}

#[test]
fn test_transparent_aggregate_sorts_at_instance_depth() {
    let mut queue = RenderQueue::new();
    let mut batches = InstanceBatchManager::new();

    // Two instances around z = -20, one loose record at z = -10
    for z in [-18.0, -22.0] {
        let mut r = instanced_record(1, Vec3::new(0.0, 0.0, z));
        r.transparent = true;
        queue.add_instanced(r, GROUP_DEFAULT, 3);
    }
    let mut near = instanced_record(2, Vec3::new(0.0, 0.0, -10.0));
    near.transparent = true;
    queue.add_renderable(near, GROUP_DEFAULT);

    batches.aggregate(&mut queue);
    queue.sort(&Mat4::IDENTITY);

    // Back-to-front: the farther aggregate draws before the near record
    let transparents = queue.group(GROUP_DEFAULT).unwrap().transparents();
    assert_eq!(transparents.len(), 2);
    assert_eq!(transparents[0].instance_count, 2);
    assert_eq!(transparents[1].material, 2);
}

// ============================================================================
// Tests: Persistence across frames
// ============================================================================

#[test]
fn test_batches_persist_and_transforms_reset() {
    let mut queue = RenderQueue::new();
    let mut batches = InstanceBatchManager::new();

    for i in 0..4 {
        queue.add_instanced(
            instanced_record(1, Vec3::new(i as f32, 0.0, 0.0)),
            GROUP_DEFAULT,
            7,
        );
    }
    batches.aggregate(&mut queue);

    // Next frame: fewer instances under the same key
    queue.clear();
    queue.add_instanced(instanced_record(1, Vec3::ZERO), GROUP_DEFAULT, 7);
    batches.aggregate(&mut queue);

    assert_eq!(batches.batch_count(), 1);
    let batch = batches.batch(fold_batch_key(GROUP_DEFAULT, 7)).unwrap();
    assert_eq!(batch.instance_count(), 1);

    let aggregate = queue.group(GROUP_DEFAULT).unwrap().solids()[0];
    assert_eq!(aggregate.instance_count, 1);
}

#[test]
fn test_clear_drops_batches() {
    let mut queue = RenderQueue::new();
    let mut batches = InstanceBatchManager::new();

    queue.add_instanced(instanced_record(1, Vec3::ZERO), GROUP_DEFAULT, 7);
    batches.aggregate(&mut queue);
    assert_eq!(batches.batch_count(), 1);

    batches.clear();
    assert_eq!(batches.batch_count(), 0);
}

// ============================================================================
// Tests: Instance payload
// ============================================================================

#[test]
fn test_transform_bytes_layout() {
    let mut queue = RenderQueue::new();
    let mut batches = InstanceBatchManager::new();

    queue.add_instanced(instanced_record(1, Vec3::ZERO), GROUP_DEFAULT, 7);
    queue.add_instanced(instanced_record(1, Vec3::X), GROUP_DEFAULT, 7);
    batches.aggregate(&mut queue);

    let batch = batches.batch(fold_batch_key(GROUP_DEFAULT, 7)).unwrap();
    // Two column-major Mat4s, 64 bytes each
    assert_eq!(batch.transform_bytes().len(), 128);
}
