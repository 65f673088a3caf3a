/// Instance batching — folds duplicate-geometry records into one draw.
///
/// Batches are persistent (created lazily, keyed by the same 64-bit fold as
/// the queue's pending buckets) while their instance lists are per-frame.
/// The aggregation pass runs once per frame, after visibility and before
/// consumption, in O(total pending records).

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;
use crate::renderer::RenderRecord;
use super::render_queue::{fold_batch_key, QueueGroupId, RenderQueue};

/// A persistent batch of identical-geometry instances.
pub struct InstanceBatch {
    key: u64,
    group: QueueGroupId,
    batch_id: u32,
    transforms: Vec<Mat4>,
}

impl InstanceBatch {
    fn new(key: u64, group: QueueGroupId, batch_id: u32) -> Self {
        Self {
            key,
            group,
            batch_id,
            transforms: Vec::new(),
        }
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn group(&self) -> QueueGroupId {
        self.group
    }

    pub fn batch_id(&self) -> u32 {
        self.batch_id
    }

    /// This frame's per-instance world transforms.
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    pub fn instance_count(&self) -> usize {
        self.transforms.len()
    }

    /// Transform array as raw bytes (column-major Mat4 per instance), ready
    /// for the renderer's instance buffer upload.
    pub fn transform_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transforms)
    }
}

/// Owns all instance batches of one SceneManager.
pub struct InstanceBatchManager {
    batches: FxHashMap<u64, InstanceBatch>,
    /// Aggregates built during the pass, flushed after the bucket iteration
    emit_scratch: Vec<(QueueGroupId, RenderRecord)>,
}

impl InstanceBatchManager {
    pub fn new() -> Self {
        Self {
            batches: FxHashMap::default(),
            emit_scratch: Vec::new(),
        }
    }

    /// Fold the queue's pending buckets into aggregate records.
    ///
    /// For every non-empty bucket: obtain or create the persistent batch,
    /// reset its instance list, push every pending record's world
    /// transform, then emit exactly one aggregate record (the bucket's
    /// first record as template, `instance_count = N`) into the bucket's
    /// group. The aggregate's world holds the mean instance translation, so
    /// transparent aggregates depth-sort against single records. Buckets
    /// are drained, so no source record is ever counted twice.
    pub fn aggregate(&mut self, queue: &mut RenderQueue) {
        debug_assert!(self.emit_scratch.is_empty());

        for bucket in queue.pending_buckets_mut() {
            if bucket.records.is_empty() {
                continue;
            }

            let key = fold_batch_key(bucket.group, bucket.batch_id);
            let batch = self
                .batches
                .entry(key)
                .or_insert_with(|| InstanceBatch::new(key, bucket.group, bucket.batch_id));

            batch.transforms.clear();
            let mut centroid = Vec3::ZERO;
            for record in &bucket.records {
                batch.transforms.push(record.world);
                centroid += record.world.w_axis.truncate();
            }
            centroid /= batch.transforms.len() as f32;

            let mut aggregate = bucket.records[0];
            aggregate.instance_count = batch.transforms.len() as u32;
            aggregate.world = Mat4::from_translation(centroid);
            aggregate.batch_key = Some(key);
            self.emit_scratch.push((bucket.group, aggregate));

            bucket.records.clear();
        }

        for (group, record) in self.emit_scratch.drain(..) {
            queue.add_renderable(record, group);
        }
    }

    pub fn batch(&self, key: u64) -> Option<&InstanceBatch> {
        self.batches.get(&key)
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Drop all persistent batches (e.g. when the scene is cleared).
    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

impl Default for InstanceBatchManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "instance_batch_tests.rs"]
mod tests;
