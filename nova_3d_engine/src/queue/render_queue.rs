/// Render queue — per-frame, reused-not-reallocated.
///
/// Visible movables deposit records here during phase 2. Groups are indexed
/// by small integer id and consumed in ascending order; within a group,
/// solids (radix-sorted by sort key) come before transparents (sorted
/// back-to-front by view-space depth). Records flagged for instancing land
/// in pending buckets instead and reach a group list only through the
/// InstanceBatchManager's aggregation pass — each source item ends up in
/// exactly one list or exactly one aggregate, never both.

use glam::Mat4;
use rdst::{RadixKey, RadixSort};
use rustc_hash::FxHashMap;
use crate::renderer::RenderRecord;

/// Queue group identifier. Groups render in ascending id order.
pub type QueueGroupId = u8;

/// Rendered before everything else (skyboxes, backdrops)
pub const GROUP_BACKGROUND: QueueGroupId = 0;
/// Default group for ordinary scene objects
pub const GROUP_DEFAULT: QueueGroupId = 50;
/// Rendered last (overlays, HUD)
pub const GROUP_OVERLAY: QueueGroupId = 100;

/// Fold a (queue-group, batch-id) pair into a single 64-bit batch key.
///
/// The encoding is a pure function of the unordered pair: the smaller value
/// goes in the low word, so the fold is symmetric in its two inputs.
pub fn fold_batch_key(group: QueueGroupId, batch_id: u32) -> u64 {
    let a = group as u64;
    let b = batch_id as u64;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (hi << 32) | lo
}

impl RadixKey for RenderRecord {
    const LEVELS: usize = 8;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.sort_key >> (level * 8)) as u8
    }
}

/// One queue group: a solid list and a transparent list.
#[derive(Default)]
pub struct RenderQueueGroup {
    solids: Vec<RenderRecord>,
    transparents: Vec<RenderRecord>,
}

impl RenderQueueGroup {
    /// Opaque records, in radix-sorted order after `RenderQueue::sort`.
    pub fn solids(&self) -> &[RenderRecord] {
        &self.solids
    }

    /// Transparent records, back-to-front after `RenderQueue::sort`.
    pub fn transparents(&self) -> &[RenderRecord] {
        &self.transparents
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty() && self.transparents.is_empty()
    }

    fn clear(&mut self) {
        self.solids.clear();
        self.transparents.clear();
    }
}

/// Pending records for one instancing bucket, reused across frames.
pub(crate) struct PendingBucket {
    pub group: QueueGroupId,
    pub batch_id: u32,
    pub records: Vec<RenderRecord>,
}

/// The per-frame queue. Owns its group lists and pending buckets
/// exclusively; no other component writes into it.
pub struct RenderQueue {
    groups: Vec<RenderQueueGroup>,
    pending: FxHashMap<u64, PendingBucket>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            pending: FxHashMap::default(),
        }
    }

    /// Empty every group and pending bucket, keeping backing capacity.
    ///
    /// Called at the start of each frame; the steady state allocates
    /// nothing.
    pub fn clear(&mut self) {
        for group in &mut self.groups {
            group.clear();
        }
        for bucket in self.pending.values_mut() {
            bucket.records.clear();
        }
    }

    fn group_entry(&mut self, id: QueueGroupId) -> &mut RenderQueueGroup {
        let index = id as usize;
        if index >= self.groups.len() {
            self.groups.resize_with(index + 1, RenderQueueGroup::default);
        }
        &mut self.groups[index]
    }

    /// Deposit a record into `group`, routed by its transparency flag.
    pub fn add_renderable(&mut self, record: RenderRecord, group: QueueGroupId) {
        let g = self.group_entry(group);
        if record.transparent {
            g.transparents.push(record);
        } else {
            g.solids.push(record);
        }
    }

    /// Deposit a record eligible for instancing into its pending bucket.
    ///
    /// The bucket is created lazily on first use and reused afterwards.
    pub fn add_instanced(&mut self, record: RenderRecord, group: QueueGroupId, batch_id: u32) {
        let key = fold_batch_key(group, batch_id);
        self.pending
            .entry(key)
            .or_insert_with(|| PendingBucket {
                group,
                batch_id,
                records: Vec::new(),
            })
            .records
            .push(record);
    }

    pub(crate) fn pending_buckets_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut PendingBucket> {
        self.pending.values_mut()
    }

    /// Group view by id, if any record ever targeted it.
    pub fn group(&self, id: QueueGroupId) -> Option<&RenderQueueGroup> {
        self.groups.get(id as usize)
    }

    /// Non-empty groups in ascending id order.
    pub fn groups(&self) -> impl Iterator<Item = (QueueGroupId, &RenderQueueGroup)> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.is_empty())
            .map(|(id, g)| (id as QueueGroupId, g))
    }

    /// Records across all groups (solid + transparent). Pending buckets do
    /// not count until aggregated.
    pub fn record_count(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.solids.len() + g.transparents.len())
            .sum()
    }

    /// Order every group for consumption: solids ascending by sort key
    /// (radix), transparents back-to-front by view-space depth of their
    /// world translation.
    pub fn sort(&mut self, view: &Mat4) {
        for group in &mut self.groups {
            group.solids.radix_sort_unstable();
            group.transparents.sort_unstable_by(|a, b| {
                let za = view.transform_point3(a.world.w_axis.truncate()).z;
                let zb = view.transform_point3(b.world.w_axis.truncate()).z;
                za.partial_cmp(&zb).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "render_queue_tests.rs"]
mod tests;
