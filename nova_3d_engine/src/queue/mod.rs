//! Per-frame render queue and geometry-instance batching

mod render_queue;
mod instance_batch;

pub use render_queue::{
    RenderQueue, RenderQueueGroup, QueueGroupId, fold_batch_key,
    GROUP_BACKGROUND, GROUP_DEFAULT, GROUP_OVERLAY,
};
pub use instance_batch::{InstanceBatch, InstanceBatchManager};
