//! Renderer collaborator interface
//!
//! The core does not issue draw calls itself: it fills a RenderQueue and
//! hands each record to an external [`Renderer`] between `begin_frame` and
//! `end_frame`. Backends implement this trait; tests use the recording
//! [`MockRenderer`].

pub mod mock_renderer;

use glam::Mat4;
use crate::error::Result;
use crate::resource::MaterialId;

#[cfg(test)]
pub use mock_renderer::MockRenderer;

/// Primitive assembly mode for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    TriangleList,
    TriangleStrip,
}

/// Target rectangle for a frame, in pixels.
///
/// The core has no windowing layer; the caller owns the surface and passes
/// its dimensions here (cameras derive their aspect ratio from them).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Viewport at the origin with the given dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self { x: 0.0, y: 0.0, width, height }
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// One draw submission.
///
/// Produced by visible movables during queue population and consumed by the
/// renderer during phase 3. `instance_count > 1` together with a set
/// `batch_key` marks an aggregate emitted by instance batching; its
/// per-instance transforms travel separately as a byte slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRecord {
    pub topology: PrimitiveTopology,
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
    pub material: MaterialId,
    pub pass_id: u16,
    pub world: Mat4,
    pub instance_count: u32,
    /// Solid-list radix order: material in the high bits, pass below it
    pub sort_key: u64,
    pub transparent: bool,
    /// Set on aggregate records; keys into the InstanceBatchManager
    pub batch_key: Option<u64>,
}

impl RenderRecord {
    /// Compose the solid-list sort key from material and pass ids.
    pub fn sort_key_for(material: MaterialId, pass_id: u16) -> u64 {
        ((material as u64) << 16) | pass_id as u64
    }
}

/// Draw-call consumer.
///
/// One `begin_frame`/`end_frame` pair brackets the consumption of a
/// populated queue. The core calls `draw` for plain records and
/// `draw_instanced` for aggregates, passing the batch's transform array as
/// raw bytes (column-major Mat4 per instance).
pub trait Renderer {
    fn begin_frame(&mut self) -> Result<()>;

    fn end_frame(&mut self) -> Result<()>;

    fn set_viewport(&mut self, viewport: &Viewport) -> Result<()>;

    fn draw(&mut self, record: &RenderRecord) -> Result<()>;

    fn draw_instanced(&mut self, record: &RenderRecord, instance_transforms: &[u8]) -> Result<()>;
}
