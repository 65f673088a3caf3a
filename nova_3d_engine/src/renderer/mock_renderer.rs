/// Mock Renderer for unit tests (no GPU required)
///
/// Records every call so tests can assert on frame bracketing, consumption
/// order, and the exact records submitted.

#[cfg(test)]
use crate::error::Result;
#[cfg(test)]
use super::{Renderer, RenderRecord, Viewport};

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockRenderer {
    pub frames_begun: u32,
    pub frames_ended: u32,
    pub viewports: Vec<Viewport>,
    /// Every submitted record, plain and instanced, in consumption order
    pub draws: Vec<RenderRecord>,
    /// Byte length of the transform payload for each instanced draw
    pub instanced_payload_lens: Vec<usize>,
}

#[cfg(test)]
impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total submissions (plain + instanced)
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }
}

#[cfg(test)]
impl Renderer for MockRenderer {
    fn begin_frame(&mut self) -> Result<()> {
        self.frames_begun += 1;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.frames_ended += 1;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: &Viewport) -> Result<()> {
        self.viewports.push(*viewport);
        Ok(())
    }

    fn draw(&mut self, record: &RenderRecord) -> Result<()> {
        self.draws.push(*record);
        Ok(())
    }

    fn draw_instanced(&mut self, record: &RenderRecord, instance_transforms: &[u8]) -> Result<()> {
        self.draws.push(*record);
        self.instanced_payload_lens.push(instance_transforms.len());
        Ok(())
    }
}
