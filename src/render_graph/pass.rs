//! Render pass definitions for the render graph

use crate::backend::traits::{BackendResult, RenderContext};
use crate::scene::RenderingData;
use std::any::Any;

/// Unique identifier for a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassId(pub(crate) u32);

/// When in the frame a pass runs.
///
/// Variants are declared in frame order and carry the numeric slot of that
/// point in the frame, so comparing events compares their slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u32)]
pub enum RenderPassEvent {
    BeforeRendering = 0,
    BeforeRenderingShadows = 50,
    AfterRenderingShadows = 100,
    BeforeRenderingPrePasses = 150,
    AfterRenderingPrePasses = 200,
    BeforeRenderingOpaques = 250,
    #[default]
    AfterRenderingOpaques = 300,
    BeforeRenderingSkybox = 350,
    AfterRenderingSkybox = 400,
    BeforeRenderingTransparents = 450,
    AfterRenderingTransparents = 500,
    BeforeRenderingPostProcessing = 550,
    AfterRenderingPostProcessing = 600,
    AfterRendering = 1000,
}

impl RenderPassEvent {
    /// Numeric slot of the event
    pub fn value(self) -> u32 {
        self as u32
    }
}

/// Trait for render passes
pub trait RenderPass {
    /// Get the pass name for debugging
    fn name(&self) -> &str;

    /// Where in the frame the pass is scheduled
    fn event(&self) -> RenderPassEvent;

    /// Record the pass for one frame
    fn execute(
        &mut self,
        ctx: &mut dyn RenderContext,
        rendering_data: &RenderingData,
    ) -> BackendResult<()>;

    /// Allow downcasting
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Metadata about a pass in the graph
#[derive(Debug, Clone)]
pub struct PassNode {
    pub id: PassId,
    pub name: String,
    pub event: RenderPassEvent,
}
