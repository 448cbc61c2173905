//! Core backend abstraction traits
//!
//! These traits define the interface the host renderer exposes to passes. Both the
//! recording backend and the Vulkan backend implement [`RenderContext`].

use crate::render_graph::command::CommandBuffer;
use crate::render_graph::drawing::{CullingResults, DrawingSettings, FilteringSettings};
use crate::render_graph::scope::{RenderPassDescriptor, SubpassDescriptor};
use crate::scene::Camera;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Render pass has no attachments")]
    EmptyRenderPass,
    #[error("Render pass extent must be non-zero, got {width}x{height}")]
    ZeroExtent { width: u32, height: u32 },
    #[error("Sample count {0} is not a power of two between 1 and 64")]
    InvalidSampleCount(u32),
    #[error("Attachment index {index} is out of range for a pass with {count} attachments")]
    InvalidAttachmentIndex { index: usize, count: usize },
    #[error("Attachment {index} cannot be used as depth: {reason}")]
    InvalidDepthAttachment { index: usize, reason: &'static str },
    #[error("Attachment {index} is read as an input while depth is writable in the same subpass")]
    InputAttachmentConflict { index: usize },
    #[error("A render pass is already active")]
    NestedRenderPass,
    #[error("No render pass is active")]
    NoActiveRenderPass,
    #[error("Draw issued outside of an active subpass")]
    SubpassNotActive,
    #[error("Failed to create render pass: {0}")]
    RenderPassCreationFailed(String),
    #[error("Failed to create framebuffer: {0}")]
    FramebufferCreationFailed(String),
    #[error("Unknown render target {0:?}")]
    UnknownRenderTarget(crate::backend::types::RenderTargetId),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a texture view owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureViewHandle(pub u64);

/// Render context the host hands to a pass for one frame.
///
/// Scope ordering (`begin_render_pass` → `begin_subpass` → draws → `end_subpass` →
/// `end_render_pass`) is driven by the guards in [`crate::render_graph::scope`];
/// passes should not call the begin/end methods directly.
pub trait RenderContext {
    /// Begin a render pass over the given attachments
    fn begin_render_pass(&mut self, desc: &RenderPassDescriptor) -> BackendResult<()>;

    /// Begin subpass `index` of the active render pass
    fn begin_subpass(&mut self, index: u32, desc: &SubpassDescriptor) -> BackendResult<()>;

    /// End the active subpass
    fn end_subpass(&mut self);

    /// End the active render pass.
    ///
    /// Backends that defer native work until here report its failures.
    fn end_render_pass(&mut self) -> BackendResult<()>;

    /// Draw the visible renderers selected by `filtering`, ordered by `drawing`
    fn draw_renderers(
        &mut self,
        cull_results: &CullingResults,
        drawing: &DrawingSettings,
        filtering: &FilteringSettings,
    ) -> BackendResult<()>;

    /// Draw the camera's skybox behind everything already drawn
    fn draw_skybox(&mut self, camera: &Camera) -> BackendResult<()>;

    /// Replay a recorded command buffer inside the active subpass
    fn execute_command_buffer(&mut self, cmd: &CommandBuffer) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::InvalidAttachmentIndex { index: 3, count: 2 };
        assert_eq!(
            err.to_string(),
            "Attachment index 3 is out of range for a pass with 2 attachments"
        );
        assert_eq!(BackendError::OutOfMemory.to_string(), "Out of memory");
        assert_eq!(
            BackendError::InvalidSampleCount(3).to_string(),
            "Sample count 3 is not a power of two between 1 and 64"
        );
    }
}
