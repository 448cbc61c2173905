//! Attachment descriptors for native render passes.
//!
//! An [`AttachmentDescriptor`] says what format a render pass slot has and how its
//! contents are loaded, stored and cleared. Descriptors are built once when a pass
//! is created and re-targeted every frame.

use glam::Vec4;

use crate::backend::types::{LoadOp, RenderTargetId, StoreOp, TextureFormat};

/// A single slot of a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentDescriptor {
    /// Texture format of the slot.
    pub format: TextureFormat,
    /// Operation when the pass begins.
    pub load_op: LoadOp,
    /// Operation when the pass ends.
    pub store_op: StoreOp,
    /// Texture loaded from / stored to. `None` keeps the slot transient.
    pub target: Option<RenderTargetId>,
    /// Clear color, used when `load_op` is [`LoadOp::Clear`] on a color slot.
    pub clear_color: Vec4,
    /// Clear depth, used when `load_op` is [`LoadOp::Clear`] on a depth slot.
    pub clear_depth: f32,
    /// Clear stencil value.
    pub clear_stencil: u32,
}

impl AttachmentDescriptor {
    /// Create a transient attachment: contents are neither loaded nor stored.
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            load_op: LoadOp::DontCare,
            store_op: StoreOp::Discard,
            target: None,
            clear_color: Vec4::ZERO,
            clear_depth: 1.0,
            clear_stencil: 0,
        }
    }

    /// Bind the attachment to a target texture.
    ///
    /// `load_existing` keeps what the target holds when the pass begins,
    /// `store_results` writes the slot back when the pass ends.
    pub fn configure_target(
        &mut self,
        target: RenderTargetId,
        load_existing: bool,
        store_results: bool,
    ) {
        self.target = Some(target);
        if load_existing {
            self.load_op = LoadOp::Load;
        }
        if store_results {
            self.store_op = StoreOp::Store;
        }
    }

    /// Clear the attachment when the pass begins.
    pub fn configure_clear(&mut self, color: Vec4, depth: f32, stencil: u32) {
        self.clear_color = color;
        self.clear_depth = depth;
        self.clear_stencil = stencil;
        self.load_op = LoadOp::Clear;
    }

    /// Check if this slot holds depth.
    pub fn is_depth(&self) -> bool {
        self.format.is_depth()
    }
}
