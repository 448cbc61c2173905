//! Scoped render pass and subpass entry.
//!
//! A native render pass is opened with [`begin_scoped_render_pass`] and split into
//! subpasses with [`ScopedRenderPass::begin_scoped_subpass`]. Both return guards
//! that close their scope on drop, so an early `?` return or a panic still leaves
//! the context balanced. Call [`ScopedRenderPass::end`] to see errors raised when
//! the pass closes; a dropped pass can only log them.
//!
//! The subpass guard mutably borrows the pass guard, which makes it impossible to
//! open a second subpass, or end the pass, while a subpass is still open.
//!
//! Descriptors are moved into the begin calls and dropped there. Contexts copy
//! whatever they need to keep.

use std::ops::{Deref, DerefMut};

use crate::backend::traits::{BackendError, BackendResult, RenderContext};
use crate::backend::types::TextureFormat;
use crate::render_graph::attachment::AttachmentDescriptor;

/// MSAA sample counts a render pass may use.
pub const SUPPORTED_SAMPLE_COUNTS: [u32; 7] = [1, 2, 4, 8, 16, 32, 64];

/// Everything needed to open a native render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub attachments: Vec<AttachmentDescriptor>,
    /// Slot holding depth, if the pass has one.
    pub depth_attachment_index: Option<usize>,
}

impl RenderPassDescriptor {
    /// Check the attachment set before it reaches the context.
    pub fn validate(&self) -> BackendResult<()> {
        if self.attachments.is_empty() {
            return Err(BackendError::EmptyRenderPass);
        }
        if self.width == 0 || self.height == 0 {
            return Err(BackendError::ZeroExtent {
                width: self.width,
                height: self.height,
            });
        }
        if !SUPPORTED_SAMPLE_COUNTS.contains(&self.sample_count) {
            return Err(BackendError::InvalidSampleCount(self.sample_count));
        }
        if let Some(index) = self.depth_attachment_index {
            let attachment =
                self.attachments
                    .get(index)
                    .ok_or(BackendError::InvalidAttachmentIndex {
                        index,
                        count: self.attachments.len(),
                    })?;
            if !attachment.is_depth() {
                return Err(BackendError::InvalidDepthAttachment {
                    index,
                    reason: "format has no depth component",
                });
            }
        }
        Ok(())
    }

    /// The depth attachment, if the pass has one.
    pub fn depth_attachment(&self) -> Option<&AttachmentDescriptor> {
        self.depth_attachment_index
            .and_then(|index| self.attachments.get(index))
    }
}

/// How a subpass uses the pass's depth attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthAccess {
    /// Depth is tested and written.
    #[default]
    ReadWrite,
    /// Depth is tested but not written.
    ReadOnly,
    /// Depth is not bound to the subpass.
    None,
}

/// Which attachment slots a subpass writes and reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubpassDescriptor {
    /// Slots written as color outputs, in output location order.
    pub color_attachments: Vec<usize>,
    /// Slots read as input attachments, in input index order.
    pub input_attachments: Vec<usize>,
    pub depth: DepthAccess,
}

impl SubpassDescriptor {
    /// Subpass writing `color_attachments` with depth bound read/write.
    pub fn new(color_attachments: Vec<usize>) -> Self {
        Self {
            color_attachments,
            input_attachments: Vec::new(),
            depth: DepthAccess::ReadWrite,
        }
    }

    pub fn with_inputs(mut self, input_attachments: Vec<usize>) -> Self {
        self.input_attachments = input_attachments;
        self
    }

    pub fn with_depth(mut self, depth: DepthAccess) -> Self {
        self.depth = depth;
        self
    }

    /// Check the indices against the pass's attachment slots.
    pub fn validate(
        &self,
        attachment_formats: &[TextureFormat],
        depth_attachment_index: Option<usize>,
    ) -> BackendResult<()> {
        let count = attachment_formats.len();
        let in_range = |index: usize| {
            if index < count {
                Ok(())
            } else {
                Err(BackendError::InvalidAttachmentIndex { index, count })
            }
        };

        for &index in &self.color_attachments {
            in_range(index)?;
            if attachment_formats[index].is_depth() {
                return Err(BackendError::InvalidDepthAttachment {
                    index,
                    reason: "depth slot bound as a color output",
                });
            }
        }

        for &index in &self.input_attachments {
            in_range(index)?;
            if self.color_attachments.contains(&index) {
                log::trace!("Attachment {index} is both read and written (framebuffer fetch)");
            }
            if Some(index) == depth_attachment_index && self.depth == DepthAccess::ReadWrite {
                return Err(BackendError::InputAttachmentConflict { index });
            }
        }

        Ok(())
    }

    /// Effective depth usage given whether the pass has depth at all.
    pub fn effective_depth(&self, depth_attachment_index: Option<usize>) -> DepthAccess {
        match depth_attachment_index {
            Some(_) => self.depth,
            None => DepthAccess::None,
        }
    }
}

/// Open a native render pass on `ctx`.
///
/// The pass ends with [`ScopedRenderPass::end`], or when the guard is dropped.
pub fn begin_scoped_render_pass<C: RenderContext + ?Sized>(
    ctx: &mut C,
    desc: RenderPassDescriptor,
) -> BackendResult<ScopedRenderPass<'_, C>> {
    desc.validate()?;
    ctx.begin_render_pass(&desc)?;

    log::trace!(
        "Begin render pass {:?} ({}x{}, {} attachments, {}x MSAA)",
        desc.label,
        desc.width,
        desc.height,
        desc.attachments.len(),
        desc.sample_count
    );

    Ok(ScopedRenderPass {
        ctx,
        attachment_formats: desc.attachments.iter().map(|a| a.format).collect(),
        depth_attachment_index: desc.depth_attachment_index,
        next_subpass: 0,
        ended: false,
    })
}

/// An open render pass. Ends the pass on drop if [`end`](Self::end) wasn't called.
pub struct ScopedRenderPass<'a, C: RenderContext + ?Sized> {
    ctx: &'a mut C,
    attachment_formats: Vec<TextureFormat>,
    depth_attachment_index: Option<usize>,
    next_subpass: u32,
    ended: bool,
}

impl<'a, C: RenderContext + ?Sized> ScopedRenderPass<'a, C> {
    /// Open the next subpass. Ends the subpass when the guard is dropped.
    pub fn begin_scoped_subpass(
        &mut self,
        desc: SubpassDescriptor,
    ) -> BackendResult<ScopedSubpass<'_, C>> {
        desc.validate(&self.attachment_formats, self.depth_attachment_index)?;

        let index = self.next_subpass;
        self.ctx.begin_subpass(index, &desc)?;
        self.next_subpass += 1;

        log::trace!(
            "Begin subpass {index}: colors {:?}, inputs {:?}, depth {:?}",
            desc.color_attachments,
            desc.input_attachments,
            desc.effective_depth(self.depth_attachment_index)
        );

        Ok(ScopedSubpass {
            ctx: &mut *self.ctx,
            index,
        })
    }

    /// Number of subpasses opened so far.
    pub fn subpass_count(&self) -> u32 {
        self.next_subpass
    }

    /// End the pass and return whatever the context reported while closing it.
    pub fn end(mut self) -> BackendResult<()> {
        self.ended = true;
        self.ctx.end_render_pass()
    }
}

impl<C: RenderContext + ?Sized> Drop for ScopedRenderPass<'_, C> {
    fn drop(&mut self) {
        if self.ended {
            return;
        }
        if let Err(err) = self.ctx.end_render_pass() {
            log::error!("Failed to end render pass: {err}");
        }
    }
}

/// An open subpass. Dereferences to the render context for drawing.
pub struct ScopedSubpass<'a, C: RenderContext + ?Sized> {
    ctx: &'a mut C,
    index: u32,
}

impl<C: RenderContext + ?Sized> ScopedSubpass<'_, C> {
    /// Position of this subpass within its render pass.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl<C: RenderContext + ?Sized> Deref for ScopedSubpass<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.ctx
    }
}

impl<C: RenderContext + ?Sized> DerefMut for ScopedSubpass<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.ctx
    }
}

impl<C: RenderContext + ?Sized> Drop for ScopedSubpass<'_, C> {
    fn drop(&mut self) {
        self.ctx.end_subpass();
    }
}
