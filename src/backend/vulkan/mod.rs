//! Vulkan backend
//!
//! [`VulkanRenderContext`] maps scoped passes onto native `vk::RenderPass`
//! objects with one Vulkan subpass per scoped subpass. Subpass attachment sets
//! must be known when the render pass object is created, so work issued inside a
//! pass is buffered and replayed into the command buffer when the pass ends.
//!
//! The host owns the device, the command buffer, and every pipeline. Draws are
//! forwarded to a [`VulkanDrawDelegate`] with the render pass and subpass they
//! must be recorded against.

mod conversion;

pub use conversion::*;

use ash::vk;
use glam::Mat4;
use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::traits::{BackendError, BackendResult, RenderContext};
use crate::backend::types::{LoadOp, RenderTargetId, StoreOp, TextureFormat};
use crate::render_graph::attachment::AttachmentDescriptor;
use crate::render_graph::command::{Command, CommandBuffer};
use crate::render_graph::drawing::{
    CullingResults, DrawingSettings, FilteringSettings, VisibleRenderer,
};
use crate::render_graph::scope::{RenderPassDescriptor, SubpassDescriptor};
use crate::resources::{Material, Mesh};
use crate::scene::Camera;

/// Where a draw lands: the native render pass and the subpass within it.
#[derive(Debug, Clone, Copy)]
pub struct SubpassTarget {
    pub render_pass: vk::RenderPass,
    pub subpass: u32,
    pub extent: vk::Extent2D,
}

/// Host hooks for recording actual draws and providing transient attachments.
pub trait VulkanDrawDelegate {
    /// Image view for an attachment slot that has no bound render target.
    fn transient_view(
        &mut self,
        slot: usize,
        attachment: &AttachmentDescriptor,
        extent: vk::Extent2D,
    ) -> BackendResult<vk::ImageView>;

    fn draw_renderers(
        &mut self,
        cmd: vk::CommandBuffer,
        target: SubpassTarget,
        renderers: &[VisibleRenderer],
        drawing: &DrawingSettings,
    );

    fn draw_skybox(&mut self, cmd: vk::CommandBuffer, target: SubpassTarget, camera: &Camera);

    fn draw_mesh(
        &mut self,
        cmd: vk::CommandBuffer,
        target: SubpassTarget,
        mesh: &Mesh,
        transform: Mat4,
        material: &Material,
    );
}

/// Cache key for render pass objects. Two passes with equal keys are compatible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RenderPassKey {
    attachments: Vec<(TextureFormat, LoadOp, StoreOp)>,
    sample_count: u32,
    depth_attachment_index: Option<usize>,
    subpasses: Vec<SubpassDescriptor>,
}

impl RenderPassKey {
    fn new(desc: &RenderPassDescriptor, subpasses: &[SubpassDescriptor]) -> Self {
        Self {
            attachments: desc
                .attachments
                .iter()
                .map(|a| (a.format, a.load_op, a.store_op))
                .collect(),
            sample_count: desc.sample_count,
            depth_attachment_index: desc.depth_attachment_index,
            subpasses: subpasses.to_vec(),
        }
    }
}

/// Work buffered inside an open pass.
enum PendingOp {
    NextSubpass,
    DrawRenderers {
        renderers: Vec<VisibleRenderer>,
        drawing: DrawingSettings,
    },
    DrawSkybox(Camera),
    DrawMesh {
        mesh: Arc<Mesh>,
        transform: Mat4,
        material: Arc<Material>,
    },
}

struct PendingPass {
    desc: RenderPassDescriptor,
    subpasses: Vec<SubpassDescriptor>,
    ops: Vec<PendingOp>,
    subpass_open: bool,
}

/// Render context recording into a host-owned Vulkan command buffer.
pub struct VulkanRenderContext {
    device: ash::Device,
    command_buffer: vk::CommandBuffer,
    delegate: Box<dyn VulkanDrawDelegate>,

    targets: HashMap<RenderTargetId, vk::ImageView>,
    render_passes: HashMap<RenderPassKey, vk::RenderPass>,
    /// Framebuffers recorded this frame, destroyed at the next `begin_frame`.
    framebuffers: Vec<vk::Framebuffer>,

    pending: Option<PendingPass>,
}

impl VulkanRenderContext {
    pub fn new(
        device: ash::Device,
        command_buffer: vk::CommandBuffer,
        delegate: Box<dyn VulkanDrawDelegate>,
    ) -> Self {
        Self {
            device,
            command_buffer,
            delegate,
            targets: HashMap::new(),
            render_passes: HashMap::new(),
            framebuffers: Vec::new(),
            pending: None,
        }
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "Vulkan"
    }

    /// Start recording a new frame into `command_buffer`.
    ///
    /// The caller must have waited for the previous frame's work to finish, since
    /// framebuffers created for it are destroyed here.
    pub fn begin_frame(&mut self, command_buffer: vk::CommandBuffer) {
        unsafe {
            for framebuffer in self.framebuffers.drain(..) {
                self.device.destroy_framebuffer(framebuffer, None);
            }
        }
        self.command_buffer = command_buffer;
    }

    /// Bind `view` as the image behind `target`.
    pub fn register_target(&mut self, target: RenderTargetId, view: vk::ImageView) {
        self.targets.insert(target, view);
    }

    pub fn unregister_target(&mut self, target: RenderTargetId) {
        self.targets.remove(&target);
    }

    /// Number of distinct render pass objects created so far.
    pub fn cached_render_pass_count(&self) -> usize {
        self.render_passes.len()
    }

    fn pending_subpass(&mut self) -> BackendResult<&mut PendingPass> {
        match self.pending.as_mut() {
            Some(pending) if pending.subpass_open => Ok(pending),
            _ => Err(BackendError::SubpassNotActive),
        }
    }

    fn get_or_create_render_pass(
        &mut self,
        desc: &RenderPassDescriptor,
        subpasses: &[SubpassDescriptor],
    ) -> BackendResult<vk::RenderPass> {
        let key = RenderPassKey::new(desc, subpasses);
        if let Some(&render_pass) = self.render_passes.get(&key) {
            return Ok(render_pass);
        }

        let layout = VulkanRenderPassLayout::from_descriptor(desc, subpasses)?;
        let render_pass = layout.create(&self.device)?;
        log::debug!(
            "Created render pass {:?} ({} attachments, {} subpasses)",
            desc.label,
            desc.attachments.len(),
            subpasses.len()
        );
        self.render_passes.insert(key, render_pass);
        Ok(render_pass)
    }

    fn attachment_views(
        &mut self,
        desc: &RenderPassDescriptor,
        extent: vk::Extent2D,
    ) -> BackendResult<Vec<vk::ImageView>> {
        desc.attachments
            .iter()
            .enumerate()
            .map(|(slot, attachment)| match attachment.target {
                Some(target) => self
                    .targets
                    .get(&target)
                    .copied()
                    .ok_or(BackendError::UnknownRenderTarget(target)),
                None => self.delegate.transient_view(slot, attachment, extent),
            })
            .collect()
    }

    fn flush(&mut self, pending: PendingPass) -> BackendResult<()> {
        let PendingPass {
            desc,
            subpasses,
            ops,
            ..
        } = pending;

        let extent = vk::Extent2D {
            width: desc.width,
            height: desc.height,
        };
        let render_pass = self.get_or_create_render_pass(&desc, &subpasses)?;
        let views = self.attachment_views(&desc, extent)?;

        let framebuffer_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&views)
            .width(extent.width)
            .height(extent.height)
            .layers(1);
        let framebuffer = unsafe {
            self.device
                .create_framebuffer(&framebuffer_info, None)
                .map_err(|e| BackendError::FramebufferCreationFailed(e.to_string()))?
        };
        self.framebuffers.push(framebuffer);

        let clear_values: Vec<vk::ClearValue> =
            desc.attachments.iter().map(convert_clear_value).collect();
        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(render_pass)
            .framebuffer(framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .clear_values(&clear_values);

        let cmd = self.command_buffer;
        let mut target = SubpassTarget {
            render_pass,
            subpass: 0,
            extent,
        };

        unsafe {
            self.device
                .cmd_begin_render_pass(cmd, &begin_info, vk::SubpassContents::INLINE);
        }

        for op in &ops {
            match op {
                PendingOp::NextSubpass => {
                    target.subpass += 1;
                    unsafe {
                        self.device
                            .cmd_next_subpass(cmd, vk::SubpassContents::INLINE);
                    }
                }
                PendingOp::DrawRenderers { renderers, drawing } => {
                    self.delegate.draw_renderers(cmd, target, renderers, drawing)
                }
                PendingOp::DrawSkybox(camera) => self.delegate.draw_skybox(cmd, target, camera),
                PendingOp::DrawMesh {
                    mesh,
                    transform,
                    material,
                } => self
                    .delegate
                    .draw_mesh(cmd, target, mesh, *transform, material),
            }
        }

        unsafe {
            self.device.cmd_end_render_pass(cmd);
        }

        log::trace!(
            "Recorded render pass {:?}: {} subpasses, {} ops",
            desc.label,
            subpasses.len(),
            ops.len()
        );
        Ok(())
    }
}

impl RenderContext for VulkanRenderContext {
    fn begin_render_pass(&mut self, desc: &RenderPassDescriptor) -> BackendResult<()> {
        if self.pending.is_some() {
            return Err(BackendError::NestedRenderPass);
        }
        self.pending = Some(PendingPass {
            desc: desc.clone(),
            subpasses: Vec::new(),
            ops: Vec::new(),
            subpass_open: false,
        });
        Ok(())
    }

    fn begin_subpass(&mut self, index: u32, desc: &SubpassDescriptor) -> BackendResult<()> {
        let pending = self
            .pending
            .as_mut()
            .ok_or(BackendError::NoActiveRenderPass)?;
        if pending.subpass_open || index as usize != pending.subpasses.len() {
            return Err(BackendError::SubpassNotActive);
        }
        if index > 0 {
            pending.ops.push(PendingOp::NextSubpass);
        }
        pending.subpasses.push(desc.clone());
        pending.subpass_open = true;
        Ok(())
    }

    fn end_subpass(&mut self) {
        match self.pending.as_mut() {
            Some(pending) if pending.subpass_open => pending.subpass_open = false,
            _ => log::warn!("VulkanRenderContext: end_subpass without an open subpass"),
        }
    }

    fn end_render_pass(&mut self) -> BackendResult<()> {
        let pending = self.pending.take().ok_or(BackendError::NoActiveRenderPass)?;
        if pending.subpasses.is_empty() {
            log::debug!("Skipping render pass {:?} with no subpasses", pending.desc.label);
            return Ok(());
        }
        self.flush(pending)
    }

    fn draw_renderers(
        &mut self,
        cull_results: &CullingResults,
        drawing: &DrawingSettings,
        filtering: &FilteringSettings,
    ) -> BackendResult<()> {
        let renderers: Vec<VisibleRenderer> = cull_results
            .prepare_draws(drawing, filtering)
            .into_iter()
            .cloned()
            .collect();
        let pending = self.pending_subpass()?;
        pending.ops.push(PendingOp::DrawRenderers {
            renderers,
            drawing: drawing.clone(),
        });
        Ok(())
    }

    fn draw_skybox(&mut self, camera: &Camera) -> BackendResult<()> {
        let pending = self.pending_subpass()?;
        pending.ops.push(PendingOp::DrawSkybox(camera.clone()));
        Ok(())
    }

    fn execute_command_buffer(&mut self, cmd: &CommandBuffer) -> BackendResult<()> {
        let pending = self.pending_subpass()?;
        for command in cmd.commands() {
            match command {
                Command::DrawMesh {
                    mesh,
                    transform,
                    material,
                    ..
                } => pending.ops.push(PendingOp::DrawMesh {
                    mesh: Arc::clone(mesh),
                    transform: *transform,
                    material: Arc::clone(material),
                }),
            }
        }
        Ok(())
    }
}

impl Drop for VulkanRenderContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();

            for framebuffer in self.framebuffers.drain(..) {
                self.device.destroy_framebuffer(framebuffer, None);
            }
            for (_, render_pass) in self.render_passes.drain() {
                self.device.destroy_render_pass(render_pass, None);
            }
        }
    }
}
