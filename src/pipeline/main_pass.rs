//! Main render pass: opaques and skybox, then a caustics overlay subpass

use std::any::Any;
use std::sync::Arc;

use glam::Mat4;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::pipeline::MainPassConfig;
use crate::render_graph::attachment::AttachmentDescriptor;
use crate::render_graph::command::CommandBuffer;
use crate::render_graph::drawing::*;
use crate::render_graph::pass::*;
use crate::render_graph::scope::*;
use crate::resources::{Material, Mesh};
use crate::scene::RenderingData;

/// Slot of the color attachment in the pass
pub const COLOR_ATTACHMENT_INDEX: usize = 0;
/// Slot of the depth attachment in the pass
pub const DEPTH_ATTACHMENT_INDEX: usize = 1;

/// Name of the command buffer the caustics draw is recorded into
pub const CAUSTICS_COMMAND_BUFFER: &str = "DrawCaustics";

/// Draws opaques and the skybox in subpass 0, then a fullscreen caustics quad
/// in subpass 1 that reads the pass's depth slot as an input attachment.
pub struct MainRenderPass {
    event: RenderPassEvent,
    shader_tag: ShaderTagId,
    sample_count: u32,

    opaque_filtering: FilteringSettings,
    transparent_filtering: FilteringSettings,

    color_attachment: AttachmentDescriptor,
    depth_attachment: AttachmentDescriptor,
    color_target: Option<RenderTargetId>,

    caustics_material: Arc<Material>,
    fullscreen_mesh: Arc<Mesh>,
    caustics_cmd: CommandBuffer,
}

impl MainRenderPass {
    pub fn new(event: RenderPassEvent, caustics_material: Arc<Material>) -> Self {
        Self::with_config(MainPassConfig::at(event), caustics_material)
    }

    pub fn with_config(config: MainPassConfig, caustics_material: Arc<Material>) -> Self {
        let mut depth_attachment = AttachmentDescriptor::new(config.depth_format);
        depth_attachment.configure_clear(glam::Vec4::ZERO, config.clear_depth, config.clear_stencil);

        Self {
            event: config.event,
            shader_tag: config.shader_tag,
            sample_count: config.sample_count,
            opaque_filtering: FilteringSettings::new(RenderQueueRange::opaque()),
            transparent_filtering: FilteringSettings::new(RenderQueueRange::transparent()),
            color_attachment: AttachmentDescriptor::new(config.color_format),
            depth_attachment,
            color_target: None,
            caustics_material,
            fullscreen_mesh: Arc::new(Mesh::fullscreen_quad()),
            caustics_cmd: CommandBuffer::new(CAUSTICS_COMMAND_BUFFER),
        }
    }

    /// Render into `target` instead of the camera target.
    pub fn set_color_target(&mut self, target: RenderTargetId) {
        self.color_target = Some(target);
    }

    pub fn color_target(&self) -> RenderTargetId {
        self.color_target.unwrap_or(RenderTargetId::CameraTarget)
    }

    pub fn opaque_filtering(&self) -> &FilteringSettings {
        &self.opaque_filtering
    }

    pub fn transparent_filtering(&self) -> &FilteringSettings {
        &self.transparent_filtering
    }

    pub fn caustics_material(&self) -> &Arc<Material> {
        &self.caustics_material
    }

    pub fn set_caustics_material(&mut self, material: Arc<Material>) {
        self.caustics_material = material;
    }
}

impl RenderPass for MainRenderPass {
    fn name(&self) -> &str {
        "Main Render Pass"
    }

    fn event(&self) -> RenderPassEvent {
        self.event
    }

    fn execute(
        &mut self,
        ctx: &mut dyn RenderContext,
        rendering_data: &RenderingData,
    ) -> BackendResult<()> {
        let opaque_drawing =
            DrawingSettings::new(&self.shader_tag, rendering_data, SortingCriteria::COMMON_OPAQUE);
        // Nothing transparent is drawn here yet.
        let _transparent_drawing = DrawingSettings::new(
            &self.shader_tag,
            rendering_data,
            SortingCriteria::COMMON_TRANSPARENT,
        );

        let camera = &rendering_data.camera_data.camera;
        let target_desc = &rendering_data.camera_data.target_descriptor;

        let color_target = self.color_target();
        self.color_attachment
            .configure_target(color_target, false, true);
        self.color_attachment
            .configure_clear(camera.background_color, 1.0, 0);

        let mut pass = begin_scoped_render_pass(
            ctx,
            RenderPassDescriptor {
                label: Some(self.name().to_string()),
                width: target_desc.width,
                height: target_desc.height,
                sample_count: self.sample_count,
                attachments: vec![self.color_attachment.clone(), self.depth_attachment.clone()],
                depth_attachment_index: Some(DEPTH_ATTACHMENT_INDEX),
            },
        )?;

        // Opaques + skybox
        {
            let mut subpass =
                pass.begin_scoped_subpass(SubpassDescriptor::new(vec![COLOR_ATTACHMENT_INDEX]))?;
            subpass.draw_renderers(
                &rendering_data.cull_results,
                &opaque_drawing,
                &self.opaque_filtering,
            )?;
            subpass.draw_skybox(camera)?;
        }

        // Caustics
        {
            let mut subpass = pass.begin_scoped_subpass(
                SubpassDescriptor::new(vec![COLOR_ATTACHMENT_INDEX])
                    .with_inputs(vec![DEPTH_ATTACHMENT_INDEX])
                    .with_depth(DepthAccess::None),
            )?;
            self.caustics_cmd.clear();
            self.caustics_cmd.draw_mesh(
                Arc::clone(&self.fullscreen_mesh),
                Mat4::IDENTITY,
                Arc::clone(&self.caustics_material),
            );
            subpass.execute_command_buffer(&self.caustics_cmd)?;
        }

        pass.end()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
