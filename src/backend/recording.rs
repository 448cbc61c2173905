//! Recording backend for testing and headless runs.
//!
//! This backend doesn't touch a GPU. It checks scope nesting the way a real
//! context would, resolves draws against the culling results, and keeps a log of
//! everything it was asked to do.

use glam::Mat4;

use crate::backend::traits::{BackendError, BackendResult, RenderContext};
use crate::render_graph::attachment::AttachmentDescriptor;
use crate::render_graph::command::{Command, CommandBuffer};
use crate::render_graph::drawing::{
    CullingResults, DrawingSettings, FilteringSettings, ShaderTagId, SortingCriteria,
};
use crate::render_graph::scope::{RenderPassDescriptor, SubpassDescriptor};
use crate::scene::Camera;

/// One call made against a [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    BeginRenderPass {
        label: Option<String>,
        width: u32,
        height: u32,
        sample_count: u32,
        attachments: Vec<AttachmentDescriptor>,
        depth_attachment_index: Option<usize>,
    },
    BeginSubpass {
        index: u32,
        desc: SubpassDescriptor,
    },
    EndSubpass {
        index: u32,
    },
    EndRenderPass,
    DrawRenderers {
        subpass: u32,
        /// Renderer ids in submission order
        renderer_ids: Vec<u32>,
        shader_tag: ShaderTagId,
        sorting_criteria: SortingCriteria,
        filtering: FilteringSettings,
    },
    DrawSkybox {
        subpass: u32,
        camera: String,
    },
    DrawMesh {
        subpass: u32,
        command_buffer: String,
        mesh: String,
        material: String,
        transform: Mat4,
    },
}

impl RecordedCommand {
    /// Short name of the command, for order assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordedCommand::BeginRenderPass { .. } => "begin_render_pass",
            RecordedCommand::BeginSubpass { .. } => "begin_subpass",
            RecordedCommand::EndSubpass { .. } => "end_subpass",
            RecordedCommand::EndRenderPass => "end_render_pass",
            RecordedCommand::DrawRenderers { .. } => "draw_renderers",
            RecordedCommand::DrawSkybox { .. } => "draw_skybox",
            RecordedCommand::DrawMesh { .. } => "draw_mesh",
        }
    }
}

/// CPU-only render context.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<RecordedCommand>,
    in_render_pass: bool,
    active_subpass: Option<u32>,
    end_error: Option<BackendError>,
}

impl RecordingContext {
    /// Create a new recording context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "Recording"
    }

    /// Everything recorded so far.
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the log empty.
    pub fn take_commands(&mut self) -> Vec<RecordedCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_in_render_pass(&self) -> bool {
        self.in_render_pass
    }

    pub fn is_in_subpass(&self) -> bool {
        self.active_subpass.is_some()
    }

    /// Make the next `end_render_pass` report `err` after closing the pass, the
    /// way a native backend fails when it records the pass at the end.
    pub fn fail_next_end_render_pass(&mut self, err: BackendError) {
        self.end_error = Some(err);
    }

    fn current_subpass(&self) -> BackendResult<u32> {
        self.active_subpass.ok_or(BackendError::SubpassNotActive)
    }
}

impl RenderContext for RecordingContext {
    fn begin_render_pass(&mut self, desc: &RenderPassDescriptor) -> BackendResult<()> {
        if self.in_render_pass {
            return Err(BackendError::NestedRenderPass);
        }
        self.in_render_pass = true;
        self.commands.push(RecordedCommand::BeginRenderPass {
            label: desc.label.clone(),
            width: desc.width,
            height: desc.height,
            sample_count: desc.sample_count,
            attachments: desc.attachments.clone(),
            depth_attachment_index: desc.depth_attachment_index,
        });
        Ok(())
    }

    fn begin_subpass(&mut self, index: u32, desc: &SubpassDescriptor) -> BackendResult<()> {
        if !self.in_render_pass {
            return Err(BackendError::NoActiveRenderPass);
        }
        if let Some(open) = self.active_subpass {
            log::warn!("RecordingContext: subpass {open} still open when beginning {index}");
            self.end_subpass();
        }
        self.active_subpass = Some(index);
        self.commands.push(RecordedCommand::BeginSubpass {
            index,
            desc: desc.clone(),
        });
        Ok(())
    }

    fn end_subpass(&mut self) {
        match self.active_subpass.take() {
            Some(index) => self.commands.push(RecordedCommand::EndSubpass { index }),
            None => log::warn!("RecordingContext: end_subpass without an open subpass"),
        }
    }

    fn end_render_pass(&mut self) -> BackendResult<()> {
        if !self.in_render_pass {
            return Err(BackendError::NoActiveRenderPass);
        }
        if self.active_subpass.is_some() {
            self.end_subpass();
        }
        self.in_render_pass = false;
        self.commands.push(RecordedCommand::EndRenderPass);
        match self.end_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn draw_renderers(
        &mut self,
        cull_results: &CullingResults,
        drawing: &DrawingSettings,
        filtering: &FilteringSettings,
    ) -> BackendResult<()> {
        let subpass = self.current_subpass()?;
        let renderer_ids = cull_results
            .prepare_draws(drawing, filtering)
            .iter()
            .map(|r| r.id)
            .collect();

        self.commands.push(RecordedCommand::DrawRenderers {
            subpass,
            renderer_ids,
            shader_tag: drawing.shader_tag.clone(),
            sorting_criteria: drawing.sorting_criteria,
            filtering: *filtering,
        });
        Ok(())
    }

    fn draw_skybox(&mut self, camera: &Camera) -> BackendResult<()> {
        let subpass = self.current_subpass()?;
        self.commands.push(RecordedCommand::DrawSkybox {
            subpass,
            camera: camera.name.clone(),
        });
        Ok(())
    }

    fn execute_command_buffer(&mut self, cmd: &CommandBuffer) -> BackendResult<()> {
        let subpass = self.current_subpass()?;
        log::trace!(
            "RecordingContext: executing '{}' ({} commands)",
            cmd.name(),
            cmd.commands().len()
        );

        for command in cmd.commands() {
            match command {
                Command::DrawMesh {
                    mesh,
                    transform,
                    material,
                    ..
                } => self.commands.push(RecordedCommand::DrawMesh {
                    subpass,
                    command_buffer: cmd.name().to_string(),
                    mesh: mesh.name.clone(),
                    material: material.name.clone(),
                    transform: *transform,
                }),
            }
        }
        Ok(())
    }
}
