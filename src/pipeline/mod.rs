//! Main rendering pipeline
//!
//! A single native render pass split into two subpasses:
//! 1. Opaques + skybox - writes the HDR color attachment and depth
//! 2. Caustics - fullscreen overlay reading the first subpass's output as an
//!    input attachment, without a round trip through memory

pub mod main_pass;

pub use main_pass::MainRenderPass;

use crate::backend::types::TextureFormat;
use crate::render_graph::drawing::ShaderTagId;
use crate::render_graph::pass::RenderPassEvent;

/// Configuration for the main render pass
#[derive(Debug, Clone, PartialEq)]
pub struct MainPassConfig {
    /// When in the frame the pass runs
    pub event: RenderPassEvent,
    /// Format of the HDR color attachment
    pub color_format: TextureFormat,
    /// Format of the depth attachment
    pub depth_format: TextureFormat,
    /// Shader pass drawn for opaque renderers
    pub shader_tag: ShaderTagId,
    /// MSAA sample count of the pass
    pub sample_count: u32,
    pub clear_depth: f32,
    pub clear_stencil: u32,
}

impl Default for MainPassConfig {
    fn default() -> Self {
        Self {
            event: RenderPassEvent::BeforeRenderingOpaques,
            color_format: TextureFormat::Rg11b10Float,
            depth_format: TextureFormat::Depth24PlusStencil8,
            shader_tag: ShaderTagId::default(),
            sample_count: 1,
            clear_depth: 1.0,
            clear_stencil: 0,
        }
    }
}

impl MainPassConfig {
    /// Default configuration scheduled at `event`
    pub fn at(event: RenderPassEvent) -> Self {
        Self {
            event,
            ..Default::default()
        }
    }
}
