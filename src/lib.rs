//! Subpass Renderer - a tile-friendly main render pass built on native subpasses
//!
//! The main pass draws opaque geometry and the skybox, then a screen-space
//! caustics overlay, inside a single render pass. The overlay runs in a second
//! subpass and reads the first subpass's attachments as input attachments, so
//! tile-based GPUs never round-trip them through memory.
//!
//! Two render contexts are provided:
//! - **Recording**: CPU-only, logs every command. Used by tests and headless runs
//! - **Vulkan**: native `VkRenderPass` with `vkCmdNextSubpass` via ash (native only)
//!
//! # Features
//! - Event-ordered render graph scheduling
//! - Scoped render pass and subpass guards that always close their scope
//! - Filtered and sorted draw lists from the frame's culling results
//! - Render pass object caching in the Vulkan backend

pub mod backend;
pub mod pipeline;
pub mod render_graph;
pub mod resources;
pub mod scene;

pub use backend::{BackendError, BackendResult, RenderContext};
pub use backend::{RecordedCommand, RecordingContext};
pub use pipeline::{MainPassConfig, MainRenderPass};
pub use render_graph::{RenderGraph, RenderGraphExecutor, RenderPass, RenderPassEvent};
pub use scene::{Camera, RenderingData};

#[cfg(all(feature = "vulkan", not(target_arch = "wasm32")))]
pub use backend::vulkan::{VulkanDrawDelegate, VulkanRenderContext};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
