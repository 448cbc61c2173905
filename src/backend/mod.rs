//! Backend abstraction layer
//!
//! Provides the [`RenderContext`] trait passes record against, the recording
//! backend used by tests and headless runs, and the native Vulkan backend.

pub mod recording;
pub mod traits;
pub mod types;

// Vulkan backend is only available on native platforms
#[cfg(all(feature = "vulkan", not(target_arch = "wasm32")))]
pub mod vulkan;

pub use recording::{RecordedCommand, RecordingContext};
pub use traits::*;
pub use types::*;
