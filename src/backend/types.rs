//! Common types shared between backends

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use crate::backend::traits::TextureViewHandle;

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    /// Packed HDR RGB, no alpha (11/11/10 bit unsigned floats)
    Rg11b10Float,
    Rgba16Float,
    Rgba32Float,
    Depth32Float,
    Depth24PlusStencil8,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8
        )
    }

    pub fn has_stencil(&self) -> bool {
        matches!(self, TextureFormat::Depth24PlusStencil8)
    }
}

/// What happens to an attachment's contents when the render pass begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadOp {
    /// Preserve what the target already holds
    Load,
    /// Overwrite with the attachment's clear value
    Clear,
    /// Contents are undefined
    #[default]
    DontCare,
}

/// What happens to an attachment's contents when the render pass ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreOp {
    Store,
    /// Results stay in tile memory and are dropped
    #[default]
    Discard,
}

/// Identifies the texture an attachment loads from and stores to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderTargetId {
    /// Whatever the camera currently renders into
    #[default]
    CameraTarget,
    /// A specific texture view owned by the host
    Texture(TextureViewHandle),
}

/// Description of the texture a camera renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub sample_count: u32,
}

impl Default for RenderTargetDescriptor {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            format: TextureFormat::Rg11b10Float,
            sample_count: 1,
        }
    }
}

/// Standard vertex with position, normal, UV, and tangent
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub tangent: Vec4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_formats() {
        assert!(TextureFormat::Depth24PlusStencil8.is_depth());
        assert!(TextureFormat::Depth24PlusStencil8.has_stencil());
        assert!(TextureFormat::Depth32Float.is_depth());
        assert!(!TextureFormat::Depth32Float.has_stencil());
        assert!(!TextureFormat::Rg11b10Float.is_depth());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(LoadOp::default(), LoadOp::DontCare);
        assert_eq!(StoreOp::default(), StoreOp::Discard);
        assert_eq!(RenderTargetId::default(), RenderTargetId::CameraTarget);
    }
}
