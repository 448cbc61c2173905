//! Per-frame scene data handed to passes

mod camera;

pub use camera::*;

use crate::backend::types::RenderTargetDescriptor;
use crate::render_graph::drawing::CullingResults;

/// The camera being rendered and the texture it renders into
#[derive(Debug, Clone, Default)]
pub struct CameraData {
    pub camera: Camera,
    pub target_descriptor: RenderTargetDescriptor,
}

/// Everything a pass needs to know about the frame
#[derive(Debug, Clone, Default)]
pub struct RenderingData {
    pub camera_data: CameraData,
    pub cull_results: CullingResults,
}

impl RenderingData {
    pub fn new(camera: Camera, target_descriptor: RenderTargetDescriptor) -> Self {
        Self {
            camera_data: CameraData {
                camera,
                target_descriptor,
            },
            cull_results: CullingResults::default(),
        }
    }

    pub fn with_cull_results(mut self, cull_results: CullingResults) -> Self {
        self.cull_results = cull_results;
        self
    }
}
