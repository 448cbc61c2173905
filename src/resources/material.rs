//! Material definitions

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::render_graph::drawing::RenderQueueRange;

/// A shader plus the property values it is drawn with
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Name of the shader program the host resolves
    pub shader: String,
    pub render_queue: i32,
    floats: HashMap<String, f32>,
    vectors: HashMap<String, Vec4>,
}

impl Material {
    pub fn new(name: &str, shader: &str) -> Self {
        Self {
            name: name.to_string(),
            shader: shader.to_string(),
            render_queue: 2000,
            floats: HashMap::new(),
            vectors: HashMap::new(),
        }
    }

    pub fn with_render_queue(mut self, render_queue: i32) -> Self {
        self.render_queue = render_queue;
        self
    }

    pub fn with_float(mut self, name: &str, value: f32) -> Self {
        self.set_float(name, value);
        self
    }

    pub fn with_vector(mut self, name: &str, value: Vec4) -> Self {
        self.set_vector(name, value);
        self
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    pub fn set_vector(&mut self, name: &str, value: Vec4) {
        self.vectors.insert(name.to_string(), value);
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    pub fn vector(&self, name: &str) -> Option<Vec4> {
        self.vectors.get(name).copied()
    }

    pub fn is_opaque(&self) -> bool {
        RenderQueueRange::opaque().contains(self.render_queue)
    }

    // Presets

    /// Screen-space caustics overlay drawn after opaques and skybox
    pub fn caustics() -> Self {
        Self::new("caustics", "Hidden/Caustics")
            .with_render_queue(2450)
            .with_float("intensity", 1.0)
            .with_float("scale", 1.0)
            .with_float("speed", 0.5)
            .with_vector("tint", Vec4::ONE)
    }

    /// Create a uniform data struct for the caustics shader
    pub fn caustics_uniform_data(&self) -> CausticsUniformData {
        CausticsUniformData {
            tint: self.vector("tint").unwrap_or(Vec4::ONE),
            params: Vec4::new(
                self.float("intensity").unwrap_or(1.0),
                self.float("scale").unwrap_or(1.0),
                self.float("speed").unwrap_or(0.0),
                0.0,
            ),
        }
    }
}

/// Caustics material uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CausticsUniformData {
    pub tint: Vec4,
    pub params: Vec4, // x=intensity, y=scale, z=speed, w=padding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caustics_preset() {
        let material = Material::caustics().with_float("intensity", 2.5);
        assert_eq!(material.float("intensity"), Some(2.5));
        assert!(material.is_opaque());

        let data = material.caustics_uniform_data();
        assert_eq!(data.params.x, 2.5);
        assert_eq!(data.tint, Vec4::ONE);
        assert_eq!(bytemuck::bytes_of(&data).len(), 32);
    }

    #[test]
    fn test_missing_property() {
        let material = Material::new("plain", "Unlit");
        assert_eq!(material.float("intensity"), None);
        assert_eq!(material.caustics_uniform_data().params.x, 1.0);
    }
}
