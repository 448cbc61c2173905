//! Camera the frame is rendered from

use glam::{Vec3, Vec4};

/// The camera a pass draws for
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    /// World-space eye position, used for depth sorting
    pub position: Vec3,
    /// Linear RGBA the color target is cleared to
    pub background_color: Vec4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            name: "Main Camera".to_string(),
            position: Vec3::new(0.0, 2.0, 5.0),
            background_color: Vec4::new(0.19, 0.30, 0.47, 0.0),
        }
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_background_color(mut self, color: Vec4) -> Self {
        self.background_color = color;
        self
    }
}
