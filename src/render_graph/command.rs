//! Command buffers recorded by passes and replayed by the render context

use std::sync::Arc;

use glam::Mat4;

use crate::resources::{Material, Mesh};

/// A command recorded into a [`CommandBuffer`]
#[derive(Debug, Clone)]
pub enum Command {
    /// Draw a mesh with a material at the given transform
    DrawMesh {
        mesh: Arc<Mesh>,
        transform: Mat4,
        material: Arc<Material>,
        submesh_index: u32,
    },
}

/// Named list of commands
///
/// Passes keep one buffer around and clear it every frame instead of
/// allocating a new one.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    name: String,
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            commands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a draw of the first submesh of `mesh`
    pub fn draw_mesh(&mut self, mesh: Arc<Mesh>, transform: Mat4, material: Arc<Material>) {
        self.commands.push(Command::DrawMesh {
            mesh,
            transform,
            material,
            submesh_index: 0,
        });
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all recorded commands, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_clear() {
        let mut cmd = CommandBuffer::new("DrawCaustics");
        let mesh = Arc::new(Mesh::fullscreen_quad());
        let material = Arc::new(Material::new("caustics", "Hidden/Caustics"));

        cmd.draw_mesh(mesh, Mat4::IDENTITY, material);
        assert_eq!(cmd.name(), "DrawCaustics");
        assert_eq!(cmd.commands().len(), 1);

        cmd.clear();
        assert!(cmd.is_empty());
    }
}
