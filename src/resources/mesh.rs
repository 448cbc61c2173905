//! Mesh data structures and generation

use crate::backend::types::Vertex;
use glam::{Vec2, Vec3, Vec4};

/// A mesh with vertex and index data
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.to_string(),
        }
    }

    /// Calculate vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Calculate index count
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Calculate triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Create a quad covering the whole viewport.
    ///
    /// Positions are already in clip space (z = 0) so the mesh is drawn with an
    /// identity transform. UV (0, 0) is the bottom-left corner.
    pub fn fullscreen_quad() -> Self {
        let mut mesh = Mesh::new("fullscreen_quad");

        let corners = [
            (Vec2::new(-1.0, -1.0), Vec2::new(0.0, 0.0)),
            (Vec2::new(-1.0, 1.0), Vec2::new(0.0, 1.0)),
            (Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)),
            (Vec2::new(1.0, -1.0), Vec2::new(1.0, 0.0)),
        ];

        for (position, uv) in corners {
            mesh.vertices.push(Vertex {
                position: position.extend(0.0),
                normal: Vec3::Z,
                uv,
                tangent: Vec4::new(1.0, 0.0, 0.0, 1.0),
            });
        }

        mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullscreen_quad_covers_clip_space() {
        let quad = Mesh::fullscreen_quad();
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.triangle_count(), 2);

        let (min, max) = quad.vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), v| (min.min(v.position), max.max(v.position)),
        );
        assert_eq!(min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(max, Vec3::new(1.0, 1.0, 0.0));
    }
}
