//! Vertex types produced by tessellation.
//!
//! Texture coordinates carry antialiasing parameters for the fragment shader,
//! not image UVs.

use crate::error::GeometryResult;
use crate::format::VertexFormat;
use bytemuck::{Pod, Zeroable};
use gloss_core::Color;
use static_assertions::const_assert_eq;

/// A vertex type with a known byte layout.
pub trait VertexLayout: Pod {
    /// Layout descriptor, e.g. `v3f:c4f:t3f`.
    const FORMAT: &'static str;

    /// Parse [`Self::FORMAT`].
    fn format() -> GeometryResult<VertexFormat> {
        VertexFormat::parse(Self::FORMAT)
    }
}

/// Vertex for strokes, curves and triangle markers.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct StrokeVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    /// Stroke-space coordinates: along the stroke, across it, and thickness.
    pub tex_coord: [f32; 3],
}

impl StrokeVertex {
    pub fn new(position: [f32; 3], color: Color, tex_coord: [f32; 3]) -> Self {
        Self {
            position,
            color: color.to_array(),
            tex_coord,
        }
    }
}

impl VertexLayout for StrokeVertex {
    const FORMAT: &'static str = "v3f:c4f:t3f";
}

/// Vertex for circles.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CircleVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    /// Quad-local scale in x and y, then radius and thickness.
    pub tex_coord: [f32; 4],
}

impl CircleVertex {
    pub fn new(position: [f32; 3], color: Color, tex_coord: [f32; 4]) -> Self {
        Self {
            position,
            color: color.to_array(),
            tex_coord,
        }
    }
}

impl VertexLayout for CircleVertex {
    const FORMAT: &'static str = "v3f:c4f:t4f";
}

/// Vertex for ellipses.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct EllipseVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    /// Unrotated offset from the center in x and y, then both radii.
    pub tex_coord: [f32; 4],
    pub thickness: f32,
}

impl EllipseVertex {
    pub fn new(position: [f32; 3], color: Color, tex_coord: [f32; 4], thickness: f32) -> Self {
        Self {
            position,
            color: color.to_array(),
            tex_coord,
            thickness,
        }
    }
}

impl VertexLayout for EllipseVertex {
    const FORMAT: &'static str = "v3f:c4f:t4f:1f";
}

const_assert_eq!(std::mem::size_of::<StrokeVertex>(), 40);
const_assert_eq!(std::mem::size_of::<CircleVertex>(), 44);
const_assert_eq!(std::mem::size_of::<EllipseVertex>(), 48);

/// Output from tessellation: vertices and batch-local indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TessellatedMesh<V> {
    /// Vertex data
    pub vertices: Vec<V>,
    /// Index data (triangles), relative to `vertices`
    pub indices: Vec<u32>,
}

impl<V> TessellatedMesh<V> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with room for the given counts.
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Create a mesh with given vertices and indices.
    pub fn from_data(vertices: Vec<V>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Check if the mesh is empty.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Largest index, if any.
    pub fn max_index(&self) -> Option<u32> {
        self.indices.iter().copied().max()
    }

    /// Append another mesh, rebasing its indices past our vertices.
    pub fn extend(&mut self, other: TessellatedMesh<V>) {
        let base = self.vertices.len() as u32;
        self.indices.extend(other.indices.iter().map(|i| i + base));
        self.vertices.extend(other.vertices);
    }

    /// Clear all data.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_match_struct_sizes() {
        let stroke = StrokeVertex::format().unwrap();
        let circle = CircleVertex::format().unwrap();
        let ellipse = EllipseVertex::format().unwrap();
        assert_eq!(stroke.stride(), std::mem::size_of::<StrokeVertex>());
        assert_eq!(circle.stride(), std::mem::size_of::<CircleVertex>());
        assert_eq!(ellipse.stride(), std::mem::size_of::<EllipseVertex>());
        assert_eq!(ellipse.to_string(), "v3f:c4f:t4f:1f");
    }

    #[test]
    fn test_empty_mesh() {
        let mesh: TessellatedMesh<StrokeVertex> = TessellatedMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.max_index(), None);
    }

    #[test]
    fn test_extend_rebases_indices() {
        let v = StrokeVertex::new([0.0; 3], Color::WHITE, [0.0; 3]);
        let mut a = TessellatedMesh::from_data(vec![v; 3], vec![0, 1, 2]);
        let b = TessellatedMesh::from_data(vec![v; 3], vec![2, 1, 0]);
        a.extend(b);
        assert_eq!(a.indices, vec![0, 1, 2, 5, 4, 3]);
        assert_eq!(a.vertex_count(), 6);
    }
}
