//! The fixed quad: four corners in normalized device coordinates, two triangles.

use bytemuck::{Pod, Zeroable};

use raylab_engine::device::{DrawCall, Topology, VertexAttribute, VertexFormat, VertexLayout};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }

    /// One `Float32x3` position at location 0, tightly packed.
    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: std::mem::size_of::<Vertex>() as u64,
            attributes: vec![VertexAttribute {
                location: 0,
                format: VertexFormat::Float32x3,
                offset: 0,
            }],
        }
    }
}

pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex::new(1.0, 1.0, 0.0),   // top right
    Vertex::new(1.0, -1.0, 0.0),  // bottom right
    Vertex::new(-1.0, -1.0, 0.0), // bottom left
    Vertex::new(-1.0, 1.0, 0.0),  // top left
];

pub const QUAD_INDICES: [u32; 6] = [
    0, 1, 3, // right half
    1, 2, 3, // left half
];

/// The single draw covering the whole quad.
pub fn quad_draw_call() -> DrawCall {
    DrawCall {
        topology: Topology::TriangleList,
        indices: 0..QUAD_INDICES.len() as u32,
        base_vertex: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_has_four_vertices_and_six_indices() {
        assert_eq!(QUAD_VERTICES.len(), 4);
        assert_eq!(QUAD_INDICES.len(), 6);
    }

    #[test]
    fn indices_reference_existing_vertices() {
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < QUAD_VERTICES.len()));
        assert_eq!(QUAD_INDICES.iter().max(), Some(&3));
    }

    #[test]
    fn every_vertex_is_used() {
        for v in 0..QUAD_VERTICES.len() as u32 {
            assert!(QUAD_INDICES.contains(&v), "vertex {v} unused");
        }
    }

    #[test]
    fn vertices_span_ndc() {
        for v in QUAD_VERTICES {
            let [x, y, z] = v.position;
            assert_eq!(x.abs(), 1.0);
            assert_eq!(y.abs(), 1.0);
            assert_eq!(z, 0.0);
        }
    }

    #[test]
    fn layout_is_single_tight_float3() {
        let layout = Vertex::layout();
        assert_eq!(layout.stride, 12);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].location, 0);
        assert_eq!(layout.attributes[0].format, VertexFormat::Float32x3);
        assert!(layout.is_tightly_packed());
    }

    #[test]
    fn draw_call_covers_two_triangles() {
        let call = quad_draw_call();
        assert_eq!(call.index_count(), 6);
        assert_eq!(call.primitive_count(), 2);
        assert_eq!(call.topology, Topology::TriangleList);
    }

    #[test]
    fn vertex_bytes_are_packed() {
        let bytes: &[u8] = bytemuck::cast_slice(&QUAD_VERTICES);
        assert_eq!(bytes.len(), 4 * 12);
    }
}
