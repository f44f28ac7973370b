use crate::scene::mesh::{AttributeKind, VertexLayout};
use nalgebra::{Point3, Vector2, Vector3};

/// A single vertex decoded from an interleaved record.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    /// Position in local object space.
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub texcoord: Vector2<f32>,
    /// Tangent space; zero when the record carries none.
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            texcoord,
            tangent: Vector3::zeros(),
            bitangent: Vector3::zeros(),
        }
    }

    /// Reads one record laid out as `layout` describes.
    ///
    /// Missing normals default to +Y and missing texcoords to the origin.
    /// `record` must hold at least `layout.stride()` floats.
    pub fn decode(record: &[f32], layout: &VertexLayout) -> Self {
        let vec3 = |offset: usize| {
            Vector3::new(record[offset], record[offset + 1], record[offset + 2])
        };

        let mut vertex = Vertex::new(
            Point3::new(record[0], record[1], record[2]),
            Vector3::y(),
            Vector2::zeros(),
        );
        if let Some(offset) = layout.offset_of(AttributeKind::Normal) {
            vertex.normal = vec3(offset);
        }
        if let Some(offset) = layout.offset_of(AttributeKind::Texcoord) {
            vertex.texcoord = Vector2::new(record[offset], record[offset + 1]);
        }
        if let Some(offset) = layout.offset_of(AttributeKind::Tangent) {
            vertex.tangent = vec3(offset);
        }
        if let Some(offset) = layout.offset_of(AttributeKind::Bitangent) {
            vertex.bitangent = vec3(offset);
        }
        vertex
    }
}
