//! Expands an OBJ-style [`MeshSource`] into an interleaved, non-indexed float buffer.
//!
//! Each triangle corner becomes one record laid out as
//! `position | normal? | uv? | tangent? | bitangent?`. Shared vertices are
//! duplicated; no index buffer is produced.

use crate::error::{AttributeArray, MeshLoadError};
use crate::io::obj_loader::load_obj;
use crate::scene::mesh::{MeshSource, VertexLayout};
use log::{debug, info};
use nalgebra::{Vector2, Vector3};
use std::path::Path;

/// UV determinants smaller than this are treated as degenerate.
const UV_DET_EPSILON: f32 = 1e-12;

/// CPU-side result of the builder, ready for upload.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub layout: VertexLayout,
}

impl MeshData {
    pub fn stride(&self) -> usize {
        self.layout.stride()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.stride()
    }

    /// The interleaved record of one corner.
    pub fn record(&self, corner: usize) -> &[f32] {
        let stride = self.stride();
        &self.vertices[corner * stride..(corner + 1) * stride]
    }
}

/// Tangent-space basis shared by the three corners of one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleBasis {
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
}

impl TriangleBasis {
    pub fn zero() -> Self {
        Self {
            tangent: Vector3::zeros(),
            bitangent: Vector3::zeros(),
        }
    }
}

/// Flat tangent/bitangent for one triangle from its positions and UVs.
///
/// Returns `None` when the UV mapping has zero area (the determinant would
/// divide by zero) or the result is not finite.
pub fn triangle_basis(
    positions: [Vector3<f32>; 3],
    uvs: [Vector2<f32>; 3],
) -> Option<TriangleBasis> {
    let edge1 = positions[1] - positions[0];
    let edge2 = positions[2] - positions[0];
    let delta_uv1 = uvs[1] - uvs[0];
    let delta_uv2 = uvs[2] - uvs[0];

    let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
    if det.abs() < UV_DET_EPSILON {
        return None;
    }
    let r = 1.0 / det;

    let tangent = (edge1 * delta_uv2.y - edge2 * delta_uv1.y) * r;
    let bitangent = (edge2 * delta_uv1.x - edge1 * delta_uv2.x) * r;

    let finite = |v: &Vector3<f32>| v.iter().all(|c| c.is_finite());
    (finite(&tangent) && finite(&bitangent)).then_some(TriangleBasis { tangent, bitangent })
}

fn fetch3(
    data: &[f32],
    index: usize,
    attribute: AttributeArray,
) -> Result<Vector3<f32>, MeshLoadError> {
    let len = data.len() / 3;
    if index >= len {
        return Err(MeshLoadError::IndexOutOfBounds {
            attribute,
            index,
            len,
        });
    }
    Ok(Vector3::new(
        data[index * 3],
        data[index * 3 + 1],
        data[index * 3 + 2],
    ))
}

fn fetch2(data: &[f32], index: usize) -> Result<Vector2<f32>, MeshLoadError> {
    let len = data.len() / 2;
    if index >= len {
        return Err(MeshLoadError::IndexOutOfBounds {
            attribute: AttributeArray::Texcoord,
            index,
            len,
        });
    }
    Ok(Vector2::new(data[index * 2], data[index * 2 + 1]))
}

fn missing_index(attribute: AttributeArray, corner: usize) -> MeshLoadError {
    MeshLoadError::MalformedFaces(format!("corner {corner} has no {attribute} index"))
}

/// Builds the interleaved buffer for `layout`.
///
/// Requested attributes that the source lacks, and corners missing an index
/// for a requested attribute, are reported as errors rather than zero-filled.
pub fn build(source: &MeshSource, layout: VertexLayout) -> Result<MeshData, MeshLoadError> {
    if source.corners.is_empty() {
        return Err(MeshLoadError::Empty);
    }
    if source.corners.len() % 3 != 0 {
        return Err(MeshLoadError::MalformedFaces(format!(
            "{} corners do not form whole triangles",
            source.corners.len()
        )));
    }
    if layout.normals && !source.has_normals() {
        return Err(MeshLoadError::MalformedFaces(
            "layout requests normals but the mesh has none".to_string(),
        ));
    }
    if layout.texcoords && !source.has_texcoords() {
        return Err(MeshLoadError::MalformedFaces(
            "layout requests texcoords but the mesh has none".to_string(),
        ));
    }

    let stride = layout.stride();
    let mut vertices = Vec::with_capacity(source.corners.len() * stride);
    let mut degenerate = 0usize;

    for (tri, corners) in source.corners.chunks_exact(3).enumerate() {
        let first = tri * 3;
        let mut positions = [Vector3::zeros(); 3];
        let mut uvs = [Vector2::zeros(); 3];

        for (i, corner) in corners.iter().enumerate() {
            positions[i] = fetch3(&source.positions, corner.position, AttributeArray::Position)?;
            if layout.texcoords {
                let t = corner
                    .texcoord
                    .ok_or_else(|| missing_index(AttributeArray::Texcoord, first + i))?;
                uvs[i] = fetch2(&source.texcoords, t)?;
            }
        }

        let basis = if layout.tangents {
            triangle_basis(positions, uvs).unwrap_or_else(|| {
                degenerate += 1;
                TriangleBasis::zero()
            })
        } else {
            TriangleBasis::zero()
        };

        for (i, corner) in corners.iter().enumerate() {
            vertices.extend_from_slice(positions[i].as_slice());
            if layout.normals {
                let n = corner
                    .normal
                    .ok_or_else(|| missing_index(AttributeArray::Normal, first + i))?;
                let normal = fetch3(&source.normals, n, AttributeArray::Normal)?;
                vertices.extend_from_slice(normal.as_slice());
            }
            if layout.texcoords {
                vertices.extend_from_slice(uvs[i].as_slice());
                if layout.tangents {
                    vertices.extend_from_slice(basis.tangent.as_slice());
                    vertices.extend_from_slice(basis.bitangent.as_slice());
                }
            }
        }
    }

    if degenerate > 0 {
        debug!(
            "{} of {} triangles have degenerate UVs; using a zero tangent basis",
            degenerate,
            source.triangle_count()
        );
    }

    Ok(MeshData { vertices, layout })
}

/// Loads an OBJ file and builds it with the layout its data supports.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<MeshData, MeshLoadError> {
    let path = path.as_ref();
    let source = load_obj(path)?;
    let layout = VertexLayout::for_source(&source);
    let mesh = build(&source, layout)?;

    info!(
        "Built mesh {:?}: {} vertices, stride {}",
        path,
        mesh.vertex_count(),
        mesh.stride()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh::Corner;

    fn triangle_source(uvs: [f32; 6]) -> MeshSource {
        MeshSource {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0],
            texcoords: uvs.to_vec(),
            corners: (0..3).map(|i| Corner::new(i, Some(0), Some(i))).collect(),
        }
    }

    #[test]
    fn position_only_mesh_has_stride_three() {
        let source = MeshSource {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
            corners: [0, 1, 2, 2, 1, 3]
                .into_iter()
                .map(|i| Corner::new(i, None, None))
                .collect(),
            ..Default::default()
        };
        let mesh = build(&source, VertexLayout::for_source(&source)).unwrap();
        assert_eq!(mesh.stride(), 3);
        assert_eq!(mesh.vertices.len(), 3 * 6);
        assert_eq!(mesh.record(5), &[1.0, 1.0, 0.0]);
    }

    #[test]
    fn full_layout_record_order() {
        let mesh = build(
            &triangle_source([0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
            VertexLayout::new(true, true, true),
        )
        .unwrap();
        assert_eq!(mesh.stride(), 14);
        assert_eq!(mesh.vertices.len(), 3 * 14);

        // position, normal, uv, tangent, bitangent
        let rec = mesh.record(1);
        assert_eq!(&rec[0..3], &[1.0, 0.0, 0.0]);
        assert_eq!(&rec[3..6], &[0.0, 0.0, 1.0]);
        assert_eq!(&rec[6..8], &[1.0, 0.0]);
        assert_eq!(&rec[8..11], &[1.0, 0.0, 0.0]);
        assert_eq!(&rec[11..14], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn basis_is_shared_by_all_three_corners() {
        let mesh = build(
            &triangle_source([0.1, 0.2, 0.9, 0.3, 0.4, 0.8]),
            VertexLayout::new(true, true, true),
        )
        .unwrap();
        let basis = &mesh.record(0)[8..14];
        assert_eq!(&mesh.record(1)[8..14], basis);
        assert_eq!(&mesh.record(2)[8..14], basis);
    }

    #[test]
    fn tangent_basis_lies_in_triangle_plane() {
        let positions = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 0.5, 0.0),
            Vector3::new(0.3, 1.5, 1.0),
        ];
        let uvs = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.1),
            Vector2::new(0.2, 1.0),
        ];
        let basis = triangle_basis(positions, uvs).unwrap();
        let normal = (positions[1] - positions[0])
            .cross(&(positions[2] - positions[0]))
            .normalize();
        assert!(basis.tangent.normalize().dot(&normal).abs() < 1e-4);
        assert!(basis.bitangent.normalize().dot(&normal).abs() < 1e-4);
    }

    #[test]
    fn degenerate_uvs_fall_back_to_zero_basis() {
        let mesh = build(
            &triangle_source([0.5, 0.5, 0.5, 0.5, 0.5, 0.5]),
            VertexLayout::new(true, true, true),
        )
        .unwrap();
        for corner in 0..3 {
            assert!(mesh.record(corner)[8..14].iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn without_tangents_gives_eight_float_records() {
        let source = triangle_source([0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        let mesh = build(&source, VertexLayout::for_source(&source).without_tangents()).unwrap();
        assert_eq!(mesh.stride(), 8);
        assert_eq!(mesh.vertices.len(), 24);
    }

    #[test]
    fn out_of_bounds_position_fails() {
        let mut source = triangle_source([0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        source.corners[2].position = 7;
        let err = build(&source, VertexLayout::for_source(&source)).unwrap_err();
        assert!(matches!(
            err,
            MeshLoadError::IndexOutOfBounds {
                attribute: AttributeArray::Position,
                index: 7,
                len: 3
            }
        ));
    }

    #[test]
    fn out_of_bounds_normal_and_texcoord_fail() {
        let mut source = triangle_source([0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        source.corners[0].normal = Some(1);
        assert!(matches!(
            build(&source, VertexLayout::for_source(&source)),
            Err(MeshLoadError::IndexOutOfBounds {
                attribute: AttributeArray::Normal,
                ..
            })
        ));

        let mut source = triangle_source([0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        source.corners[1].texcoord = Some(3);
        assert!(matches!(
            build(&source, VertexLayout::for_source(&source)),
            Err(MeshLoadError::IndexOutOfBounds {
                attribute: AttributeArray::Texcoord,
                ..
            })
        ));
    }

    #[test]
    fn partial_triangles_are_rejected() {
        let mut source = triangle_source([0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        source.corners.pop();
        assert!(matches!(
            build(&source, VertexLayout::for_source(&source)),
            Err(MeshLoadError::MalformedFaces(_))
        ));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let source = MeshSource::default();
        assert!(matches!(
            build(&source, VertexLayout::POSITION_ONLY),
            Err(MeshLoadError::Empty)
        ));
    }

    #[test]
    fn buffer_length_is_corner_count_times_stride() {
        let source = MeshSource::quad();
        let mesh = build(&source, VertexLayout::for_source(&source)).unwrap();
        assert_eq!(mesh.vertices.len(), source.corners.len() * mesh.stride());
        assert_eq!(mesh.vertex_count(), 6);
    }
}
