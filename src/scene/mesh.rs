/// One triangle corner, indexing each attribute array independently (OBJ style).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    pub position: usize,
    pub normal: Option<usize>,
    pub texcoord: Option<usize>,
}

impl Corner {
    pub fn new(position: usize, normal: Option<usize>, texcoord: Option<usize>) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }
}

/// Triangulated polygon soup as it comes out of an OBJ file.
///
/// `positions` and `normals` hold xyz triples, `texcoords` uv pairs.
/// Every three consecutive corners form one triangle.
#[derive(Debug, Clone, Default)]
pub struct MeshSource {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub corners: Vec<Corner>,
}

impl MeshSource {
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.corners.len() / 3
    }

    /// Appends another mesh, shifting its indices past the attributes already held.
    pub fn append(&mut self, other: MeshSource) {
        let position_offset = self.positions.len() / 3;
        let normal_offset = self.normals.len() / 3;
        let texcoord_offset = self.texcoords.len() / 2;

        self.corners.extend(other.corners.into_iter().map(|c| Corner {
            position: c.position + position_offset,
            normal: c.normal.map(|n| n + normal_offset),
            texcoord: c.texcoord.map(|t| t + texcoord_offset),
        }));
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.texcoords.extend(other.texcoords);
    }

    /// A unit quad on the XY plane facing +Z, with normals and UVs.
    pub fn quad() -> Self {
        Self {
            positions: vec![
                -0.5, -0.5, 0.0, //
                0.5, -0.5, 0.0, //
                0.5, 0.5, 0.0, //
                -0.5, 0.5, 0.0,
            ],
            normals: vec![0.0, 0.0, 1.0],
            texcoords: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
            corners: [0, 1, 2, 2, 3, 0]
                .into_iter()
                .map(|i| Corner::new(i, Some(0), Some(i)))
                .collect(),
        }
    }
}

/// Attribute slots in the interleaved record, in buffer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    Normal,
    Texcoord,
    Tangent,
    Bitangent,
}

impl AttributeKind {
    /// Shader input location the attribute is bound to.
    pub fn location(self) -> u32 {
        match self {
            AttributeKind::Position => 0,
            AttributeKind::Normal => 1,
            AttributeKind::Texcoord => 2,
            AttributeKind::Tangent => 3,
            AttributeKind::Bitangent => 4,
        }
    }

    pub fn components(self) -> usize {
        match self {
            AttributeKind::Texcoord => 2,
            _ => 3,
        }
    }
}

/// One entry of the vertex attribute table; `offset` is in floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub kind: AttributeKind,
    pub offset: usize,
}

/// Which optional attributes an interleaved record carries.
///
/// Tangent and bitangent are only ever present together with texcoords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub normals: bool,
    pub texcoords: bool,
    pub tangents: bool,
}

impl VertexLayout {
    pub const POSITION_ONLY: Self = Self {
        normals: false,
        texcoords: false,
        tangents: false,
    };

    pub fn new(normals: bool, texcoords: bool, tangents: bool) -> Self {
        Self {
            normals,
            texcoords,
            tangents: tangents && texcoords,
        }
    }

    /// Layout implied by which arrays the source actually has.
    pub fn for_source(source: &MeshSource) -> Self {
        Self::new(source.has_normals(), source.has_texcoords(), true)
    }

    /// Drops tangent space, reproducing the position/normal/uv record.
    pub fn without_tangents(self) -> Self {
        Self {
            tangents: false,
            ..self
        }
    }

    pub fn attributes(&self) -> Vec<VertexAttribute> {
        let mut kinds = vec![AttributeKind::Position];
        if self.normals {
            kinds.push(AttributeKind::Normal);
        }
        if self.texcoords {
            kinds.push(AttributeKind::Texcoord);
            if self.tangents {
                kinds.push(AttributeKind::Tangent);
                kinds.push(AttributeKind::Bitangent);
            }
        }

        let mut offset = 0;
        kinds
            .into_iter()
            .map(|kind| {
                let attribute = VertexAttribute { kind, offset };
                offset += kind.components();
                attribute
            })
            .collect()
    }

    pub fn offset_of(&self, kind: AttributeKind) -> Option<usize> {
        self.attributes()
            .into_iter()
            .find(|a| a.kind == kind)
            .map(|a| a.offset)
    }

    /// Floats per vertex record: 3, 6, 8, 11 or 14.
    pub fn stride(&self) -> usize {
        let mut stride = 3;
        if self.normals {
            stride += 3;
        }
        if self.texcoords {
            stride += if self.tangents { 8 } else { 2 };
        }
        stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_matches_every_layout_variant() {
        assert_eq!(VertexLayout::POSITION_ONLY.stride(), 3);
        assert_eq!(VertexLayout::new(true, false, true).stride(), 6);
        assert_eq!(VertexLayout::new(true, true, false).stride(), 8);
        assert_eq!(VertexLayout::new(false, true, true).stride(), 11);
        assert_eq!(VertexLayout::new(true, true, true).stride(), 14);
    }

    #[test]
    fn attribute_table_covers_exactly_one_stride() {
        for normals in [false, true] {
            for texcoords in [false, true] {
                for tangents in [false, true] {
                    let layout = VertexLayout::new(normals, texcoords, tangents);
                    let extent: usize = layout
                        .attributes()
                        .iter()
                        .map(|a| a.kind.components())
                        .sum();
                    assert_eq!(extent, layout.stride(), "{layout:?}");
                }
            }
        }
    }

    #[test]
    fn tangents_require_texcoords() {
        let layout = VertexLayout::new(true, false, true);
        assert!(!layout.tangents);
        assert_eq!(layout.offset_of(AttributeKind::Tangent), None);
    }

    #[test]
    fn full_layout_offsets() {
        let layout = VertexLayout::new(true, true, true);
        assert_eq!(layout.offset_of(AttributeKind::Normal), Some(3));
        assert_eq!(layout.offset_of(AttributeKind::Texcoord), Some(6));
        assert_eq!(layout.offset_of(AttributeKind::Tangent), Some(8));
        assert_eq!(layout.offset_of(AttributeKind::Bitangent), Some(11));
    }

    #[test]
    fn append_shifts_indices() {
        let mut a = MeshSource::quad();
        a.append(MeshSource::quad());
        assert_eq!(a.triangle_count(), 4);
        assert_eq!(a.corners[6].position, 4);
        assert_eq!(a.corners[6].normal, Some(1));
        assert_eq!(a.corners[6].texcoord, Some(4));
    }
}
