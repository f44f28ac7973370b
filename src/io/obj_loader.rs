use crate::error::MeshLoadError;
use crate::scene::mesh::{Corner, MeshSource};
use log::{info, warn};
use std::io::BufRead;
use std::path::{Path, PathBuf};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        // Keep OBJ's per-attribute indices; corners are resolved by the mesh builder.
        single_index: false,
        ..Default::default()
    }
}

/// Loads an OBJ file into a [`MeshSource`], merging all of its shapes.
///
/// Materials referenced by the file are ignored.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshSource, MeshLoadError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(MeshLoadError::EmptyPath);
    }
    if !path.exists() {
        return Err(MeshLoadError::NotFound(path.to_path_buf()));
    }

    info!("Loading OBJ file: {:?}", path);

    let (models, _materials) =
        tobj::load_obj(path, &load_options()).map_err(|source| MeshLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    collect_models(models, path)
}

/// Parses OBJ text from any reader. `name` is only used in messages.
pub fn parse_obj<R: BufRead>(reader: &mut R, name: &str) -> Result<MeshSource, MeshLoadError> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Ok((Vec::new(), Default::default()))
    })
    .map_err(|source| MeshLoadError::Parse {
        path: PathBuf::from(name),
        source,
    })?;

    collect_models(models, Path::new(name))
}

fn collect_models(models: Vec<tobj::Model>, path: &Path) -> Result<MeshSource, MeshLoadError> {
    if models.is_empty() {
        return Err(MeshLoadError::Empty);
    }

    let mut parts = models
        .into_iter()
        .map(|model| convert_mesh(&model.name, model.mesh))
        .collect::<Result<Vec<_>, _>>()?;

    // An attribute survives the merge only if every shape carries it.
    if parts.iter().any(|p| p.has_normals()) && !parts.iter().all(|p| p.has_normals()) {
        warn!("{:?}: some shapes lack normals; dropping normals for the whole mesh.", path);
        parts.iter_mut().for_each(drop_normals);
    }
    if parts.iter().any(|p| p.has_texcoords()) && !parts.iter().all(|p| p.has_texcoords()) {
        warn!("{:?}: some shapes lack texcoords; dropping texcoords for the whole mesh.", path);
        parts.iter_mut().for_each(drop_texcoords);
    }

    let mut source = MeshSource::default();
    for part in parts {
        source.append(part);
    }

    if source.corners.is_empty() {
        return Err(MeshLoadError::Empty);
    }

    info!(
        "OBJ {:?} parsed: {} triangles, normals: {}, texcoords: {}",
        path,
        source.triangle_count(),
        source.has_normals(),
        source.has_texcoords()
    );
    Ok(source)
}

fn drop_normals(part: &mut MeshSource) {
    part.normals.clear();
    part.corners.iter_mut().for_each(|c| c.normal = None);
}

fn drop_texcoords(part: &mut MeshSource) {
    part.texcoords.clear();
    part.corners.iter_mut().for_each(|c| c.texcoord = None);
}

fn convert_mesh(name: &str, mesh: tobj::Mesh) -> Result<MeshSource, MeshLoadError> {
    let corner_count = mesh.indices.len();

    let normal_indices = attribute_indices(&mesh.normal_indices, corner_count, "normal", name)?;
    let texcoord_indices =
        attribute_indices(&mesh.texcoord_indices, corner_count, "texcoord", name)?;

    let normals = if normal_indices.is_some() {
        mesh.normals
    } else {
        if !mesh.normals.is_empty() {
            warn!("Shape '{}' has normals but no normal indices; ignoring them.", name);
        }
        Vec::new()
    };
    let texcoords = if texcoord_indices.is_some() {
        mesh.texcoords
    } else {
        Vec::new()
    };

    if normals.is_empty() {
        warn!("Shape '{}' is missing normals.", name);
    }

    let corners = mesh
        .indices
        .iter()
        .enumerate()
        .map(|(i, &p)| Corner {
            position: p as usize,
            normal: normal_indices.map(|n| n[i] as usize),
            texcoord: texcoord_indices.map(|t| t[i] as usize),
        })
        .collect();

    Ok(MeshSource {
        positions: mesh.positions,
        normals,
        texcoords,
        corners,
    })
}

/// `Some(indices)` when the attribute is indexed for every corner, `None` when absent.
fn attribute_indices<'a>(
    indices: &'a [u32],
    corner_count: usize,
    attribute: &str,
    shape: &str,
) -> Result<Option<&'a [u32]>, MeshLoadError> {
    if indices.is_empty() {
        return Ok(None);
    }
    if indices.len() != corner_count {
        return Err(MeshLoadError::MalformedFaces(format!(
            "shape '{shape}' has {} {attribute} indices for {corner_count} corners",
            indices.len()
        )));
    }
    Ok(Some(indices))
}
