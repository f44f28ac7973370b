use crate::core::math::transform::TransformFactory;
use crate::error::{AssetLoadError, GpuError};
use crate::io::image::load_image;
use crate::pipeline::device::{DIFFUSE_UNIT, GpuDevice, NORMAL_MAP_UNIT, ProgramId};
use crate::pipeline::resources::{GpuTexture, VertexBuffer};
use crate::scene::mesh_builder::{MeshData, load_mesh};
use log::{debug, info, warn};
use nalgebra::{Matrix4, Point3, Vector3};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Everything needed to build a [`RenderableModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDesc {
    pub mesh: PathBuf,
    pub texture: Option<PathBuf>,
    pub normal_map: Option<PathBuf>,
    pub position: Vector3<f32>,
    /// Euler angles in degrees.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub color: Vector3<f32>,
}

impl ModelDesc {
    pub fn new(mesh: impl Into<PathBuf>) -> Self {
        Self {
            mesh: mesh.into(),
            texture: None,
            normal_map: None,
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
            color: Vector3::repeat(1.0),
        }
    }
}

/// A mesh on the device plus its textures and transform.
///
/// Owns every device resource it created; dropping the model releases them.
#[derive(Debug)]
pub struct RenderableModel {
    buffer: VertexBuffer,
    diffuse: Option<GpuTexture>,
    normal_map: Option<GpuTexture>,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub color: Vector3<f32>,
}

impl RenderableModel {
    /// Loads the mesh and textures named by `desc` and uploads them.
    ///
    /// A mesh failure aborts before anything is uploaded. A texture that
    /// fails to load only leaves its slot empty.
    pub fn create(device: &Rc<dyn GpuDevice>, desc: &ModelDesc) -> Result<Self, AssetLoadError> {
        let mesh = load_mesh(&desc.mesh).map_err(|source| AssetLoadError::Mesh {
            path: desc.mesh.display().to_string(),
            source,
        })?;

        let mut model = Self::from_mesh(device, &mesh)?;
        model.diffuse = upload_optional(device, desc.texture.as_deref(), "texture")?;
        model.normal_map = upload_optional(device, desc.normal_map.as_deref(), "normal map")?;
        model.position = desc.position;
        model.rotation = desc.rotation;
        model.scale = desc.scale;
        model.color = desc.color;

        info!(
            "Model {:?} ready: {} vertices, texture: {}, normal map: {}",
            desc.mesh,
            model.vertex_count(),
            model.diffuse.is_some(),
            model.normal_map.is_some()
        );
        Ok(model)
    }

    /// Uploads an already built mesh with an identity transform and white tint.
    pub fn from_mesh(device: &Rc<dyn GpuDevice>, mesh: &MeshData) -> Result<Self, GpuError> {
        Ok(Self {
            buffer: VertexBuffer::upload(device, mesh)?,
            diffuse: None,
            normal_map: None,
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
            color: Vector3::repeat(1.0),
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.vertex_count()
    }

    pub fn stride(&self) -> usize {
        self.buffer.stride()
    }

    pub fn has_texture(&self) -> bool {
        self.diffuse.is_some()
    }

    pub fn has_normal_map(&self) -> bool {
        self.normal_map.is_some()
    }

    pub fn world_position(&self) -> Point3<f32> {
        Point3::from(self.position)
    }

    /// translate · scale · rotX · rotY · rotZ
    pub fn model_matrix(&self) -> Matrix4<f32> {
        TransformFactory::translation(&self.position)
            * TransformFactory::scaling_nonuniform(&self.scale)
            * TransformFactory::rotation_euler_deg(&self.rotation)
    }

    /// Uploads transform, tint and texture bindings, then draws every vertex.
    pub fn draw(&self, program: ProgramId) -> Result<(), GpuError> {
        let device = self.buffer.device();

        device.set_mat4(program, "transform", self.model_matrix());
        device.set_vec4(program, "rgba", self.color.push(1.0));
        device.set_int(program, "tex0", DIFFUSE_UNIT as i32);
        device.set_int(program, "norm_tex", NORMAL_MAP_UNIT as i32);
        device.set_bool(program, "hasTexture", self.has_texture());
        device.set_bool(program, "hasNormalMap", self.has_normal_map());

        // An empty slot unbinds its unit so no earlier model's map leaks in.
        device.bind_texture(DIFFUSE_UNIT, self.diffuse.as_ref().map(GpuTexture::id));
        device.bind_texture(NORMAL_MAP_UNIT, self.normal_map.as_ref().map(GpuTexture::id));

        self.buffer.draw(program)
    }
}

fn upload_optional(
    device: &Rc<dyn GpuDevice>,
    path: Option<&Path>,
    what: &str,
) -> Result<Option<GpuTexture>, GpuError> {
    let Some(path) = path else {
        return Ok(None);
    };
    match load_image(path) {
        Ok(image) => {
            let texture = GpuTexture::upload(device, &image)?;
            let (width, height) = texture.size();
            debug!("Uploaded {} {:?} ({}x{})", what, path, width, height);
            Ok(Some(texture))
        }
        Err(e) => {
            warn!("Failed to load {} {:?}: {}", what, path, e);
            Ok(None)
        }
    }
}
