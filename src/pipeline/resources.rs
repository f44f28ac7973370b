//! Owning handles for device resources. Dropping a handle frees the resource.

use crate::error::GpuError;
use crate::io::image::ImageData;
use crate::pipeline::device::{BufferId, GpuDevice, ProgramId, TextureId};
use crate::scene::mesh_builder::MeshData;
use log::debug;
use std::fmt;
use std::rc::Rc;

/// An uploaded interleaved vertex buffer with a fixed stride.
pub struct VertexBuffer {
    device: Rc<dyn GpuDevice>,
    id: BufferId,
    stride: usize,
    vertex_count: usize,
}

impl VertexBuffer {
    pub fn upload(device: &Rc<dyn GpuDevice>, mesh: &MeshData) -> Result<Self, GpuError> {
        let id = device.create_vertex_buffer(&mesh.vertices, mesh.layout)?;
        Ok(Self {
            device: Rc::clone(device),
            id,
            stride: mesh.stride(),
            vertex_count: mesh.vertex_count(),
        })
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn device(&self) -> &Rc<dyn GpuDevice> {
        &self.device
    }

    /// Draws the whole buffer as a triangle list.
    pub fn draw(&self, program: ProgramId) -> Result<(), GpuError> {
        self.device
            .draw_arrays(program, self.id, 0, self.vertex_count)
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        debug!("Releasing vertex buffer {:?}", self.id);
        self.device.delete_vertex_buffer(self.id);
    }
}

impl fmt::Debug for VertexBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("id", &self.id)
            .field("stride", &self.stride)
            .field("vertex_count", &self.vertex_count)
            .finish()
    }
}

/// An uploaded 2D texture.
pub struct GpuTexture {
    device: Rc<dyn GpuDevice>,
    id: TextureId,
    width: u32,
    height: u32,
}

impl GpuTexture {
    pub fn upload(device: &Rc<dyn GpuDevice>, image: &ImageData) -> Result<Self, GpuError> {
        let id = device.create_texture(image)?;
        Ok(Self {
            device: Rc::clone(device),
            id,
            width: image.width,
            height: image.height,
        })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        debug!("Releasing texture {:?}", self.id);
        self.device.delete_texture(self.id);
    }
}

impl fmt::Debug for GpuTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuTexture")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
