//! The seam between scene code and whatever executes draws.
//!
//! Scene objects only ever talk to a [`GpuDevice`]: upload a vertex buffer
//! or texture, set named uniforms, bind textures to units, draw. An OpenGL
//! backend and the bundled software device both fit behind it.

use crate::error::GpuError;
use crate::io::image::ImageData;
use crate::scene::mesh::VertexLayout;
use nalgebra::{Matrix4, Vector3, Vector4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Texture unit the diffuse map is bound to.
pub const DIFFUSE_UNIT: u32 = 0;
/// Texture unit the normal map is bound to.
pub const NORMAL_MAP_UNIT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Mat4(Matrix4<f32>),
}

impl UniformValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            UniformValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vector3<f32>> {
        match self {
            UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec4(&self) -> Option<Vector4<f32>> {
        match self {
            UniformValue::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_mat4(&self) -> Option<Matrix4<f32>> {
        match self {
            UniformValue::Mat4(v) => Some(*v),
            _ => None,
        }
    }
}

/// End of the vertex range `first..first + count`, checked against `available`.
pub fn draw_range_end(first: usize, count: usize, available: usize) -> Result<usize, GpuError> {
    match first.checked_add(count) {
        Some(end) if end <= available => Ok(end),
        end => Err(GpuError::DrawOutOfRange {
            first,
            end: end.unwrap_or(usize::MAX),
            available,
        }),
    }
}

/// Shader backend and GPU resource owner.
///
/// Methods take `&self`: a device is shared by every resource handle through
/// an `Rc` and keeps its mutable state behind interior mutability. All calls
/// come from the frame-loop thread.
pub trait GpuDevice {
    /// Looks up (or builds) a named shader program.
    fn create_program(&self, name: &str) -> Result<ProgramId, GpuError>;

    fn create_vertex_buffer(
        &self,
        vertices: &[f32],
        layout: VertexLayout,
    ) -> Result<BufferId, GpuError>;
    fn delete_vertex_buffer(&self, buffer: BufferId);

    fn create_texture(&self, image: &ImageData) -> Result<TextureId, GpuError>;
    fn delete_texture(&self, texture: TextureId);

    fn set_uniform(&self, program: ProgramId, name: &str, value: UniformValue);

    /// Binds `texture` to `unit`, or unbinds the unit with `None`.
    fn bind_texture(&self, unit: u32, texture: Option<TextureId>);

    /// Draws `count` vertices starting at `first` as a triangle list.
    fn draw_arrays(
        &self,
        program: ProgramId,
        buffer: BufferId,
        first: usize,
        count: usize,
    ) -> Result<(), GpuError>;

    /// Clears color and depth.
    fn clear(&self, color: Vector3<f32>);

    fn set_int(&self, program: ProgramId, name: &str, value: i32) {
        self.set_uniform(program, name, UniformValue::Int(value));
    }

    fn set_float(&self, program: ProgramId, name: &str, value: f32) {
        self.set_uniform(program, name, UniformValue::Float(value));
    }

    fn set_vec3(&self, program: ProgramId, name: &str, value: Vector3<f32>) {
        self.set_uniform(program, name, UniformValue::Vec3(value));
    }

    fn set_vec4(&self, program: ProgramId, name: &str, value: Vector4<f32>) {
        self.set_uniform(program, name, UniformValue::Vec4(value));
    }

    fn set_mat4(&self, program: ProgramId, name: &str, value: Matrix4<f32>) {
        self.set_uniform(program, name, UniformValue::Mat4(value));
    }

    fn set_bool(&self, program: ProgramId, name: &str, value: bool) {
        self.set_int(program, name, i32::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_range_end_checks_bounds() {
        assert_eq!(draw_range_end(0, 6, 6).unwrap(), 6);
        assert!(matches!(
            draw_range_end(3, 6, 6),
            Err(GpuError::DrawOutOfRange { end: 9, .. })
        ));
    }

    #[test]
    fn overflowing_draw_range_is_out_of_range() {
        assert!(matches!(
            draw_range_end(usize::MAX, 2, 6),
            Err(GpuError::DrawOutOfRange { end: usize::MAX, .. })
        ));
    }
}
