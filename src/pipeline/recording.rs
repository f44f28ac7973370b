//! A device that performs no rendering and records every call.
//!
//! Used by the `--dry-run` CLI mode and by tests that check which uniforms and
//! draws the scene issues.

use crate::error::GpuError;
use crate::io::image::ImageData;
use crate::pipeline::device::{
    BufferId, GpuDevice, ProgramId, TextureId, UniformValue, draw_range_end,
};
use crate::scene::mesh::VertexLayout;
use nalgebra::Vector3;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateProgram(String),
    CreateBuffer { id: BufferId, floats: usize, stride: usize },
    DeleteBuffer(BufferId),
    CreateTexture { id: TextureId, width: u32, height: u32 },
    DeleteTexture(TextureId),
    SetUniform { name: String, value: UniformValue },
    BindTexture { unit: u32, texture: Option<TextureId> },
    Draw { buffer: BufferId, first: usize, count: usize },
    Clear,
}

#[derive(Default)]
pub struct RecordingDevice {
    calls: RefCell<Vec<DeviceCall>>,
    next_id: Cell<u32>,
    live_buffers: RefCell<HashMap<BufferId, usize>>,
    live_textures: RefCell<HashSet<TextureId>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers.borrow().len()
    }

    pub fn live_textures(&self) -> usize {
        self.live_textures.borrow().len()
    }

    /// Last value set for a uniform, if any.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            DeviceCall::SetUniform { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    pub fn draws(&self) -> Vec<(BufferId, usize, usize)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Draw {
                    buffer,
                    first,
                    count,
                } => Some((*buffer, *first, *count)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DeviceCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl GpuDevice for RecordingDevice {
    fn create_program(&self, name: &str) -> Result<ProgramId, GpuError> {
        self.record(DeviceCall::CreateProgram(name.to_string()));
        Ok(ProgramId(self.next()))
    }

    fn create_vertex_buffer(
        &self,
        vertices: &[f32],
        layout: VertexLayout,
    ) -> Result<BufferId, GpuError> {
        let stride = layout.stride();
        if vertices.len() % stride != 0 {
            return Err(GpuError::BadVertexData {
                len: vertices.len(),
                stride,
            });
        }
        let id = BufferId(self.next());
        self.live_buffers
            .borrow_mut()
            .insert(id, vertices.len() / stride);
        self.record(DeviceCall::CreateBuffer {
            id,
            floats: vertices.len(),
            stride,
        });
        Ok(id)
    }

    fn delete_vertex_buffer(&self, buffer: BufferId) {
        self.live_buffers.borrow_mut().remove(&buffer);
        self.record(DeviceCall::DeleteBuffer(buffer));
    }

    fn create_texture(&self, image: &ImageData) -> Result<TextureId, GpuError> {
        if image.pixels.len() != image.expected_len() {
            return Err(GpuError::BadTextureData {
                expected: image.expected_len(),
                actual: image.pixels.len(),
            });
        }
        let id = TextureId(self.next());
        self.live_textures.borrow_mut().insert(id);
        self.record(DeviceCall::CreateTexture {
            id,
            width: image.width,
            height: image.height,
        });
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        self.live_textures.borrow_mut().remove(&texture);
        self.record(DeviceCall::DeleteTexture(texture));
    }

    fn set_uniform(&self, _program: ProgramId, name: &str, value: UniformValue) {
        self.record(DeviceCall::SetUniform {
            name: name.to_string(),
            value,
        });
    }

    fn bind_texture(&self, unit: u32, texture: Option<TextureId>) {
        self.record(DeviceCall::BindTexture { unit, texture });
    }

    fn draw_arrays(
        &self,
        _program: ProgramId,
        buffer: BufferId,
        first: usize,
        count: usize,
    ) -> Result<(), GpuError> {
        let available = *self
            .live_buffers
            .borrow()
            .get(&buffer)
            .ok_or(GpuError::UnknownHandle {
                kind: "buffer",
                id: buffer.0,
            })?;
        draw_range_end(first, count, available)?;
        self.record(DeviceCall::Draw {
            buffer,
            first,
            count,
        });
        Ok(())
    }

    fn clear(&self, _color: Vector3<f32>) {
        self.record(DeviceCall::Clear);
    }
}
