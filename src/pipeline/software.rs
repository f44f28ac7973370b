//! CPU implementation of [`GpuDevice`].
//!
//! Runs a single built-in program, [`PHONG_PROGRAM`], through the software
//! rasterizer. Enough to render scenes headless and to test what the scene
//! code uploads.

use crate::core::geometry::Vertex;
use crate::core::rasterizer::CullMode;
use crate::error::GpuError;
use crate::io::image::{ImageData, save_rgb_image};
use crate::pipeline::device::{
    BufferId, DIFFUSE_UNIT, GpuDevice, NORMAL_MAP_UNIT, ProgramId, TextureId, UniformValue,
    draw_range_end,
};
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::phong::PhongShader;
use crate::scene::mesh::VertexLayout;
use log::{debug, trace};
use nalgebra::Vector3;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Name of the only program the software device can build.
pub const PHONG_PROGRAM: &str = "phong";

const TEXTURE_UNITS: usize = 2;

struct StoredBuffer {
    vertices: Vec<f32>,
    layout: VertexLayout,
}

impl StoredBuffer {
    fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.stride()
    }
}

struct DeviceState {
    renderer: Renderer,
    next_id: u32,
    programs: HashMap<ProgramId, HashMap<String, UniformValue>>,
    buffers: HashMap<BufferId, StoredBuffer>,
    textures: HashMap<TextureId, ImageData>,
    units: [Option<TextureId>; TEXTURE_UNITS],
    reported_missing: HashSet<String>,
}

impl DeviceState {
    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct SoftwareDevice {
    state: RefCell<DeviceState>,
}

impl SoftwareDevice {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            state: RefCell::new(DeviceState {
                renderer: Renderer::new(width, height),
                next_id: 0,
                programs: HashMap::new(),
                buffers: HashMap::new(),
                textures: HashMap::new(),
                units: [None; TEXTURE_UNITS],
                reported_missing: HashSet::new(),
            }),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        let state = self.state.borrow();
        (state.renderer.framebuffer.width, state.renderer.framebuffer.height)
    }

    pub fn set_cull_mode(&self, mode: CullMode) {
        self.state.borrow_mut().renderer.rasterizer.set_cull_mode(mode);
    }

    /// Color at (x, y), with y counted from the top row.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Vector3<f32>> {
        self.state.borrow().renderer.framebuffer.get_pixel(x, y)
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Quantizes the color buffer and writes it to an image file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        let state = self.state.borrow();
        let fb = &state.renderer.framebuffer;
        save_rgb_image(fb.to_rgb8(), fb.width, fb.height, path)
    }
}

impl GpuDevice for SoftwareDevice {
    fn create_program(&self, name: &str) -> Result<ProgramId, GpuError> {
        if name != PHONG_PROGRAM {
            return Err(GpuError::ShaderCompile {
                name: name.to_string(),
                reason: format!("software device only provides '{PHONG_PROGRAM}'"),
            });
        }
        let mut state = self.state.borrow_mut();
        let id = ProgramId(state.allocate_id());
        state.programs.insert(id, HashMap::new());
        debug!("Created program '{}' as {:?}", name, id);
        Ok(id)
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
        let mut state = self.state.borrow_mut();
        let id = BufferId(state.allocate_id());
        state.buffers.insert(
            id,
            StoredBuffer {
                vertices: vertices.to_vec(),
                layout,
            },
        );
        Ok(id)
    }

    fn delete_vertex_buffer(&self, buffer: BufferId) {
        self.state.borrow_mut().buffers.remove(&buffer);
    }

    fn create_texture(&self, image: &ImageData) -> Result<TextureId, GpuError> {
        if image.pixels.len() != image.expected_len() {
            return Err(GpuError::BadTextureData {
                expected: image.expected_len(),
                actual: image.pixels.len(),
            });
        }
        let mut state = self.state.borrow_mut();
        let id = TextureId(state.allocate_id());
        state.textures.insert(id, image.clone());
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture);
        for unit in state.units.iter_mut() {
            if *unit == Some(texture) {
                *unit = None;
            }
        }
    }

    fn set_uniform(&self, program: ProgramId, name: &str, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        match state.programs.get_mut(&program) {
            Some(uniforms) => {
                uniforms.insert(name.to_string(), value);
            }
            None => trace!("Uniform '{}' set on unknown program {:?}", name, program),
        }
    }

    fn bind_texture(&self, unit: u32, texture: Option<TextureId>) {
        let mut state = self.state.borrow_mut();
        match state.units.get_mut(unit as usize) {
            Some(slot) => *slot = texture,
            None => trace!("Ignoring bind to texture unit {}", unit),
        }
    }

    fn draw_arrays(
        &self,
        program: ProgramId,
        buffer: BufferId,
        first: usize,
        count: usize,
    ) -> Result<(), GpuError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let uniforms = state.programs.get(&program).ok_or(GpuError::UnknownHandle {
            kind: "program",
            id: program.0,
        })?;
        let stored = state.buffers.get(&buffer).ok_or(GpuError::UnknownHandle {
            kind: "buffer",
            id: buffer.0,
        })?;

        let available = stored.vertex_count();
        let end = draw_range_end(first, count, available)?;

        let bound = |unit: u32| {
            state.units[unit as usize].and_then(|id| state.textures.get(&id))
        };
        let (shader, missing) =
            PhongShader::from_uniforms(uniforms, bound(DIFFUSE_UNIT), bound(NORMAL_MAP_UNIT));
        for name in missing {
            if state.reported_missing.insert(name.clone()) {
                trace!("Uniform '{}' was never set; using its default", name);
            }
        }

        let stride = stored.layout.stride();
        let vertices: Vec<Vertex> = stored.vertices[first * stride..end * stride]
            .chunks_exact(stride)
            .map(|record| Vertex::decode(record, &stored.layout))
            .collect();

        state.renderer.draw_vertices(&vertices, &shader);
        Ok(())
    }

    fn clear(&self, color: Vector3<f32>) {
        self.state.borrow_mut().renderer.clear(color);
    }
}
