use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::Rasterizer;
use nalgebra::Vector3;

/// Runs the vertex stage, primitive assembly and rasterization for triangle lists.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height),
        }
    }

    pub fn clear(&mut self, color: Vector3<f32>) {
        self.framebuffer.clear(color);
    }

    /// Draws every complete triangle of an unindexed vertex list.
    pub fn draw_vertices<S: Shader>(&mut self, vertices: &[Vertex], shader: &S) {
        for triangle in vertices.chunks_exact(3) {
            let (pos0, var0) = shader.vertex(&triangle[0]);
            let (pos1, var1) = shader.vertex(&triangle[1]);
            let (pos2, var2) = shader.vertex(&triangle[2]);

            self.rasterizer.rasterize_triangle(
                &mut self.framebuffer,
                shader,
                &[pos0, pos1, pos2],
                &[var0, var1, var2],
            );
        }
    }
}
