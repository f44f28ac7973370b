use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::{Interpolatable, Shader};
use nalgebra::{Point2, Vector4};

/// Which triangle winding is discarded before shading.
///
/// Defaults to `None`, matching a freshly created GL context.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum CullMode {
    Back,
    Front,
    #[default]
    None,
}

/// Draws clip-space triangles into a [`FrameBuffer`].
#[derive(Debug, Default)]
pub struct Rasterizer {
    pub cull_mode: CullMode,
}

type ClipVertex<V> = (Vector4<f32>, V);

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Rasterizes one triangle given clip-space positions and varyings.
    ///
    /// The triangle is clipped against the six frustum planes in homogeneous
    /// clip space (Sutherland–Hodgman), then the resulting convex polygon is
    /// fanned into triangles and scan-converted.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        // A triangle clipped by six planes has at most nine vertices.
        let mut current: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(12);
        let mut scratch: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(12);
        current.extend((0..3).map(|i| (clip_coords[i], varyings[i])));

        // (axis, sign): inside when sign * p[axis] <= p.w
        let planes = [
            (0, 1.0),
            (0, -1.0),
            (1, 1.0),
            (1, -1.0),
            (2, 1.0),
            (2, -1.0),
        ];

        for &(axis, sign) in &planes {
            if current.is_empty() {
                return;
            }
            clip_polygon_against_plane(&current, &mut scratch, axis, sign);
            std::mem::swap(&mut current, &mut scratch);
        }

        if current.len() < 3 {
            return;
        }

        let v0 = current[0];
        for pair in current[1..].windows(2) {
            let (v1, v2) = (pair[0], pair[1]);
            self.rasterize_clipped(framebuffer, shader, &[v0.0, v1.0, v2.0], &[v0.1, v1.1, v2.1]);
        }
    }

    /// Scan-converts a triangle already inside the frustum.
    fn rasterize_clipped<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        let width = framebuffer.width as f32;
        let height = framebuffer.height as f32;

        let mut screen = [Point2::origin(); 3];
        let mut ndc_z = [0.0; 3];
        let mut w = [0.0; 3];
        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
            ndc_z[i] = ndc.z;
            w[i] = clip_coords[i].w;
        }

        // Screen Y points down, so counter-clockwise triangles have negative area here.
        let e1 = screen[1] - screen[0];
        let e2 = screen[2] - screen[1];
        let signed_area = e1.x * e2.y - e1.y * e2.x;
        match self.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        let (min_x, min_y, max_x, max_y) = bounding_box(&screen);
        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.width as i32
            || min_y >= framebuffer.height as i32
        {
            return;
        }

        let start_x = min_x.max(0) as usize;
        let end_x = max_x.min(framebuffer.width as i32 - 1) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = max_y.min(framebuffer.height as i32 - 1) as usize;

        for y in start_y..=end_y {
            for x in start_x..=end_x {
                let center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(bary) = barycentric_coordinates(center, screen[0], screen[1], screen[2])
                else {
                    continue;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }

                // NDC depth is affine in screen space.
                let z = bary.x * ndc_z[0] + bary.y * ndc_z[1] + bary.z * ndc_z[2];
                let depth = z * 0.5 + 0.5;
                if !framebuffer.depth_test_and_update(x, y, depth) {
                    continue;
                }

                let Some(corrected) = perspective_correct_barycentric(bary, w) else {
                    continue;
                };
                let varying = varyings[0] * corrected.x
                    + varyings[1] * corrected.y
                    + varyings[2] * corrected.z;
                framebuffer.set_pixel(x, y, shader.fragment(varying));
            }
        }
    }
}

/// Clips a polygon against one plane, writing the result into `output`.
fn clip_polygon_against_plane<V: Interpolatable>(
    input: &[ClipVertex<V>],
    output: &mut Vec<ClipVertex<V>>,
    axis: usize,
    sign: f32,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let is_inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;
    let mut prev = last;
    let mut prev_inside = is_inside(&prev.0);

    for &curr in input {
        let curr_inside = is_inside(&curr.0);
        if curr_inside != prev_inside {
            if let Some(point) = intersect_edge_plane(prev, curr, axis, sign) {
                output.push(point);
            }
        }
        if curr_inside {
            output.push(curr);
        }
        prev = curr;
        prev_inside = curr_inside;
    }
}

/// Intersection of segment `a`-`b` with the plane `sign * p[axis] = p.w`.
#[inline]
fn intersect_edge_plane<V: Interpolatable>(
    a: ClipVertex<V>,
    b: ClipVertex<V>,
    axis: usize,
    sign: f32,
) -> Option<ClipVertex<V>> {
    let denom = sign * (b.0[axis] - a.0[axis]) - (b.0.w - a.0.w);
    if denom.abs() < 1e-9 {
        return None;
    }
    let t = (a.0.w - sign * a.0[axis]) / denom;
    if !t.is_finite() {
        return None;
    }
    Some((a.0 + (b.0 - a.0) * t, a.1 * (1.0 - t) + b.1 * t))
}

fn bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
    let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
    let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
    let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
    let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
    (min_x, min_y, max_x, max_y)
}
