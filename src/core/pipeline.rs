use crate::core::geometry::Vertex;
use nalgebra::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Values that can be linearly interpolated across a triangle's surface.
///
/// Clipping and barycentric interpolation only need `a * s + b * t`.
pub trait Interpolatable: Copy + Add<Output = Self> + Mul<f32, Output = Self> {}

impl<T> Interpolatable for T where T: Copy + Add<Output = T> + Mul<f32, Output = T> {}

/// The programmable stages of the software pipeline.
pub trait Shader {
    /// Per-vertex outputs interpolated for each fragment.
    type Varying: Interpolatable;

    /// Transforms a vertex into homogeneous clip space and emits its varying.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Linear RGB color in [0, 1] for one fragment.
    fn fragment(&self, varying: Self::Varying) -> Vector3<f32>;
}
