use crate::core::math::transform::facing_xz;
use crate::pipeline::device::{GpuDevice, ProgramId};
use nalgebra::{Point3, Vector3};

pub const DEFAULT_CONSTANT: f32 = 1.0;
pub const DEFAULT_LINEAR: f32 = 0.07;
pub const DEFAULT_QUADRATIC: f32 = 0.017;

/// How far behind and above a followed target a point light sits.
pub const FOLLOW_DISTANCE: f32 = 2.0;
pub const FOLLOW_HEIGHT: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Infinitely far away; `direction` is the way the light travels.
    Directional { direction: Vector3<f32> },
    /// Radiates from `position`, attenuated by 1 / (c + l·d + q·d²).
    Point {
        position: Point3<f32>,
        constant: f32,
        linear: f32,
        quadratic: f32,
    },
}

/// A light and the uniform struct it uploads to.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Uniform struct name, e.g. `dirLight`.
    pub name: String,
    pub ambient_str: f32,
    pub spec_str: f32,
    pub spec_phong: f32,
    pub light_color: Vector3<f32>,
    pub ambient_color: Vector3<f32>,
    pub kind: LightKind,
}

impl Light {
    pub fn directional(name: impl Into<String>, direction: Vector3<f32>) -> Self {
        Self::with_kind(name, LightKind::Directional { direction })
    }

    pub fn point(name: impl Into<String>, position: Point3<f32>) -> Self {
        Self::with_kind(
            name,
            LightKind::Point {
                position,
                constant: DEFAULT_CONSTANT,
                linear: DEFAULT_LINEAR,
                quadratic: DEFAULT_QUADRATIC,
            },
        )
    }

    fn with_kind(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            ambient_str: 0.1,
            spec_str: 0.5,
            spec_phong: 32.0,
            light_color: Vector3::repeat(1.0),
            ambient_color: Vector3::repeat(1.0),
            kind,
        }
    }

    pub fn position(&self) -> Option<Point3<f32>> {
        match self.kind {
            LightKind::Point { position, .. } => Some(position),
            LightKind::Directional { .. } => None,
        }
    }

    pub fn set_position(&mut self, new_position: Point3<f32>) {
        if let LightKind::Point { position, .. } = &mut self.kind {
            *position = new_position;
        }
    }

    fn uniform(&self, field: &str) -> String {
        format!("{}.{}", self.name, field)
    }

    /// Uploads the parameters every light kind shares.
    pub fn apply_uniforms(&self, device: &dyn GpuDevice, program: ProgramId) {
        device.set_float(program, &self.uniform("ambientStr"), self.ambient_str);
        device.set_float(program, &self.uniform("specStr"), self.spec_str);
        device.set_float(program, &self.uniform("specPhong"), self.spec_phong);
        device.set_vec3(program, &self.uniform("lightColor"), self.light_color);
        device.set_vec3(program, &self.uniform("ambientColor"), self.ambient_color);
    }

    /// Uploads the variant-specific parameters.
    pub fn apply_extra_uniforms(&self, device: &dyn GpuDevice, program: ProgramId) {
        match self.kind {
            LightKind::Directional { direction } => {
                device.set_vec3(program, &self.uniform("direction"), direction);
            }
            LightKind::Point {
                position,
                constant,
                linear,
                quadratic,
            } => {
                device.set_vec3(program, &self.uniform("position"), position.coords);
                device.set_float(program, &self.uniform("constant"), constant);
                device.set_float(program, &self.uniform("linear"), linear);
                device.set_float(program, &self.uniform("quadratic"), quadratic);
            }
        }
    }

    /// Changes ambient and specular strength together, never below zero.
    pub fn adjust_brightness(&mut self, delta: f32) {
        self.ambient_str = (self.ambient_str + delta).max(0.0);
        self.spec_str = (self.spec_str + delta).max(0.0);
    }

    /// Parks a point light behind and above a target facing `facing_deg`.
    pub fn follow(&mut self, target: &Point3<f32>, facing_deg: f32) {
        let position = target - facing_xz(facing_deg) * FOLLOW_DISTANCE
            + Vector3::new(0.0, FOLLOW_HEIGHT, 0.0);
        self.set_position(position);
    }
}
