use crate::core::color::rgba_from_bytes;
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::io::image::ImageData;
use crate::pipeline::device::UniformValue;
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use std::collections::HashMap;
use std::ops::{Add, Mul};

/// Uniform struct names the fragment stage reads lights from.
pub const DIRECTIONAL_LIGHT: &str = "dirLight";
pub const POINT_LIGHT: &str = "pointLight";

/// Data interpolated from the vertex stage to the fragment stage.
#[derive(Clone, Copy, Debug)]
pub struct PhongVarying {
    pub world_pos: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Vector2<f32>,
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
}

impl Add for PhongVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            world_pos: self.world_pos + other.world_pos,
            normal: self.normal + other.normal,
            uv: self.uv + other.uv,
            tangent: self.tangent + other.tangent,
            bitangent: self.bitangent + other.bitangent,
        }
    }
}

impl Mul<f32> for PhongVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            world_pos: self.world_pos * scalar,
            normal: self.normal * scalar,
            uv: self.uv * scalar,
            tangent: self.tangent * scalar,
            bitangent: self.bitangent * scalar,
        }
    }
}

/// Shared Phong terms of one light as read from its uniform struct.
#[derive(Debug, Clone, Copy)]
pub struct LightTerms {
    pub ambient_str: f32,
    pub spec_str: f32,
    pub spec_phong: f32,
    pub light_color: Vector3<f32>,
    pub ambient_color: Vector3<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct PointTerms {
    pub terms: LightTerms,
    pub position: Vector3<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointTerms {
    pub fn attenuation(&self, distance: f32) -> f32 {
        let denom = self.constant + self.linear * distance + self.quadratic * distance * distance;
        if denom > 0.0 { 1.0 / denom } else { 1.0 }
    }
}

/// Reads typed values from a program's uniform table, remembering what was absent.
struct UniformReader<'a> {
    values: &'a HashMap<String, UniformValue>,
    missing: Vec<String>,
}

impl<'a> UniformReader<'a> {
    fn lookup<T>(&mut self, name: &str, get: impl Fn(&UniformValue) -> Option<T>) -> Option<T> {
        let found = self.values.get(name).and_then(get);
        if found.is_none() {
            self.missing.push(name.to_string());
        }
        found
    }

    fn float(&mut self, name: &str, default: f32) -> f32 {
        self.lookup(name, UniformValue::as_float).unwrap_or(default)
    }

    fn int(&mut self, name: &str, default: i32) -> i32 {
        self.lookup(name, UniformValue::as_int).unwrap_or(default)
    }

    fn vec3(&mut self, name: &str, default: Vector3<f32>) -> Vector3<f32> {
        self.lookup(name, UniformValue::as_vec3).unwrap_or(default)
    }

    fn vec4(&mut self, name: &str, default: Vector4<f32>) -> Vector4<f32> {
        self.lookup(name, UniformValue::as_vec4).unwrap_or(default)
    }

    fn mat4(&mut self, name: &str) -> Matrix4<f32> {
        self.lookup(name, UniformValue::as_mat4)
            .unwrap_or_else(Matrix4::identity)
    }

    fn light(&mut self, prefix: &str) -> Option<LightTerms> {
        // A light that never uploaded its color is treated as absent.
        self.values.get(&format!("{prefix}.lightColor"))?;
        Some(LightTerms {
            ambient_str: self.float(&format!("{prefix}.ambientStr"), 0.0),
            spec_str: self.float(&format!("{prefix}.specStr"), 0.0),
            spec_phong: self.float(&format!("{prefix}.specPhong"), 16.0),
            light_color: self.vec3(&format!("{prefix}.lightColor"), Vector3::zeros()),
            ambient_color: self.vec3(&format!("{prefix}.ambientColor"), Vector3::repeat(1.0)),
        })
    }
}

/// The built-in program of the software device: Phong lighting from one
/// directional and one point light, optional diffuse texture and tangent-space
/// normal map.
pub struct PhongShader<'a> {
    pub model: Matrix4<f32>,
    pub normal_matrix: Matrix3<f32>,
    pub mvp: Matrix4<f32>,
    pub camera_pos: Point3<f32>,
    pub tint: Vector3<f32>,
    pub directional: Option<(LightTerms, Vector3<f32>)>,
    pub point: Option<PointTerms>,
    pub diffuse: Option<&'a ImageData>,
    pub normal_map: Option<&'a ImageData>,
}

impl<'a> PhongShader<'a> {
    /// Builds the shader from uniforms and bound textures.
    ///
    /// Also returns the names of uniforms that were read but never set; their
    /// defaults were used.
    pub fn from_uniforms(
        uniforms: &HashMap<String, UniformValue>,
        diffuse: Option<&'a ImageData>,
        normal_map: Option<&'a ImageData>,
    ) -> (Self, Vec<String>) {
        let mut reader = UniformReader {
            values: uniforms,
            missing: Vec::new(),
        };

        let model = reader.mat4("transform");
        let view = reader.mat4("view");
        let projection = reader.mat4("projection");
        let camera = reader.vec3("cameraPos", Vector3::zeros());
        let rgba = reader.vec4("rgba", Vector4::repeat(1.0));
        let has_texture = reader.int("hasTexture", 0) != 0;
        let has_normal_map = reader.int("hasNormalMap", 0) != 0;

        let directional = reader.light(DIRECTIONAL_LIGHT).map(|terms| {
            let dir = reader.vec3(&format!("{DIRECTIONAL_LIGHT}.direction"), -Vector3::y());
            (terms, dir)
        });
        let point = reader.light(POINT_LIGHT).map(|terms| PointTerms {
            terms,
            position: reader.vec3(&format!("{POINT_LIGHT}.position"), Vector3::zeros()),
            constant: reader.float(&format!("{POINT_LIGHT}.constant"), 1.0),
            linear: reader.float(&format!("{POINT_LIGHT}.linear"), 0.0),
            quadratic: reader.float(&format!("{POINT_LIGHT}.quadratic"), 0.0),
        });

        let upper = model.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = upper
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(upper);

        let shader = Self {
            model,
            normal_matrix,
            mvp: projection * view * model,
            camera_pos: Point3::from(camera),
            tint: rgba.xyz(),
            directional,
            point,
            diffuse: diffuse.filter(|_| has_texture),
            normal_map: normal_map.filter(|_| has_normal_map),
        };
        (shader, reader.missing)
    }

    fn surface_normal(&self, varying: &PhongVarying) -> Vector3<f32> {
        let n = varying.normal.try_normalize(1e-8).unwrap_or_else(Vector3::y);
        let Some(map) = self.normal_map else {
            return n;
        };
        let (Some(t), Some(b)) = (
            varying.tangent.try_normalize(1e-8),
            varying.bitangent.try_normalize(1e-8),
        ) else {
            return n;
        };

        let sample = sample_nearest(map, varying.uv).xyz() * 2.0 - Vector3::repeat(1.0);
        (t * sample.x + b * sample.y + n * sample.z)
            .try_normalize(1e-8)
            .unwrap_or(n)
    }
}

fn reflect(incident: Vector3<f32>, normal: Vector3<f32>) -> Vector3<f32> {
    incident - normal * (2.0 * normal.dot(&incident))
}

fn phong_term(
    terms: &LightTerms,
    to_light: Vector3<f32>,
    normal: Vector3<f32>,
    to_eye: Vector3<f32>,
) -> Vector3<f32> {
    let ambient = terms.ambient_color * terms.ambient_str;
    let diffuse = terms.light_color * normal.dot(&to_light).max(0.0);
    let spec = reflect(-to_light, normal)
        .dot(&to_eye)
        .max(0.0)
        .powf(terms.spec_phong);
    let specular = terms.light_color * (spec * terms.spec_str);
    ambient + diffuse + specular
}

/// Nearest-texel lookup with repeat wrapping. `uv` (0, 0) is the bottom-left texel.
pub fn sample_nearest(image: &ImageData, uv: Vector2<f32>) -> Vector4<f32> {
    if image.width == 0 || image.height == 0 {
        return Vector4::repeat(1.0);
    }
    let u = uv.x.rem_euclid(1.0);
    let v = uv.y.rem_euclid(1.0);
    let x = ((u * image.width as f32) as u32).min(image.width - 1);
    let y = ((v * image.height as f32) as u32).min(image.height - 1);
    rgba_from_bytes(image.texel(x, y))
}

impl Shader for PhongShader<'_> {
    type Varying = PhongVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, PhongVarying) {
        let local = vertex.position.to_homogeneous();
        let world = self.model * local;

        let varying = PhongVarying {
            world_pos: world.xyz(),
            normal: self.normal_matrix * vertex.normal,
            uv: vertex.texcoord,
            tangent: self.model.fixed_view::<3, 3>(0, 0) * vertex.tangent,
            bitangent: self.model.fixed_view::<3, 3>(0, 0) * vertex.bitangent,
        };
        (self.mvp * local, varying)
    }

    fn fragment(&self, varying: PhongVarying) -> Vector3<f32> {
        let base = match self.diffuse {
            Some(texture) => sample_nearest(texture, varying.uv)
                .xyz()
                .component_mul(&self.tint),
            None => self.tint,
        };

        let normal = self.surface_normal(&varying);
        let to_eye = (self.camera_pos.coords - varying.world_pos)
            .try_normalize(1e-8)
            .unwrap_or_else(Vector3::z);

        let mut light = Vector3::zeros();
        if let Some((terms, direction)) = &self.directional {
            let to_light = (-*direction).try_normalize(1e-8).unwrap_or_else(Vector3::y);
            light += phong_term(terms, to_light, normal, to_eye);
        }
        if let Some(point) = &self.point {
            let offset = point.position - varying.world_pos;
            let distance = offset.norm();
            let to_light = offset.try_normalize(1e-8).unwrap_or(normal);
            light += phong_term(&point.terms, to_light, normal, to_eye)
                * point.attenuation(distance);
        }

        base.component_mul(&light)
            .map(|c| c.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms(entries: &[(&str, UniformValue)]) -> HashMap<String, UniformValue> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn lit_varying(normal: Vector3<f32>) -> PhongVarying {
        PhongVarying {
            world_pos: Vector3::zeros(),
            normal,
            uv: Vector2::zeros(),
            tangent: Vector3::zeros(),
            bitangent: Vector3::zeros(),
        }
    }

    #[test]
    fn directional_light_facing_surface_is_brighter() {
        let table = uniforms(&[
            ("cameraPos", UniformValue::Vec3(Vector3::new(0.0, 0.0, 5.0))),
            ("dirLight.lightColor", UniformValue::Vec3(Vector3::repeat(1.0))),
            ("dirLight.ambientStr", UniformValue::Float(0.1)),
            ("dirLight.specStr", UniformValue::Float(0.0)),
            ("dirLight.specPhong", UniformValue::Float(16.0)),
            ("dirLight.ambientColor", UniformValue::Vec3(Vector3::repeat(1.0))),
            ("dirLight.direction", UniformValue::Vec3(Vector3::new(0.0, 0.0, -1.0))),
        ]);
        let (shader, _) = PhongShader::from_uniforms(&table, None, None);

        let facing = shader.fragment(lit_varying(Vector3::z()));
        let away = shader.fragment(lit_varying(-Vector3::z()));
        assert!((facing.x - 1.0).abs() < 1e-5);
        assert!((away.x - 0.1).abs() < 1e-5);
    }

    #[test]
    fn missing_uniforms_are_reported() {
        let (shader, missing) = PhongShader::from_uniforms(&HashMap::new(), None, None);
        assert!(shader.directional.is_none() && shader.point.is_none());
        assert!(missing.iter().any(|n| n == "transform"));
        assert!(missing.iter().any(|n| n == "rgba"));
    }

    #[test]
    fn point_light_attenuation() {
        let point = PointTerms {
            terms: LightTerms {
                ambient_str: 0.0,
                spec_str: 0.0,
                spec_phong: 1.0,
                light_color: Vector3::repeat(1.0),
                ambient_color: Vector3::zeros(),
            },
            position: Vector3::zeros(),
            constant: 1.0,
            linear: 0.07,
            quadratic: 0.017,
        };
        assert_eq!(point.attenuation(0.0), 1.0);
        let at_ten = 1.0 / (1.0 + 0.7 + 1.7);
        assert!((point.attenuation(10.0) - at_ten).abs() < 1e-6);
    }

    #[test]
    fn sampling_wraps_and_starts_bottom_left() {
        let image = ImageData {
            width: 2,
            height: 1,
            channels: 3,
            pixels: vec![255, 0, 0, 0, 0, 255],
        };
        assert_eq!(sample_nearest(&image, Vector2::new(0.25, 0.5)).x, 1.0);
        assert_eq!(sample_nearest(&image, Vector2::new(0.75, 0.5)).z, 1.0);
        assert_eq!(sample_nearest(&image, Vector2::new(1.25, 0.5)).x, 1.0);
        assert_eq!(sample_nearest(&image, Vector2::new(-0.25, 0.5)).z, 1.0);
    }

    #[test]
    fn flat_normal_map_keeps_geometric_normal() {
        let flat = ImageData {
            width: 1,
            height: 1,
            channels: 3,
            pixels: vec![128, 128, 255],
        };
        let table = uniforms(&[("hasNormalMap", UniformValue::Int(1))]);
        let (shader, _) = PhongShader::from_uniforms(&table, None, Some(&flat));

        let varying = PhongVarying {
            tangent: Vector3::x(),
            bitangent: Vector3::y(),
            ..lit_varying(Vector3::z())
        };
        let n = shader.surface_normal(&varying);
        assert!((n - Vector3::z()).norm() < 0.01);
    }
}
