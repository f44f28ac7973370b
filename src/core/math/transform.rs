use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the transformation matrices used by models and cameras.
/// Right-handed, column-vector convention, OpenGL clip space (z in [-w, w]).
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Rotation around an arbitrary axis (Rodrigues' formula).
    pub fn rotation(axis: &Vector3<f32>, angle_rad: f32) -> Matrix4<f32> {
        let axis_unit = axis.normalize();
        let x = axis_unit.x;
        let y = axis_unit.y;
        let z = axis_unit.z;
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        let t = 1.0 - c;

        Matrix4::new(
            t * x * x + c,     t * x * y - z * s, t * x * z + y * s, 0.0,
            t * x * y + z * s, t * y * y + c,     t * y * z - x * s, 0.0,
            t * x * z - y * s, t * y * z + x * s, t * z * z + c,     0.0,
            0.0,               0.0,               0.0,               1.0,
        )
    }

    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        let (s, c) = angle_rad.sin_cos();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,  -s,   0.0,
            0.0, s,   c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        let (s, c) = angle_rad.sin_cos();
        Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
           -s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        let (s, c) = angle_rad.sin_cos();
        Matrix4::new(
            c,  -s,   0.0, 0.0,
            s,   c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// X, then Y, then Z Euler rotation in degrees, composed as Rx * Ry * Rz.
    pub fn rotation_euler_deg(rotation: &Vector3<f32>) -> Matrix4<f32> {
        Self::rotation_x(rotation.x.to_radians())
            * Self::rotation_y(rotation.y.to_radians())
            * Self::rotation_z(rotation.z.to_radians())
    }

    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Look-at view matrix. The camera looks down its local -Z.
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        let z_axis = (eye - target).normalize();
        let x_axis = up.cross(&z_axis).normalize();
        let y_axis = z_axis.cross(&x_axis);

        let rotation = Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, 0.0,
            y_axis.x, y_axis.y, y_axis.z, 0.0,
            z_axis.x, z_axis.y, z_axis.z, 0.0,
            0.0,      0.0,      0.0,      1.0,
        );

        rotation * Self::translation(&-eye.coords)
    }

    /// Perspective projection mapping the frustum to NDC [-1, 1].
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        let f = 1.0 / (fov_y_rad / 2.0).tan();
        let nf = 1.0 / (near - far);

        Matrix4::new(
            f / aspect_ratio, 0.0, 0.0,               0.0,
            0.0,              f,   0.0,               0.0,
            0.0,              0.0, (far + near) * nf, 2.0 * far * near * nf,
            0.0,              0.0, -1.0,              0.0,
        )
    }

    /// Orthographic projection. Bounds may be inverted (e.g. bottom > top) to flip an axis.
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let nf = 1.0 / (near - far);

        Matrix4::new(
            2.0 * rl, 0.0,      0.0,      -(right + left) * rl,
            0.0,      2.0 * tb, 0.0,      -(top + bottom) * tb,
            0.0,      0.0,      2.0 * nf, (far + near) * nf,
            0.0,      0.0,      0.0,      1.0,
        )
    }
}

//=================================
// Direction Helpers
//=================================

/// Unit view direction for a yaw/pitch pair in degrees.
///
/// Yaw 0 / pitch 0 looks down +Z; positive pitch looks up.
pub fn direction_from_yaw_pitch(yaw_deg: f32, pitch_deg: f32) -> Vector3<f32> {
    let (sy, cy) = yaw_deg.to_radians().sin_cos();
    let (sp, cp) = pitch_deg.to_radians().sin_cos();
    Vector3::new(cp * sy, sp, cp * cy).normalize()
}

/// Horizontal right vector for a yaw in degrees: (sin(yaw - 90), 0, cos(yaw - 90)).
pub fn right_from_yaw(yaw_deg: f32) -> Vector3<f32> {
    let (s, c) = (yaw_deg - 90.0).to_radians().sin_cos();
    Vector3::new(s, 0.0, c)
}

/// Direction a model with Euler Y rotation `yaw_deg` walks toward on the XZ plane.
pub fn facing_xz(yaw_deg: f32) -> Vector3<f32> {
    let (s, c) = yaw_deg.to_radians().sin_cos();
    Vector3::new(-s, 0.0, -c)
}

//=================================
// Clip Space -> Screen
//=================================

#[inline]
pub fn apply_perspective_division(clip: &Vector4<f32>) -> Point3<f32> {
    let w = clip.w;
    if w.abs() > 1e-6 {
        Point3::new(clip.x / w, clip.y / w, clip.z / w)
    } else {
        Point3::origin()
    }
}

/// Viewport transform. NDC +Y is up, screen +Y is down.
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new(
        (ndc_x + 1.0) * 0.5 * width,
        (1.0 - (ndc_y + 1.0) * 0.5) * height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn direction_at_zero_rotation_is_positive_z() {
        let dir = direction_from_yaw_pitch(0.0, 0.0);
        assert!(close(dir.x, 0.0) && close(dir.y, 0.0) && close(dir.z, 1.0));
    }

    #[test]
    fn direction_pitch_90_points_up() {
        let dir = direction_from_yaw_pitch(37.0, 90.0);
        assert!(close(dir.y, 1.0));
    }

    #[test]
    fn right_vector_is_perpendicular_to_direction() {
        for yaw in [0.0_f32, 45.0, 90.0, 200.0, -30.0] {
            let dir = direction_from_yaw_pitch(yaw, 20.0);
            let right = right_from_yaw(yaw);
            assert!(close(dir.dot(&right), 0.0), "yaw {yaw}");
            assert!(close(right.norm(), 1.0));
        }
    }

    #[test]
    fn facing_is_opposite_of_view_direction_turned_half() {
        for yaw in [0.0_f32, 30.0, 135.0, -90.0] {
            let facing = facing_xz(yaw);
            let look = direction_from_yaw_pitch(yaw + 180.0, 0.0);
            assert!((facing - look).norm() < 1e-4, "yaw {yaw}");
        }
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let eye = Point3::new(1.0, 2.0, 3.0);
        let view = TransformFactory::view(&eye, &Point3::new(1.0, 2.0, 4.0), &Vector3::y());
        let p = view * eye.to_homogeneous();
        assert!(close(p.x, 0.0) && close(p.y, 0.0) && close(p.z, 0.0));

        // A point straight ahead lands on -Z in view space.
        let ahead = view * Point3::new(1.0, 2.0, 5.0).to_homogeneous();
        assert!(close(ahead.z, -2.0));
    }

    #[test]
    fn euler_order_is_x_then_y_then_z() {
        let rot = Vector3::new(30.0, 45.0, 60.0);
        let expected = TransformFactory::rotation_x(30f32.to_radians())
            * TransformFactory::rotation_y(45f32.to_radians())
            * TransformFactory::rotation_z(60f32.to_radians());
        let actual = TransformFactory::rotation_euler_deg(&rot);
        assert!((expected - actual).norm() < EPS);

        let reversed = TransformFactory::rotation_z(60f32.to_radians())
            * TransformFactory::rotation_y(45f32.to_radians())
            * TransformFactory::rotation_x(30f32.to_radians());
        assert!((reversed - actual).norm() > 0.1);
    }

    #[test]
    fn rodrigues_matches_axis_rotation() {
        let a = TransformFactory::rotation(&Vector3::y(), 0.7);
        let b = TransformFactory::rotation_y(0.7);
        assert!((a - b).norm() < EPS);
    }

    #[test]
    fn orthographic_maps_bounds_to_unit_cube() {
        let m = TransformFactory::orthographic(-2.0, 2.0, -1.0, 1.0, 0.5, 10.0);
        let corner = m * Vector4::new(2.0, 1.0, -10.0, 1.0);
        assert!(close(corner.x, 1.0) && close(corner.y, 1.0) && close(corner.z, 1.0));
        let near = m * Vector4::new(-2.0, -1.0, -0.5, 1.0);
        assert!(close(near.x, -1.0) && close(near.y, -1.0) && close(near.z, -1.0));
    }
}
