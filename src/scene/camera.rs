use crate::core::math::transform::{
    TransformFactory, direction_from_yaw_pitch, facing_xz, right_from_yaw,
};
use nalgebra::{Matrix4, Point3, Vector2, Vector3};

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 300.0;

/// Fixed world-space bounds of the orthographic (top-down) view.
/// Bottom/top are inverted, which flips the vertical axis.
pub const ORTHO_LEFT: f32 = -150.0;
pub const ORTHO_RIGHT: f32 = 150.0;
pub const ORTHO_BOTTOM: f32 = 150.0;
pub const ORTHO_TOP: f32 = -150.0;
pub const ORTHO_NEAR: f32 = -200.0;
pub const ORTHO_FAR: f32 = 200.0;

/// Height of the third-person orbit target above the player.
pub const ORBIT_TARGET_HEIGHT: f32 = 3.0;
pub const EYE_HEIGHT: f32 = 1.5;
pub const EYE_FORWARD_OFFSET: f32 = 1.0;
pub const MAX_PITCH: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective { fov_deg: f32, width: f32, height: f32 },
    Orthographic,
}

/// A yaw/pitch camera. View and projection are rebuilt on every call.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Euler angles in degrees: x = yaw, y = pitch.
    pub rotation: Vector2<f32>,
    pub projection: Projection,
}

impl Camera {
    pub fn perspective(fov_deg: f32, width: f32, height: f32) -> Self {
        Self {
            position: Point3::origin(),
            rotation: Vector2::zeros(),
            projection: Projection::Perspective {
                fov_deg,
                width,
                height,
            },
        }
    }

    pub fn orthographic() -> Self {
        Self {
            position: Point3::origin(),
            rotation: Vector2::zeros(),
            projection: Projection::Orthographic,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.rotation.x
    }

    pub fn pitch(&self) -> f32 {
        self.rotation.y
    }

    pub fn direction(&self) -> Vector3<f32> {
        direction_from_yaw_pitch(self.yaw(), self.pitch())
    }

    pub fn right(&self) -> Vector3<f32> {
        right_from_yaw(self.yaw())
    }

    pub fn up(&self) -> Vector3<f32> {
        self.right().cross(&self.direction()).normalize()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let target = self.position + self.direction();
        TransformFactory::view(&self.position, &target, &self.up())
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.projection {
            // The aspect argument is height / width, as the scene always passed it.
            Projection::Perspective {
                fov_deg,
                width,
                height,
            } => TransformFactory::perspective(
                height / width,
                fov_deg.to_radians(),
                NEAR_PLANE,
                FAR_PLANE,
            ),
            Projection::Orthographic => TransformFactory::orthographic(
                ORTHO_LEFT,
                ORTHO_RIGHT,
                ORTHO_BOTTOM,
                ORTHO_TOP,
                ORTHO_NEAR,
                ORTHO_FAR,
            ),
        }
    }

    /// Adds to yaw and pitch (degrees), clamping pitch to straight up/down.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.rotation.x += delta_yaw;
        self.rotation.y = (self.rotation.y + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Orbits `radius` units behind a point above `player`, never below `floor`.
    pub fn third_person(&mut self, player: &Point3<f32>, radius: f32, floor: f32) {
        let target = player + Vector3::new(0.0, ORBIT_TARGET_HEIGHT, 0.0);
        let mut position = target - self.direction() * radius;
        position.y = position.y.max(floor);
        self.position = position;
    }

    /// Looks out of the player's eyes along its facing direction.
    ///
    /// Only yaw is overridden; pitch keeps whatever the cursor set.
    pub fn first_person(&mut self, player: &Point3<f32>, player_yaw: f32) {
        self.rotation.x = player_yaw + 180.0;
        self.rotation.y = self.rotation.y.clamp(-MAX_PITCH, MAX_PITCH);
        self.position = player
            + Vector3::new(0.0, EYE_HEIGHT, 0.0)
            + facing_xz(player_yaw) * EYE_FORWARD_OFFSET;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn third_person_sits_behind_and_above() {
        let mut cam = Camera::perspective(60.0, 800.0, 800.0);
        cam.third_person(&Point3::origin(), 10.0, 0.5);
        assert!((cam.position - Point3::new(0.0, 3.0, -10.0)).norm() < EPS);
    }

    #[test]
    fn third_person_respects_floor() {
        let mut cam = Camera::perspective(60.0, 800.0, 800.0);
        cam.rotate(0.0, 60.0);
        cam.third_person(&Point3::origin(), 10.0, 0.5);
        assert!(cam.position.y >= 0.5 - EPS);
        assert!((cam.position.y - 0.5).abs() < EPS);
    }

    #[test]
    fn square_perspective_is_symmetric() {
        let cam = Camera::perspective(60.0, 600.0, 600.0);
        let proj = cam.projection_matrix();
        let f = 1.0 / (30.0f32.to_radians()).tan();
        assert!((proj[(0, 0)] - f).abs() < EPS);
        assert!((proj[(1, 1)] - f).abs() < EPS);
        assert_eq!(proj[(3, 2)], -1.0);
    }

    #[test]
    fn orthographic_uses_fixed_bounds() {
        let proj = Camera::orthographic().projection_matrix();
        assert!((proj[(0, 0)] - 2.0 / 300.0).abs() < EPS);
        assert!((proj[(1, 1)] + 2.0 / 300.0).abs() < EPS);
        assert!((proj[(2, 2)] + 2.0 / 400.0).abs() < EPS);
    }

    #[test]
    fn view_places_target_in_front() {
        let mut cam = Camera::perspective(60.0, 800.0, 600.0);
        cam.position = Point3::new(1.0, 2.0, 3.0);
        cam.rotation = Vector2::new(30.0, -10.0);
        let ahead = cam.position + cam.direction() * 5.0;
        let in_view = cam.view_matrix().transform_point(&ahead);
        assert!(in_view.x.abs() < EPS && in_view.y.abs() < EPS);
        assert!((in_view.z + 5.0).abs() < EPS);
    }

    #[test]
    fn up_is_orthonormal() {
        let mut cam = Camera::perspective(60.0, 800.0, 600.0);
        cam.rotation = Vector2::new(45.0, 20.0);
        let up = cam.up();
        assert!((up.norm() - 1.0).abs() < EPS);
        assert!(up.dot(&cam.direction()).abs() < EPS);
        assert!(up.y > 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::perspective(60.0, 800.0, 600.0);
        cam.rotate(0.0, 200.0);
        assert_eq!(cam.pitch(), 90.0);
        cam.rotate(0.0, -500.0);
        assert_eq!(cam.pitch(), -90.0);
    }

    #[test]
    fn first_person_looks_where_player_walks() {
        let mut cam = Camera::perspective(60.0, 800.0, 600.0);
        let player = Point3::new(2.0, 0.0, 2.0);
        cam.first_person(&player, 30.0);
        assert!((cam.direction() - facing_xz(30.0)).norm() < EPS);
        let expected = player + Vector3::new(0.0, 1.5, 0.0) + facing_xz(30.0);
        assert!((cam.position - expected).norm() < EPS);
    }
}
