use crate::core::math::transform::facing_xz;
use crate::scene::model::RenderableModel;
use nalgebra::{Point3, Vector3};

pub const DEFAULT_SPEED: f32 = 0.5;

/// A model that walks along the direction its Y rotation faces.
#[derive(Debug)]
pub struct Player {
    pub model: RenderableModel,
    pub speed: f32,
}

impl Player {
    pub fn new(model: RenderableModel) -> Self {
        Self {
            model,
            speed: DEFAULT_SPEED,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.model.rotation.y
    }

    pub fn position(&self) -> Point3<f32> {
        self.model.world_position()
    }

    pub fn facing(&self) -> Vector3<f32> {
        facing_xz(self.yaw())
    }

    /// Steps one `speed` forward, or backward when `forward` is false.
    pub fn directional_move(&mut self, forward: bool) {
        let step = if forward { self.speed } else { -self.speed };
        self.model.position += self.facing() * step;
    }

    pub fn turn(&mut self, delta_deg: f32) {
        self.model.rotation.y += delta_deg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::device::GpuDevice;
    use crate::pipeline::recording::RecordingDevice;
    use crate::scene::mesh::{MeshSource, VertexLayout};
    use crate::scene::mesh_builder::build;
    use std::rc::Rc;

    fn player() -> Player {
        let device: Rc<dyn GpuDevice> = Rc::new(RecordingDevice::new());
        let source = MeshSource::quad();
        let mesh = build(&source, VertexLayout::for_source(&source)).unwrap();
        Player::new(RenderableModel::from_mesh(&device, &mesh).unwrap())
    }

    #[test]
    fn forward_at_zero_yaw_is_negative_z() {
        let mut p = player();
        p.directional_move(true);
        assert!((p.position() - Point3::new(0.0, 0.0, -0.5)).norm() < 1e-6);
        p.directional_move(false);
        p.directional_move(false);
        assert!((p.position() - Point3::new(0.0, 0.0, 0.5)).norm() < 1e-6);
    }

    #[test]
    fn turning_changes_heading() {
        let mut p = player();
        p.turn(90.0);
        p.directional_move(true);
        assert!((p.position() - Point3::new(-0.5, 0.0, 0.0)).norm() < 1e-6);
        assert_eq!(p.model.position.y, 0.0);
    }
}
