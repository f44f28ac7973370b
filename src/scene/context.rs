use crate::core::math::transform::TransformFactory;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::model::RenderableModel;
use crate::scene::player::Player;
use log::debug;
use nalgebra::{Point3, Vector3};

/// Tint of the point light and its marker while the light is being steered.
pub const CONTROL_TINT: [f32; 3] = [1.0, 0.72, 0.77];
pub const IDLE_TINT: [f32; 3] = [1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    ThirdPerson,
    FirstPerson,
    TopDown,
}

impl ViewMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "third_person" => Some(Self::ThirdPerson),
            "first_person" => Some(Self::FirstPerson),
            "top_down" => Some(Self::TopDown),
            _ => None,
        }
    }
}

/// What movement keys act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlTarget {
    Player,
    Light,
}

/// Everything the frame loop reads and mutates.
#[derive(Debug)]
pub struct SceneContext {
    pub models: Vec<RenderableModel>,
    pub player: Player,
    pub light_marker: Option<RenderableModel>,
    pub perspective: Camera,
    pub orthographic: Camera,
    pub directional: Light,
    pub point: Light,
    pub view_mode: ViewMode,
    pub control: ControlTarget,
    pub orbit_radius: f32,
    pub floor: f32,
}

impl SceneContext {
    pub fn new(
        player: Player,
        perspective: Camera,
        orthographic: Camera,
        directional: Light,
        point: Light,
    ) -> Self {
        Self {
            models: Vec::new(),
            player,
            light_marker: None,
            perspective,
            orthographic,
            directional,
            point,
            view_mode: ViewMode::ThirdPerson,
            control: ControlTarget::Player,
            orbit_radius: 10.0,
            floor: 0.5,
        }
    }

    pub fn active_camera(&self) -> &Camera {
        match self.view_mode {
            ViewMode::TopDown => &self.orthographic,
            ViewMode::ThirdPerson | ViewMode::FirstPerson => &self.perspective,
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            debug!("View mode {:?} -> {:?}", self.view_mode, mode);
            self.view_mode = mode;
        }
    }

    /// Switches between steering the player and the point light.
    pub fn toggle_control(&mut self) {
        let (next, tint) = match self.control {
            ControlTarget::Player => (ControlTarget::Light, CONTROL_TINT),
            ControlTarget::Light => (ControlTarget::Player, IDLE_TINT),
        };
        let tint = Vector3::from(tint);
        self.control = next;
        self.point.light_color = tint;
        self.point.ambient_color = tint;
        if let Some(marker) = &mut self.light_marker {
            marker.color = tint;
        }
        debug!("Now controlling {:?}", next);
    }

    /// Raises or lowers the point light.
    pub fn lift_light(&mut self, delta: f32) {
        if let Some(position) = self.point.position() {
            self.point
                .set_position(position + Vector3::new(0.0, delta, 0.0));
        }
    }

    /// Swings the point light around the player's vertical axis.
    pub fn orbit_light(&mut self, delta_deg: f32) {
        let Some(position) = self.point.position() else {
            return;
        };
        let pivot = self.player.position();
        let rotation = TransformFactory::rotation_y(delta_deg.to_radians());
        let offset = rotation.transform_vector(&(position - pivot));
        self.point.set_position(pivot + offset);
    }

    /// Re-derives the active camera and light placement from the player.
    pub fn update_frame(&mut self) {
        let player_pos = self.player.position();
        let player_yaw = self.player.yaw();

        match self.view_mode {
            ViewMode::ThirdPerson => {
                self.perspective
                    .third_person(&player_pos, self.orbit_radius, self.floor)
            }
            ViewMode::FirstPerson => self.perspective.first_person(&player_pos, player_yaw),
            ViewMode::TopDown => {}
        }

        if self.control == ControlTarget::Player {
            self.point.follow(&player_pos, player_yaw);
        }
        if let (Some(marker), Some(light_pos)) = (&mut self.light_marker, self.point.position()) {
            marker.position = light_pos.coords;
        }
    }

    pub fn light_position(&self) -> Option<Point3<f32>> {
        self.point.position()
    }
}
