use crate::error::AppError;
use crate::scene::context::{ControlTarget, SceneContext, ViewMode};
use log::debug;
use std::str::FromStr;

/// Keys the scene reacts to. Windowing code maps its own key codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Num1,
    Num2,
    Num3,
    Space,
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
}

impl FromStr for Key {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.to_ascii_lowercase().as_str() {
            "1" => Key::Num1,
            "2" => Key::Num2,
            "3" => Key::Num3,
            "space" => Key::Space,
            "w" => Key::W,
            "a" => Key::A,
            "s" => Key::S,
            "d" => Key::D,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            _ => return Err(AppError::UnknownKey(s.to_string())),
        };
        Ok(key)
    }
}

/// One input event as delivered by a window or a script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: Key, pressed: bool },
    Cursor { dx: f32, dy: f32 },
}

/// Parses a comma separated script such as `w,w,a,space,mouse:10:-4`.
///
/// Each key name is a press; `mouse:dx:dy` is a cursor move.
pub fn parse_script(script: &str) -> Result<Vec<InputEvent>, AppError> {
    script
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            if let Some(rest) = token.strip_prefix("mouse:") {
                let (dx, dy) = rest
                    .split_once(':')
                    .ok_or_else(|| AppError::UnknownKey(token.to_string()))?;
                let parse = |v: &str| {
                    v.trim()
                        .parse::<f32>()
                        .map_err(|_| AppError::UnknownKey(token.to_string()))
                };
                Ok(InputEvent::Cursor {
                    dx: parse(dx)?,
                    dy: parse(dy)?,
                })
            } else {
                Ok(InputEvent::Key {
                    key: token.parse()?,
                    pressed: true,
                })
            }
        })
        .collect()
}

/// Applies input events to a [`SceneContext`].
#[derive(Debug, Clone)]
pub struct InputController {
    /// Degrees per A/D press.
    pub turn_step: f32,
    /// Strength change per arrow press.
    pub brightness_step: f32,
    /// Degrees per cursor pixel.
    pub sensitivity: f32,
}

impl Default for InputController {
    fn default() -> Self {
        Self {
            turn_step: 5.0,
            brightness_step: 0.1,
            sensitivity: 0.1,
        }
    }
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self, event: InputEvent, scene: &mut SceneContext) {
        match event {
            InputEvent::Key { key, pressed } => self.handle_key(key, pressed, scene),
            InputEvent::Cursor { dx, dy } => self.handle_cursor(dx, dy, scene),
        }
    }

    /// Reacts to presses and repeats; releases are ignored.
    pub fn handle_key(&self, key: Key, pressed: bool, scene: &mut SceneContext) {
        if !pressed {
            return;
        }
        debug!("Key {:?} ({:?})", key, scene.control);

        let steering_light = scene.control == ControlTarget::Light;
        match key {
            Key::Num1 => scene.set_view_mode(ViewMode::ThirdPerson),
            Key::Num2 => scene.set_view_mode(ViewMode::FirstPerson),
            Key::Num3 => scene.set_view_mode(ViewMode::TopDown),
            Key::Space => scene.toggle_control(),
            Key::W if steering_light => scene.lift_light(scene.player.speed),
            Key::S if steering_light => scene.lift_light(-scene.player.speed),
            Key::A if steering_light => scene.orbit_light(self.turn_step),
            Key::D if steering_light => scene.orbit_light(-self.turn_step),
            Key::W => scene.player.directional_move(true),
            Key::S => scene.player.directional_move(false),
            Key::A => scene.player.turn(self.turn_step),
            Key::D => scene.player.turn(-self.turn_step),
            Key::Up if steering_light => scene.point.adjust_brightness(self.brightness_step),
            Key::Down if steering_light => scene.point.adjust_brightness(-self.brightness_step),
            Key::Right if steering_light => {
                scene.directional.adjust_brightness(self.brightness_step)
            }
            Key::Left if steering_light => {
                scene.directional.adjust_brightness(-self.brightness_step)
            }
            // Brightness only changes while the light is steered.
            Key::Up | Key::Down | Key::Left | Key::Right => {}
        }
    }

    /// Turns the perspective camera; the top-down view has a fixed orientation.
    pub fn handle_cursor(&self, dx: f32, dy: f32, scene: &mut SceneContext) {
        if scene.view_mode == ViewMode::TopDown {
            return;
        }
        scene
            .perspective
            .rotate(-self.sensitivity * dx, -self.sensitivity * dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_cursor_moves() {
        let events = parse_script("W, space ,mouse:10:-4,3").unwrap();
        assert_eq!(
            events,
            vec![
                InputEvent::Key { key: Key::W, pressed: true },
                InputEvent::Key { key: Key::Space, pressed: true },
                InputEvent::Cursor { dx: 10.0, dy: -4.0 },
                InputEvent::Key { key: Key::Num3, pressed: true },
            ]
        );
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert!(matches!(parse_script("w,jump"), Err(AppError::UnknownKey(k)) if k == "jump"));
        assert!(parse_script("mouse:1").is_err());
        assert!(parse_script("mouse:a:b").is_err());
    }

    #[test]
    fn empty_script_is_no_events() {
        assert!(parse_script("").unwrap().is_empty());
    }
}
