use crate::error::ConfigError;
use crate::scene::context::ViewMode;
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scene description read from a TOML file. Every section is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default = "default_directional_light")]
    pub directional_light: LightConfig,
    #[serde(default = "default_point_light")]
    pub point_light: LightConfig,
    #[serde(default = "default_player")]
    pub player: ObjectConfig,
    #[serde(default)]
    pub light_marker: Option<ObjectConfig>,
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            directional_light: default_directional_light(),
            point_light: default_point_light(),
            player: default_player(),
            light_marker: None,
            objects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_background")]
    pub background: [f32; 3],
    #[serde(default = "default_cull_mode")]
    pub cull_mode: String, // "back", "front", "none"
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            output: default_output(),
            background: default_background(),
            cull_mode: default_cull_mode(),
        }
    }
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    800
}
fn default_output() -> String {
    "frame.png".to_string()
}
fn default_background() -> [f32; 3] {
    [0.05, 0.05, 0.08]
}
fn default_cull_mode() -> String {
    "none".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_fov")]
    pub fov: f32,
    /// "third_person", "first_person" or "top_down".
    #[serde(default = "default_view")]
    pub view: String,
    #[serde(default = "default_orbit_radius")]
    pub orbit_radius: f32,
    #[serde(default = "default_floor")]
    pub floor: f32,
    /// Initial yaw and pitch in degrees.
    #[serde(default)]
    pub rotation: [f32; 2],
    #[serde(default = "default_top_down_position")]
    pub top_down_position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            view: default_view(),
            orbit_radius: default_orbit_radius(),
            floor: default_floor(),
            rotation: [0.0, 0.0],
            top_down_position: default_top_down_position(),
        }
    }
}

fn default_fov() -> f32 {
    60.0
}
fn default_view() -> String {
    "third_person".to_string()
}
fn default_orbit_radius() -> f32 {
    10.0
}
fn default_floor() -> f32 {
    0.5
}
fn default_top_down_position() -> [f32; 3] {
    [0.0, 20.0, 0.0]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LightConfig {
    #[serde(default)]
    pub direction: [f32; 3],
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_strength")]
    pub ambient_str: f32,
    #[serde(default = "default_strength")]
    pub spec_str: f32,
    #[serde(default = "default_spec_phong")]
    pub spec_phong: f32,
    #[serde(default = "default_white")]
    pub light_color: [f32; 3],
    #[serde(default = "default_white")]
    pub ambient_color: [f32; 3],
    /// Constant, linear and quadratic falloff; point lights only.
    #[serde(default = "default_attenuation")]
    pub attenuation: [f32; 3],
}

fn default_strength() -> f32 {
    0.5
}
fn default_spec_phong() -> f32 {
    32.0
}
fn default_white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_attenuation() -> [f32; 3] {
    [1.0, 0.07, 0.017]
}

fn default_directional_light() -> LightConfig {
    LightConfig {
        direction: [4.0, 11.0, -3.0],
        position: [0.0, 0.0, 0.0],
        ambient_str: 1.0,
        spec_str: 2.0,
        spec_phong: 32.0,
        light_color: [0.0, 0.0, 1.0],
        ambient_color: [0.7, 0.7, 1.0],
        attenuation: default_attenuation(),
    }
}

fn default_point_light() -> LightConfig {
    LightConfig {
        direction: [0.0, 0.0, 0.0],
        position: [0.0, 2.0, -10.0],
        ambient_str: 0.5,
        spec_str: 0.7,
        spec_phong: 32.0,
        light_color: default_white(),
        ambient_color: default_white(),
        attenuation: default_attenuation(),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectConfig {
    pub mesh: String,
    pub texture: Option<String>,
    pub normal_map: Option<String>,

    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    #[serde(default = "default_white")]
    pub color: [f32; 3],
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_player() -> ObjectConfig {
    ObjectConfig {
        mesh: "assets/player.obj".to_string(),
        texture: Some("assets/checker.png".to_string()),
        normal_map: None,
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0],
        scale: default_scale(),
        color: default_white(),
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded scene config {:?}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.width == 0 || self.render.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "render size {}x{} must be non-zero",
                self.render.width, self.render.height
            )));
        }
        if !(1.0..180.0).contains(&self.camera.fov) {
            return Err(ConfigError::Invalid(format!(
                "camera fov {} must be within [1, 180)",
                self.camera.fov
            )));
        }
        if ViewMode::parse(&self.camera.view).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown camera view '{}'",
                self.camera.view
            )));
        }
        if !matches!(self.render.cull_mode.as_str(), "back" | "front" | "none") {
            return Err(ConfigError::Invalid(format!(
                "unknown cull mode '{}'",
                self.render.cull_mode
            )));
        }
        if self.camera.orbit_radius <= 0.0 {
            return Err(ConfigError::Invalid("camera orbit_radius must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.point_light.attenuation, [1.0, 0.07, 0.017]);
        assert_eq!(config.camera.orbit_radius, 10.0);
    }

    #[test]
    fn parses_sections() {
        let toml = r#"
            [render]
            width = 320
            height = 240

            [camera]
            view = "top_down"
            rotation = [10.0, -5.0]

            [player]
            mesh = "hero.obj"
            scale = [0.2, 0.2, 0.2]

            [light_marker]
            mesh = "bulb.obj"

            [[objects]]
            mesh = "rock.obj"
            texture = "rock.png"
            position = [1.0, 0.0, -3.0]
        "#;
        let config = Config::parse(toml).unwrap();
        assert_eq!((config.render.width, config.render.height), (320, 240));
        assert_eq!(config.camera.view, "top_down");
        assert_eq!(config.player.mesh, "hero.obj");
        assert_eq!(config.player.texture, None);
        assert_eq!(config.light_marker.map(|m| m.mesh), Some("bulb.obj".to_string()));
        assert_eq!(config.objects.len(), 1);
        assert_eq!(config.objects[0].color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn rejects_zero_size() {
        let err = Config::parse("[render]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_view() {
        let err = Config::parse("[camera]\nview = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("sideways")));
    }

    #[test]
    fn reports_bad_toml() {
        assert!(matches!(
            Config::parse("render = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        assert!(matches!(
            Config::load("no/such/scene.toml"),
            Err(ConfigError::Read { .. })
        ));
    }
}
