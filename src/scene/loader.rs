use crate::error::AssetLoadError;
use crate::io::config::{Config, LightConfig, ObjectConfig};
use crate::pipeline::device::GpuDevice;
use crate::pipeline::shaders::phong::{DIRECTIONAL_LIGHT, POINT_LIGHT};
use crate::scene::camera::Camera;
use crate::scene::context::{SceneContext, ViewMode};
use crate::scene::light::{Light, LightKind};
use crate::scene::model::{ModelDesc, RenderableModel};
use crate::scene::player::Player;
use log::{info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use std::path::PathBuf;
use std::rc::Rc;

impl From<&ObjectConfig> for ModelDesc {
    fn from(object: &ObjectConfig) -> Self {
        Self {
            mesh: PathBuf::from(&object.mesh),
            texture: object.texture.as_ref().map(PathBuf::from),
            normal_map: object.normal_map.as_ref().map(PathBuf::from),
            position: Vector3::from(object.position),
            rotation: Vector3::from(object.rotation),
            scale: Vector3::from(object.scale),
            color: Vector3::from(object.color),
        }
    }
}

fn light_from_config(name: &str, config: &LightConfig, kind: LightKind) -> Light {
    Light {
        name: name.to_string(),
        ambient_str: config.ambient_str,
        spec_str: config.spec_str,
        spec_phong: config.spec_phong,
        light_color: Vector3::from(config.light_color),
        ambient_color: Vector3::from(config.ambient_color),
        kind,
    }
}

pub fn build_lights(config: &Config) -> (Light, Light) {
    let dir = &config.directional_light;
    let directional = light_from_config(
        DIRECTIONAL_LIGHT,
        dir,
        LightKind::Directional {
            direction: Vector3::from(dir.direction),
        },
    );

    let point = &config.point_light;
    let [constant, linear, quadratic] = point.attenuation;
    let point = light_from_config(
        POINT_LIGHT,
        point,
        LightKind::Point {
            position: Point3::from(point.position),
            constant,
            linear,
            quadratic,
        },
    );
    (directional, point)
}

pub fn build_cameras(config: &Config) -> (Camera, Camera) {
    let render = &config.render;
    let mut perspective =
        Camera::perspective(config.camera.fov, render.width as f32, render.height as f32);
    perspective.rotation = Vector2::from(config.camera.rotation);

    let mut orthographic = Camera::orthographic();
    orthographic.position = Point3::from(config.camera.top_down_position);
    // Straight down.
    orthographic.rotation = Vector2::new(0.0, -90.0);

    (perspective, orthographic)
}

/// Uploads every model the config names and assembles the scene.
///
/// The player mesh is required; any other object that fails to load is
/// skipped with a warning.
pub fn load_scene(
    device: &Rc<dyn GpuDevice>,
    config: &Config,
) -> Result<SceneContext, AssetLoadError> {
    let player_model = RenderableModel::create(device, &ModelDesc::from(&config.player))?;
    let (perspective, orthographic) = build_cameras(config);
    let (directional, point) = build_lights(config);

    let mut scene = SceneContext::new(
        Player::new(player_model),
        perspective,
        orthographic,
        directional,
        point,
    );
    scene.orbit_radius = config.camera.orbit_radius;
    scene.floor = config.camera.floor;
    // Config validation already rejected unknown names.
    scene.view_mode = ViewMode::parse(&config.camera.view).unwrap_or(ViewMode::ThirdPerson);

    if let Some(marker) = &config.light_marker {
        match RenderableModel::create(device, &ModelDesc::from(marker)) {
            Ok(model) => scene.light_marker = Some(model),
            Err(e) => warn!("Skipping light marker: {}", e),
        }
    }

    for object in &config.objects {
        match RenderableModel::create(device, &ModelDesc::from(object)) {
            Ok(model) => scene.models.push(model),
            Err(e) => warn!("Skipping object {:?}: {}", object.mesh, e),
        }
    }

    info!(
        "Scene ready: player + {} objects, light marker: {}",
        scene.models.len(),
        scene.light_marker.is_some()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_take_config_values() {
        let config = Config::default();
        let (directional, point) = build_lights(&config);
        assert_eq!(directional.name, "dirLight");
        assert_eq!(directional.spec_str, 2.0);
        assert_eq!(
            directional.kind,
            LightKind::Directional {
                direction: Vector3::new(4.0, 11.0, -3.0)
            }
        );
        assert_eq!(point.name, "pointLight");
        assert_eq!(point.position(), Some(Point3::new(0.0, 2.0, -10.0)));
    }

    #[test]
    fn top_down_camera_looks_down() {
        let (perspective, ortho) = build_cameras(&Config::default());
        assert!(ortho.direction().y < -0.99);
        assert!(matches!(
            perspective.projection,
            crate::scene::camera::Projection::Perspective { fov_deg, .. } if fov_deg == 60.0
        ));
    }

    #[test]
    fn object_config_maps_to_desc() {
        let object = ObjectConfig {
            mesh: "a.obj".into(),
            texture: Some("a.png".into()),
            normal_map: None,
            position: [1.0, 2.0, 3.0],
            rotation: [0.0, 45.0, 0.0],
            scale: [2.0, 2.0, 2.0],
            color: [1.0, 0.5, 0.5],
        };
        let desc = ModelDesc::from(&object);
        assert_eq!(desc.mesh, PathBuf::from("a.obj"));
        assert_eq!(desc.texture, Some(PathBuf::from("a.png")));
        assert_eq!(desc.rotation.y, 45.0);
    }
}
