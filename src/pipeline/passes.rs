use crate::error::GpuError;
use crate::pipeline::device::{GpuDevice, ProgramId};
use crate::scene::context::SceneContext;
use nalgebra::Vector3;

/// Uploads the active camera's `projection`, `view` and `cameraPos`.
pub fn apply_camera(device: &dyn GpuDevice, program: ProgramId, scene: &SceneContext) {
    let camera = scene.active_camera();
    device.set_mat4(program, "projection", camera.projection_matrix());
    device.set_mat4(program, "view", camera.view_matrix());
    device.set_vec3(program, "cameraPos", camera.position.coords);
}

/// Uploads both lights' shared and variant-specific uniforms.
pub fn apply_lights(device: &dyn GpuDevice, program: ProgramId, scene: &SceneContext) {
    for light in [&scene.directional, &scene.point] {
        light.apply_uniforms(device, program);
        light.apply_extra_uniforms(device, program);
    }
}

/// Draws one frame: clear, lights, camera, then every model once.
pub fn render_frame(
    device: &dyn GpuDevice,
    program: ProgramId,
    scene: &SceneContext,
    background: Vector3<f32>,
) -> Result<(), GpuError> {
    device.clear(background);

    apply_lights(device, program, scene);
    apply_camera(device, program, scene);

    scene.player.model.draw(program)?;
    if let Some(marker) = &scene.light_marker {
        marker.draw(program)?;
    }
    for model in &scene.models {
        model.draw(program)?;
    }
    Ok(())
}
