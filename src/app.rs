use crate::core::rasterizer::CullMode;
use crate::error::AppError;
use crate::io::config::Config;
use crate::pipeline::device::GpuDevice;
use crate::pipeline::passes::render_frame;
use crate::pipeline::recording::RecordingDevice;
use crate::pipeline::software::{PHONG_PROGRAM, SoftwareDevice};
use crate::scene::loader::load_scene;
use crate::ui::input::{InputController, InputEvent};
use log::{debug, info};
use nalgebra::Vector3;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

/// Everything a headless run needs, already parsed.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: Config,
    pub output: PathBuf,
    pub frames: usize,
    pub script: Vec<InputEvent>,
    /// Record device calls instead of rasterizing.
    pub dry_run: bool,
}

/// Output path of frame `index`; a single frame keeps the path as given.
pub fn frame_path(output: &Path, index: usize, frames: usize) -> PathBuf {
    if frames <= 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    output.with_file_name(format!("{stem}_{index:03}.{ext}"))
}

fn cull_mode(name: &str) -> CullMode {
    match name {
        "back" => CullMode::Back,
        "front" => CullMode::Front,
        _ => CullMode::None,
    }
}

/// Loads the scene, then per frame applies the next scripted event, updates
/// the scene and draws it. `present` is called after every frame.
fn simulate<F>(
    device: &Rc<dyn GpuDevice>,
    options: &RunOptions,
    mut present: F,
) -> Result<(), AppError>
where
    F: FnMut(usize) -> Result<(), AppError>,
{
    let program = device.create_program(PHONG_PROGRAM)?;
    let mut scene = load_scene(device, &options.config)?;
    let controller = InputController::new();
    let background = Vector3::from(options.config.render.background);

    let mut events = options.script.iter();
    for frame in 0..options.frames {
        if let Some(event) = events.next() {
            debug!("Frame {}: {:?}", frame, event);
            controller.handle(*event, &mut scene);
        }
        scene.update_frame();
        render_frame(device.as_ref(), program, &scene, background)?;
        present(frame)?;
    }

    let leftover = events.count();
    if leftover > 0 {
        info!("{} scripted events were not reached", leftover);
    }
    Ok(())
}

/// Runs the scene headless and writes one image per frame.
pub fn run(options: RunOptions) -> Result<(), AppError> {
    let render = &options.config.render;
    let start_time = Instant::now();

    if options.dry_run {
        let recorder = Rc::new(RecordingDevice::new());
        let device: Rc<dyn GpuDevice> = recorder.clone();
        simulate(&device, &options, |_| Ok(()))?;
        info!(
            "Dry run: {} frames, {} draw calls, {} device calls",
            options.frames,
            recorder.draws().len(),
            recorder.calls().len()
        );
        return Ok(());
    }

    let software = Rc::new(SoftwareDevice::new(render.width, render.height));
    let (width, height) = software.size();
    info!("Rendering {} frame(s) at {}x{}", options.frames, width, height);
    software.set_cull_mode(cull_mode(&render.cull_mode));
    let device: Rc<dyn GpuDevice> = software.clone();

    simulate(&device, &options, |frame| {
        let path = frame_path(&options.output, frame, options.frames);
        software
            .save_png(&path)
            .map_err(|source| AppError::Output {
                path: path.clone(),
                source,
            })?;
        info!("Saved {:?}", path);
        Ok(())
    })?;

    info!("Done in {:.2?}", start_time.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame_keeps_output_path() {
        assert_eq!(frame_path(Path::new("out/shot.png"), 0, 1), PathBuf::from("out/shot.png"));
    }

    #[test]
    fn numbered_frames() {
        assert_eq!(
            frame_path(Path::new("out/shot.png"), 7, 10),
            PathBuf::from("out/shot_007.png")
        );
        assert_eq!(frame_path(Path::new("shot"), 1, 2), PathBuf::from("shot_001.png"));
    }

    #[test]
    fn cull_names() {
        assert_eq!(cull_mode("back"), CullMode::Back);
        assert_eq!(cull_mode("none"), CullMode::None);
    }
}
