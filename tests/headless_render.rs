use obj_scene::app::{frame_path, run, RunOptions};
use obj_scene::io::config::Config;
use obj_scene::ui::input::parse_script;
use std::path::PathBuf;

const QUAD_OBJ: &str = "\
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("obj_scene_render_{}_{}", std::process::id(), name))
}

fn config_for(mesh: &PathBuf) -> Config {
    let toml = format!(
        r#"
        [render]
        width = 64
        height = 64
        background = [0.0, 0.0, 0.0]

        [player]
        mesh = "{}"
        "#,
        mesh.to_string_lossy().replace('\\', "/")
    );
    Config::parse(&toml).unwrap()
}

fn options(name: &str, frames: usize, script: &str) -> RunOptions {
    let mesh = temp_path(&format!("{name}.obj"));
    std::fs::write(&mesh, QUAD_OBJ).unwrap();
    RunOptions {
        config: config_for(&mesh),
        output: temp_path(&format!("{name}.png")),
        frames,
        script: parse_script(script).unwrap(),
        dry_run: false,
    }
}

#[test]
fn renders_lit_player_into_png() {
    let options = options("single", 1, "");
    let output = options.output.clone();
    run(options).unwrap();

    let image = image::open(&output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (64, 64));
    let lit = image.pixels().filter(|p| p[0] > 128).count();
    assert!(lit > 10, "only {lit} lit pixels");
    // The camera looks over the player, so the top corner stays background.
    assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);

    let _ = std::fs::remove_file(output);
}

#[test]
fn multiple_frames_get_numbered_files() {
    let options = options("multi", 3, "w,2");
    let base = options.output.clone();
    run(options).unwrap();

    for index in 0..3 {
        let path = frame_path(&base, index, 3);
        assert!(path.exists(), "{path:?} was not written");
        let _ = std::fs::remove_file(path);
    }
    assert!(!base.exists());
}

#[test]
fn dry_run_writes_nothing() {
    let mut options = options("dry", 2, "space,w");
    options.dry_run = true;
    let output = options.output.clone();
    run(options).unwrap();
    assert!(!output.exists());
    assert!(!frame_path(&output, 0, 2).exists());
}

#[test]
fn missing_player_mesh_fails() {
    let mut options = options("nomesh", 1, "");
    options.config.player.mesh = "no/such/player.obj".to_string();
    assert!(run(options).is_err());
}
