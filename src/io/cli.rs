use crate::app::RunOptions;
use crate::error::AppError;
use crate::io::config::Config;
use crate::ui::input::parse_script;
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Command line of the headless scene renderer.
#[derive(Parser, Debug)]
#[command(name = "obj-scene")]
#[command(about = "Renders a textured OBJ scene described by a TOML file")]
pub struct Cli {
    /// Scene config (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output image; overrides `render.output`
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<usize>,

    #[arg(long)]
    pub height: Option<usize>,

    /// Input script, e.g. "w,w,a,space,mouse:10:-4". One event per frame.
    #[arg(short, long, value_name = "SCRIPT", default_value = "")]
    pub keys: String,

    /// Frames to render; defaults to one per scripted event plus one
    #[arg(short, long)]
    pub frames: Option<usize>,

    /// Drive a recording device instead of rasterizing
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Loads the config, applies overrides and parses the input script.
    pub fn into_options(self) -> Result<RunOptions, AppError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => {
                info!("No config given, using defaults");
                Config::default()
            }
        };

        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
        config.validate()?;

        let script = parse_script(&self.keys)?;
        let frames = self.frames.unwrap_or(script.len() + 1).max(1);
        let output = self
            .output
            .unwrap_or_else(|| PathBuf::from(&config.render.output));

        Ok(RunOptions {
            config,
            output,
            frames,
            script,
            dry_run: self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn defaults_render_one_frame() {
        let options = Cli::try_parse_from(["obj-scene"]).unwrap().into_options().unwrap();
        assert_eq!(options.frames, 1);
        assert_eq!(options.output, PathBuf::from("frame.png"));
        assert!(options.script.is_empty());
        assert!(!options.dry_run);
    }

    #[test]
    fn script_sets_frame_count() {
        let cli = Cli::try_parse_from(["obj-scene", "--keys", "w,a,1", "-o", "shot.png"]).unwrap();
        let options = cli.into_options().unwrap();
        assert_eq!(options.script.len(), 3);
        assert_eq!(options.frames, 4);
        assert_eq!(options.output, PathBuf::from("shot.png"));
    }

    #[test]
    fn size_overrides_are_validated() {
        let cli = Cli::try_parse_from(["obj-scene", "--width", "0"]).unwrap();
        assert!(matches!(
            cli.into_options(),
            Err(AppError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn bad_script_is_rejected() {
        let cli = Cli::try_parse_from(["obj-scene", "--keys", "jump", "--dry-run"]).unwrap();
        assert!(matches!(cli.into_options(), Err(AppError::UnknownKey(_))));
    }
}
