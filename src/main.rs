use clap::Parser;
use log::error;
use obj_scene::app;
use obj_scene::io::cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let result = Cli::parse().into_options().and_then(app::run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
