use std::env;
use std::path::PathBuf;

use log::error;

use tiled_rasterizer::app;
use tiled_rasterizer::config::RenderConfig;
use tiled_rasterizer::error::RenderError;

fn flag_value(args: &[String], i: usize) -> Result<&String, RenderError> {
    return args
        .get(i + 1)
        .ok_or_else(|| RenderError::Config(format!("{} expects a value", args[i])));
}

fn parse_args(args: &[String]) -> Result<RenderConfig, RenderError> {
    // A config file comes first, the remaining flags override it.
    let mut config = RenderConfig::default();
    for i in 1..args.len() {
        if args[i] == "-c" {
            config = RenderConfig::load(&PathBuf::from(flag_value(args, i)?))?;
        }
    }

    for i in 1..args.len() {
        match args[i].as_str() {
            "-m" => { config.model_path = PathBuf::from(flag_value(args, i)?); }
            "-t" => { config.texture_path = PathBuf::from(flag_value(args, i)?); }
            "--single-threaded" => { config.multithreaded = false; }
            "--phong" => { config.pbr = false; }
            "--wireframe" => { config.wireframe = true; }
            "--fps" => { config.print_fps = true; }
            _ => ()
        }
    }
    return Ok(config);
}

#[show_image::main]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let result = parse_args(&args).and_then(app::run);
    if let Err(e) = &result {
        error!("{}", e);
    }
    result?;

    return Ok(());
}
