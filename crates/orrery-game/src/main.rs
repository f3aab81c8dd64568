//! Orrery: an animated solar system with a scripted camera fly-through.
//!
//! Run with: `cargo run -p orrery-game -- --help`

use clap::Parser;
use orrery_app::PlatformDirs;
use orrery_config::{CliArgs, Config};
use tracing::{error, info, warn};

fn main() {
    let args = CliArgs::parse();

    let dirs = match &args.config {
        Some(dir) => PlatformDirs::with_config_dir(dir.clone()),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}");
                std::process::exit(1);
            }
        },
    };
    let dirs_ready = dirs.create_dirs();

    // Logging needs the config's level, so load problems are reported after init.
    let (mut config, load_error) = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    let log_dir = dirs_ready.is_ok().then_some(dirs.log_dir.as_path());
    orrery_log::init_logging(log_dir, cfg!(debug_assertions), Some(&config));

    if let Err(e) = dirs_ready {
        warn!(
            "Could not create {}: {e}; logging to the console only",
            dirs.config_dir.display()
        );
    }
    if let Some(e) = load_error {
        warn!("{e}; using default configuration");
    }

    info!("Orrery v{}", env!("CARGO_PKG_VERSION"));
    info!("Config directory: {}", dirs.config_dir.display());
    info!(
        "Window: {}x{}{} | speed {}x{}",
        config.window.width,
        config.window.height,
        if config.window.fullscreen { " fullscreen" } else { "" },
        config.simulation.initial_speed,
        if config.camera.skip_intro { " | intro skipped" } else { "" },
    );

    if let Err(e) = orrery_app::run(config, dirs) {
        error!("{e}");
        std::process::exit(1);
    }
}
