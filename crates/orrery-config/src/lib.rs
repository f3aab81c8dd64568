//! Configuration system for the orrery.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Every section is `#[serde(default)]`, so an old or partial
//! `config.ron` still loads.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, CameraConfig, Config, DebugConfig, SimulationConfig, StageDurations,
    WindowConfig,
};
pub use error::ConfigError;
