//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Simulation clock and input rates.
    pub simulation: SimulationConfig,
    /// Scripted camera and free-look settings.
    pub camera: CameraConfig,
    /// Where textures are loaded from.
    pub assets: AssetConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title prefix. The simulation status is appended at runtime.
    pub title: String,
}

/// Simulation clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Speed multiplier at startup and after a restart.
    pub initial_speed: f32,
    /// Factor applied by the speed-up and slow-down keys.
    pub speed_step: f32,
    /// Camera dolly rate in units per second per scroll notch.
    pub zoom_speed: f32,
    /// Start with the simulation paused.
    pub start_paused: bool,
    /// Optional lower bound on the speed multiplier. `None` is unbounded.
    pub min_speed: Option<f32>,
    /// Optional upper bound on the speed multiplier. `None` is unbounded.
    pub max_speed: Option<f32>,
}

/// Durations of each scripted camera stage, in simulated seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StageDurations {
    pub idle: f32,
    pub approach: f32,
    pub earth_orbit: f32,
    pub pull_back: f32,
    pub top_down: f32,
    pub return_home: f32,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera position at startup and the end of the fly-through.
    pub start_position: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Jump straight to free-look without the scripted fly-through.
    pub skip_intro: bool,
    /// Stage timings for the fly-through.
    pub durations: StageDurations,
    /// Radius of the camera's circle around Earth.
    pub earth_orbit_radius: f32,
    /// Angular speed of the camera around Earth, in radians per second.
    pub earth_orbit_speed: f32,
    /// Height of the overhead shot.
    pub top_view_height: f32,
    /// Free-look rotation in degrees per pixel of mouse drag.
    pub look_sensitivity: f32,
    /// Free-look translation speed in units per second.
    pub move_speed: f32,
}

/// Asset configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the planet, sun, background and ring images.
    pub directory: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Show the simulation status in the window title.
    pub status_in_title: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_speed: 5.0,
            speed_step: 1.2,
            zoom_speed: 10.0,
            start_paused: false,
            min_speed: None,
            max_speed: None,
        }
    }
}

impl Default for StageDurations {
    fn default() -> Self {
        Self {
            idle: 2.0,
            approach: 5.0,
            earth_orbit: 10.0,
            pull_back: 5.0,
            top_down: 5.0,
            return_home: 5.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [0.0, 0.0, -40.0],
            fov_y_degrees: 60.0,
            skip_intro: false,
            durations: StageDurations::default(),
            earth_orbit_radius: 2.0,
            earth_orbit_speed: 2.0,
            top_view_height: 50.0,
            look_sensitivity: 0.2,
            move_speed: 10.0,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            status_in_title: true,
        }
    }
}

impl SimulationConfig {
    /// Validated `(min, max)` speed bounds.
    pub fn speed_bounds(&self) -> Result<(Option<f32>, Option<f32>), ConfigError> {
        if let (Some(min), Some(max)) = (self.min_speed, self.max_speed)
            && min > max
        {
            return Err(ConfigError::InvalidSpeedBounds { min, max });
        }
        Ok((self.min_speed, self.max_speed))
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            if let Err(e) = config.simulation.speed_bounds() {
                log::warn!("{e} in {}; the bounds will be ignored", config_path.display());
            }
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("initial_speed: 5.0"));
        assert!(ron_str.contains("speed_step: 1.2"));
    }

    #[test]
    fn test_defaults_match_fly_through_timings() {
        let d = StageDurations::default();
        assert_eq!(d.idle, 2.0);
        assert_eq!(d.earth_orbit, 10.0);
        assert_eq!(
            d.approach + d.pull_back + d.top_down + d.return_home,
            20.0
        );
        assert_eq!(CameraConfig::default().start_position, [0.0, 0.0, -40.0]);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.simulation.max_speed = Some(50.0);
        config.assets.directory = PathBuf::from("/opt/orrery/textures");

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_inverted_speed_bounds_keep_rest_of_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.ron"),
            "(window: (width: 1920), simulation: (min_speed: Some(10.0), max_speed: Some(1.0)))",
        )
        .unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config.window.width, 1920);
        assert!(matches!(
            config.simulation.speed_bounds(),
            Err(ConfigError::InvalidSpeedBounds { .. })
        ));
    }

    #[test]
    fn test_speed_bounds_default_unbounded() {
        let bounds = SimulationConfig::default().speed_bounds().unwrap();
        assert_eq!(bounds, (None, None));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
