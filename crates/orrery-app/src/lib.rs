//! Windowed host for the orrery simulation: platform directories, the
//! fixed-step loop, free-look and the winit event handler.

pub mod error;
pub mod free_look;
pub mod game_loop;
pub mod host;
pub mod platform;
pub mod scene;
pub mod window;

pub use error::AppError;
pub use free_look::FreeLook;
pub use game_loop::{FIXED_DT, GameLoop, MAX_FRAME_TIME};
pub use host::{ActionCommands, CameraRig};
pub use platform::{PlatformDirs, PlatformError};
pub use scene::{build_scene, fallback_color, texture_manifest};
pub use window::{App, run, window_attributes_from_config};
