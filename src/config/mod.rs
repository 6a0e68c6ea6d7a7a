//! Configuration module for the mood player.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, TOML persistence via
//! `AppConfig::load` / `AppConfig::save`, and `Credentials` read from the
//! environment.

pub mod credentials;
pub mod paths;
pub mod settings;

pub use credentials::{load_dotenv, require_key, ConfigError, Credentials};
pub use paths::AppPaths;
pub use settings::{
    AppConfig, CameraConfig, ClassifierConfig, DispatchConfig, PlaybackConfig, UiConfig,
    VisionConfig,
};
