//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\mood-player\
//!   macOS:   ~/Library/Application Support/mood-player/
//!   Linux:   ~/.config/mood-player/
//!
//! Data dir (detector + classifier models):
//!   Windows: %LOCALAPPDATA%\mood-player\
//!   macOS:   ~/Library/Application Support/mood-player/
//!   Linux:   ~/.local/share/mood-player/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for the Haar cascade and the emotion model.
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "mood-player";

    /// File name of the default frontal-face cascade.
    pub const CASCADE_FILE: &'static str = "haarcascade_frontalface_default.xml";
    /// File name of the default FER+ emotion model.
    pub const EMOTION_MODEL_FILE: &'static str = "emotion-ferplus-8.onnx";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            config_dir,
            models_dir: data_dir.join("models"),
        }
    }

    /// Default location of the Haar cascade XML.
    pub fn cascade_file(&self) -> PathBuf {
        self.models_dir.join(Self::CASCADE_FILE)
    }

    /// Default location of the FER+ ONNX model.
    pub fn emotion_model_file(&self) -> PathBuf {
        self.models_dir.join(Self::EMOTION_MODEL_FILE)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
