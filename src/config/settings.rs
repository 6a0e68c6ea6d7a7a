//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]`, so a settings file only needs the
//! keys it overrides.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::mood::MoodTable;

// ---------------------------------------------------------------------------
// CameraConfig
// ---------------------------------------------------------------------------

/// Capture device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// OpenCV device index (0 = first webcam).
    pub index: i32,
    /// Requested frame width in pixels.
    pub width: u32,
    /// Requested frame height in pixels.
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 1280,
            height: 720,
        }
    }
}

// ---------------------------------------------------------------------------
// VisionConfig
// ---------------------------------------------------------------------------

/// Haar-cascade face detector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Path to the frontal-face cascade XML.
    pub cascade_path: PathBuf,
    /// Image pyramid scale step between detection passes.
    pub scale_factor: f64,
    /// Neighbouring detections required to keep a candidate.
    pub min_neighbors: i32,
    /// Smallest face edge, in pixels, that is reported.
    pub min_face_size: i32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            cascade_path: AppPaths::new().cascade_file(),
            scale_factor: 1.1,
            min_neighbors: 5,
            min_face_size: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// ClassifierConfig
// ---------------------------------------------------------------------------

/// Emotion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Path to the FER+ ONNX file.
    pub model_path: PathBuf,
    /// Square input edge the network expects.
    pub input_size: i32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: AppPaths::new().emotion_model_file(),
            input_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchConfig
// ---------------------------------------------------------------------------

/// Background classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum classification tasks running at once.  Faces detected while
    /// every slot is busy are skipped for that tick.
    pub max_in_flight: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { max_in_flight: 4 }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Spotify playback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Hard budget in seconds for one whole playback request (token refresh,
    /// search and play).  Also used as the per-request HTTP timeout.
    pub timeout_secs: u64,
    /// Start playback automatically whenever a new mood is observed.
    pub auto_trigger: bool,
    /// Seconds during which an automatic trigger for the same emotion is
    /// suppressed.
    pub trigger_cooldown_secs: u64,
    /// Base URL of the Web API.
    pub api_base_url: String,
    /// Token endpoint of the accounts service.
    pub accounts_url: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            auto_trigger: false,
            trigger_cooldown_secs: 30,
            api_base_url: "https://api.spotify.com/v1".into(),
            accounts_url: "https://accounts.spotify.com/api/token".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Show the non-dominant emotion scores under the video.
    pub show_scores: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { show_scores: true }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use mood_player::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub vision: VisionConfig,
    pub classifier: ClassifierConfig,
    pub dispatch: DispatchConfig,
    pub playback: PlaybackConfig,
    pub ui: UiConfig,
    /// Emotion → candidate artists.
    pub moods: MoodTable,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::Emotion;
    use tempfile::tempdir;

    /// A default `AppConfig` survives a save / load cycle.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.camera.width, loaded.camera.width);
        assert_eq!(original.vision.cascade_path, loaded.vision.cascade_path);
        assert_eq!(original.classifier.input_size, loaded.classifier.input_size);
        assert_eq!(original.dispatch.max_in_flight, loaded.dispatch.max_in_flight);
        assert_eq!(original.playback.api_base_url, loaded.playback.api_base_url);
        assert_eq!(original.moods, loaded.moods);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.camera.index, 0);
        assert_eq!(config.playback.timeout_secs, 5);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!((cfg.camera.width, cfg.camera.height), (1280, 720));
        assert_eq!(cfg.vision.scale_factor, 1.1);
        assert_eq!(cfg.vision.min_neighbors, 5);
        assert_eq!(cfg.vision.min_face_size, 30);
        assert_eq!(cfg.classifier.input_size, 64);
        assert_eq!(cfg.dispatch.max_in_flight, 4);
        assert!(!cfg.playback.auto_trigger);
        assert_eq!(cfg.playback.trigger_cooldown_secs, 30);
        assert_eq!(cfg.playback.api_base_url, "https://api.spotify.com/v1");
        assert!(cfg.ui.show_scores);
        assert_eq!(
            cfg.moods.candidates(Emotion::Happy),
            ["Dua Lipa".to_string(), "Bruno Mars".to_string()]
        );
    }

    /// A partial file overrides only the keys it names.
    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            r#"
[playback]
auto_trigger = true
timeout_secs = 3

[moods]
sad = ["Radiohead"]
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert!(cfg.playback.auto_trigger);
        assert_eq!(cfg.playback.timeout_secs, 3);
        assert_eq!(cfg.playback.trigger_cooldown_secs, 30);
        assert_eq!(cfg.camera.width, 1280);
        assert_eq!(cfg.moods.candidates(Emotion::Sad), ["Radiohead".to_string()]);
        assert!(cfg.moods.candidates(Emotion::Happy).is_empty());
    }

    /// Unknown mood keys are rejected rather than silently ignored.
    #[test]
    fn unknown_mood_key_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[moods]\nbored = [\"Nobody\"]\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
