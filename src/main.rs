//! Application entry point — mood player.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Merge `.env` into the environment and read the Spotify credentials
//!    plus `DEVICE_ID` (missing keys abort startup).
//! 3. Load [`AppConfig`] from disk (returns default on first run).
//! 4. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 5. Open the webcam, load the Haar cascade and the FER+ model.
//! 6. Build the Spotify clients and the [`MoodMapper`].
//! 7. Wire [`AppContext`] and [`MoodLoop`].
//! 8. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use anyhow::Context as _;
use eframe::egui;
use mood_player::{
    app::MoodPlayerApp,
    config::{load_dotenv, AppConfig, Credentials},
    emotion::{EmotionClassifier, FerPlusClassifier},
    mood::{ArtistPicker, MoodMapper, PlaybackTarget},
    pipeline::{AppContext, MoodLoop},
    spotify::{MusicApi, SpotifyClient, SpotifyTokenProvider, TokenProvider},
    vision::{HaarFaceLocator, OpenCvCamera},
};

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (w, h) = (config.camera.width as f32, config.camera.height as f32);
    let scale = (960.0 / w).min(1.0);
    let vp = egui::ViewportBuilder::default()
        .with_title("Mood Player")
        .with_inner_size([w * scale, h * scale + 90.0])
        .with_min_inner_size([320.0, 260.0]);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("mood player starting up");

    // 2. Credentials
    load_dotenv();
    let credentials = Credentials::from_env()?;
    let device_id = Credentials::device_id_from_env()?;

    // 3. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 4. Tokio runtime (classification workers + playback requests)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 5. Vision
    let camera = OpenCvCamera::open(&config.camera)?;
    let locator = HaarFaceLocator::load(&config.vision).with_context(|| {
        format!(
            "face detector missing; place {} there or set vision.cascade_path",
            config.vision.cascade_path.display()
        )
    })?;
    let classifier: Arc<dyn EmotionClassifier> = Arc::new(
        FerPlusClassifier::load(&config.classifier.model_path, config.classifier.input_size)
            .with_context(|| {
                format!(
                    "emotion model missing; place it at {} or set classifier.model_path",
                    config.classifier.model_path.display()
                )
            })?,
    );
    log::info!("vision ready (camera {})", config.camera.index);

    // 6. Playback
    let tokens: Arc<dyn TokenProvider> = Arc::new(SpotifyTokenProvider::from_config(
        &credentials,
        &config.playback,
    ));
    let api: Arc<dyn MusicApi> = Arc::new(SpotifyClient::from_config(&config.playback));
    let mapper = Arc::new(MoodMapper::new(
        config.moods.clone(),
        ArtistPicker::from_entropy(),
        tokens,
        api,
        PlaybackTarget {
            refresh_token: credentials.refresh_token.clone(),
            device_id,
        },
    ));

    // 7. Pipeline
    let ctx = AppContext::new(
        Box::new(camera),
        Box::new(locator),
        classifier,
        &config.dispatch,
        rt.handle().clone(),
    );
    let mood_loop = MoodLoop::new(ctx, mapper, &config.playback, rt.handle().clone());

    // 8. Window (blocks until closed)
    let app = MoodPlayerApp::new(mood_loop, &config.ui);
    eframe::run_native(
        "Mood Player",
        native_options(&config),
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))?;

    // Straggling classification tasks are detached rather than awaited.
    rt.shutdown_background();
    log::info!("mood player stopped");
    Ok(())
}
