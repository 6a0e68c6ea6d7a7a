//! Perception → action pipeline.
//!
//! This module wires webcam frames through face detection and background
//! emotion classification back into the render loop, and from there into
//! playback.
//!
//! # Architecture
//!
//! ```text
//! eframe update()  (render thread, once per repaint)
//!        │
//!        ▼
//! MoodLoop::tick()
//!        │
//!        ├─ AppContext::next_frame      FrameSource (owned, released once)
//!        ├─ AppContext::locate          FaceLocator
//!        ├─ ClassificationDispatcher    spawn_blocking(classifier) ≤ max_in_flight
//!        │        └──────────────────▶ MoodSlot::push   (last write wins)
//!        ├─ MoodSlot::take              freshest reading or nothing
//!        └─ [auto trigger]              block_on(timeout(MoodMapper::trigger))
//!
//! "Play my vibe" ─▶ MoodLoop::trigger_manual()
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mood_player::config::AppConfig;
//! use mood_player::emotion::EmotionClassifier;
//! use mood_player::mood::MoodMapper;
//! use mood_player::pipeline::{AppContext, MoodLoop};
//! use mood_player::vision::{FaceLocator, FrameSource};
//!
//! # fn make_source() -> Box<dyn FrameSource> { unimplemented!() }
//! # fn make_locator() -> Box<dyn FaceLocator> { unimplemented!() }
//! # fn make_classifier() -> Arc<dyn EmotionClassifier> { unimplemented!() }
//! # fn make_mapper() -> Arc<MoodMapper> { unimplemented!() }
//! let config = AppConfig::default();
//! let rt = tokio::runtime::Runtime::new().unwrap();
//!
//! let ctx = AppContext::new(
//!     make_source(),
//!     make_locator(),
//!     make_classifier(),
//!     &config.dispatch,
//!     rt.handle().clone(),
//! );
//! let mut mood_loop = MoodLoop::new(ctx, make_mapper(), &config.playback, rt.handle().clone());
//!
//! while let Ok(report) = mood_loop.tick() {
//!     if let Some(reading) = report.reading {
//!         println!("mood: {}", reading.label());
//!     }
//! }
//! ```

pub mod context;
pub mod dispatcher;
pub mod runner;
pub mod slot;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use context::AppContext;
pub use dispatcher::{classify_and_publish, ClassificationDispatcher, Submission};
pub use runner::{LoopError, MoodLoop, TickReport, TriggerGate};
pub use slot::{MoodReading, MoodSlot};
pub use state::LoopState;
