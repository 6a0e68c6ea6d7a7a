//! Render/control loop — one [`MoodLoop::tick`] per UI repaint.
//!
//! # Tick flow
//!
//! ```text
//! Idle
//!   └─▶ next_frame ──None──▶ release device, ShuttingDown, Err(DeviceUnavailable)
//! Detecting
//!   └─▶ locate(frame) → regions
//! Overlaying
//!   ├─▶ dispatcher.submit(frame, region)   for every region (bounded)
//!   └─▶ slot.take()                        freshest reading, if any
//! DispatchingPlayback                      (auto trigger, at most once per tick)
//!   └─▶ block_on(timeout(mapper.trigger(label)))
//! Idle
//! ```
//!
//! Playback runs on the calling thread through [`Handle::block_on`], bounded
//! by `playback.timeout_secs`.  The caller must not itself be a runtime
//! worker thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::runtime::Handle;

use crate::config::PlaybackConfig;
use crate::emotion::Emotion;
use crate::mood::{MoodMapper, PlaybackOutcome};
use crate::vision::{FaceRegion, Frame};

use super::context::AppContext;
use super::dispatcher::Submission;
use super::slot::MoodReading;
use super::state::LoopState;

// ---------------------------------------------------------------------------
// LoopError
// ---------------------------------------------------------------------------

/// Conditions the loop reports instead of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
    /// The capture device stopped producing frames.  The loop has shut down.
    #[error("capture device unavailable")]
    DeviceUnavailable,

    /// The loop was already shut down.
    #[error("loop is shut down")]
    ShutDown,

    /// A manual trigger arrived before any mood was observed.
    #[error("no mood detected yet")]
    NoMoodYet,
}

// ---------------------------------------------------------------------------
// TriggerGate
// ---------------------------------------------------------------------------

/// Suppresses repeated automatic triggers for the same emotion.
#[derive(Debug, Clone)]
pub struct TriggerGate {
    cooldown: Duration,
    last: Option<(Emotion, Instant)>,
}

impl TriggerGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// `true` (and the trigger is recorded) unless `emotion` already fired
    /// less than `cooldown` before `now`.
    pub fn allow(&mut self, emotion: Emotion, now: Instant) -> bool {
        if let Some((last, at)) = self.last {
            if last == emotion && now.saturating_duration_since(at) < self.cooldown {
                return false;
            }
        }
        self.record(emotion, now);
        true
    }

    /// Note a trigger that bypassed the gate (manual playback).
    pub fn record(&mut self, emotion: Emotion, now: Instant) {
        self.last = Some((emotion, now));
    }
}

// ---------------------------------------------------------------------------
// TickReport
// ---------------------------------------------------------------------------

/// Everything the UI needs to draw one frame.
#[derive(Debug)]
pub struct TickReport {
    pub frame: Frame,
    pub faces: Vec<FaceRegion>,
    /// Latest reading seen so far (not necessarily from this tick).
    pub reading: Option<Arc<MoodReading>>,
    /// `true` when `reading` was drained during this tick.
    pub fresh: bool,
    /// Faces handed to background classification this tick.
    pub submitted: usize,
    /// Faces skipped because the dispatcher was saturated.
    pub skipped: usize,
    /// Outcome of an automatic trigger fired during this tick.
    pub outcome: Option<PlaybackOutcome>,
}

// ---------------------------------------------------------------------------
// MoodLoop
// ---------------------------------------------------------------------------

pub struct MoodLoop {
    ctx: AppContext,
    mapper: Arc<MoodMapper>,
    runtime: Handle,
    state: LoopState,
    last_phase: LoopState,
    auto_trigger: bool,
    timeout: Duration,
    gate: TriggerGate,
    latest: Option<Arc<MoodReading>>,
    last_outcome: Option<PlaybackOutcome>,
}

impl MoodLoop {
    /// # Arguments
    ///
    /// * `ctx`      — owns the device, detector and dispatcher.
    /// * `mapper`   — mood → playback.
    /// * `playback` — trigger mode, cooldown and time budget.
    /// * `runtime`  — runtime that drives the playback future.
    pub fn new(
        ctx: AppContext,
        mapper: Arc<MoodMapper>,
        playback: &PlaybackConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            ctx,
            mapper,
            runtime,
            state: LoopState::Idle,
            last_phase: LoopState::Idle,
            auto_trigger: playback.auto_trigger,
            timeout: Duration::from_secs(playback.timeout_secs),
            gate: TriggerGate::new(Duration::from_secs(playback.trigger_cooldown_secs)),
            latest: None,
            last_outcome: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// What the status bar shows between ticks.
    ///
    /// [`state`](Self::state) is back to `Idle` whenever the UI can read it,
    /// so this reports how far the last tick got instead: `Detecting` when
    /// it found no face, `Overlaying` when it did.  `ShuttingDown` once
    /// terminal.
    pub fn phase(&self) -> LoopState {
        if self.state.is_terminal() {
            self.state
        } else {
            self.last_phase
        }
    }

    pub fn latest(&self) -> Option<&Arc<MoodReading>> {
        self.latest.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&PlaybackOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn auto_trigger(&self) -> bool {
        self.auto_trigger
    }

    pub fn set_auto_trigger(&mut self, enabled: bool) {
        self.auto_trigger = enabled;
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one capture → detect → dispatch → drain cycle.
    pub fn tick(&mut self) -> Result<TickReport, LoopError> {
        if self.state.is_terminal() {
            return Err(LoopError::ShutDown);
        }

        self.state = LoopState::Idle;
        let Some(frame) = self.ctx.next_frame() else {
            log::error!("loop: capture device stopped producing frames");
            self.shutdown();
            return Err(LoopError::DeviceUnavailable);
        };

        self.state = LoopState::Detecting;
        let faces = self.ctx.locate(&frame);

        self.state = LoopState::Overlaying;
        self.last_phase = if faces.is_empty() {
            LoopState::Detecting
        } else {
            LoopState::Overlaying
        };
        let mut submitted = 0;
        let mut skipped = 0;
        for region in &faces {
            match self.ctx.dispatcher().submit(&frame, *region) {
                Submission::Spawned(_) => submitted += 1,
                Submission::Skipped => skipped += 1,
                Submission::EmptyRegion => {}
            }
        }

        let drained = self.ctx.slot().take();
        let fresh = drained.is_some();
        if let Some(reading) = drained {
            self.latest = Some(reading);
        }

        let mut outcome = None;
        if fresh && self.auto_trigger {
            if let Some(reading) = self.latest.clone() {
                let allowed = reading
                    .emotion()
                    .is_some_and(|e| self.gate.allow(e, Instant::now()));
                if allowed {
                    outcome = Some(self.dispatch_playback(reading.label()));
                }
            }
        }

        self.state = LoopState::Idle;
        Ok(TickReport {
            frame,
            faces,
            reading: self.latest.clone(),
            fresh,
            submitted,
            skipped,
            outcome,
        })
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    /// Start playback for the latest observed mood.
    pub fn trigger_manual(&mut self) -> Result<PlaybackOutcome, LoopError> {
        if self.state.is_terminal() {
            return Err(LoopError::ShutDown);
        }
        let reading = self.latest.clone().ok_or(LoopError::NoMoodYet)?;
        if let Some(emotion) = reading.emotion() {
            self.gate.record(emotion, Instant::now());
        }
        let outcome = self.dispatch_playback(reading.label());
        self.state = LoopState::Idle;
        Ok(outcome)
    }

    fn dispatch_playback(&mut self, label: &str) -> PlaybackOutcome {
        self.state = LoopState::DispatchingPlayback;
        let mapper = Arc::clone(&self.mapper);
        let budget = self.timeout;
        let outcome = self
            .runtime
            .block_on(async move { tokio::time::timeout(budget, mapper.trigger(label)).await })
            .unwrap_or_else(|_| {
                log::warn!("loop: playback abandoned after {budget:?}");
                PlaybackOutcome::TimedOut
            });
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Enter [`LoopState::ShuttingDown`] and release the capture device.
    /// Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if !self.state.is_terminal() {
            log::info!("loop: shutting down");
        }
        self.state = LoopState::ShuttingDown;
        self.ctx.release();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DispatchConfig, PlaybackConfig};
    use crate::emotion::{ClassifyError, EmotionClassifier, MockClassifier};
    use crate::mood::{ArtistPicker, MoodTable, PlaybackTarget};
    use crate::pipeline::MoodSlot;
    use crate::spotify::{MockMusicApi, MockTokenProvider};
    use crate::vision::{MockFaceLocator, MockFrameSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    struct Harness {
        mood_loop: MoodLoop,
        api: Arc<MockMusicApi>,
        released: Arc<AtomicUsize>,
        _rt: tokio::runtime::Runtime,
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    fn harness(
        frames: usize,
        faces: Vec<FaceRegion>,
        classifier: Arc<dyn EmotionClassifier>,
        api: MockMusicApi,
        playback: PlaybackConfig,
    ) -> Harness {
        let rt = runtime();
        let source = MockFrameSource::new(frames);
        let released = source.release_counter();
        let ctx = AppContext::new(
            Box::new(source),
            Box::new(MockFaceLocator(faces)),
            classifier,
            &DispatchConfig::default(),
            rt.handle().clone(),
        );
        let api = Arc::new(api);
        let mapper = MoodMapper::new(
            MoodTable::default(),
            ArtistPicker::seeded(1),
            Arc::new(MockTokenProvider::new()),
            Arc::clone(&api) as Arc<dyn crate::spotify::MusicApi>,
            PlaybackTarget {
                refresh_token: "r".into(),
                device_id: "dev".into(),
            },
        );
        let mood_loop = MoodLoop::new(ctx, Arc::new(mapper), &playback, rt.handle().clone());
        Harness {
            mood_loop,
            api,
            released,
            _rt: rt,
        }
    }

    fn one_face() -> Vec<FaceRegion> {
        vec![FaceRegion::new(4, 4, 32, 32)]
    }

    fn auto_playback() -> PlaybackConfig {
        PlaybackConfig {
            auto_trigger: true,
            ..PlaybackConfig::default()
        }
    }

    /// Block until every background classification has finished.
    fn settle(mood_loop: &MoodLoop) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while mood_loop.context().dispatcher().in_flight() > 0 {
            assert!(Instant::now() < deadline, "classification never finished");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    fn push(slot: &MoodSlot, label: &str) {
        slot.push(MoodReading::new(
            crate::emotion::Classification {
                label: label.into(),
                scores: vec![(label.into(), 1.0)],
            },
            0,
            FaceRegion::new(0, 0, 1, 1),
        ));
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    fn tick_detects_and_classifies() {
        let mut h = harness(
            5,
            one_face(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T1"),
            PlaybackConfig::default(),
        );

        let first = h.mood_loop.tick().unwrap();
        assert_eq!(first.faces.len(), 1);
        assert_eq!(first.submitted, 1);
        assert_eq!(h.mood_loop.state(), LoopState::Idle);
        assert_eq!(h.mood_loop.phase(), LoopState::Overlaying);

        settle(&h.mood_loop);
        let second = h.mood_loop.tick().unwrap();
        assert_eq!(second.reading.unwrap().label(), "happy");
        // auto trigger is off by default
        assert!(second.outcome.is_none());
        assert!(h.api.calls().is_empty());
    }

    #[test]
    fn no_faces_means_no_readings() {
        let mut h = harness(
            3,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T1"),
            PlaybackConfig::default(),
        );
        assert_eq!(h.mood_loop.phase(), LoopState::Idle);
        for _ in 0..3 {
            let report = h.mood_loop.tick().unwrap();
            assert_eq!(report.submitted, 0);
            assert!(report.reading.is_none());
        }
        assert_eq!(h.mood_loop.phase(), LoopState::Detecting);
        assert_eq!(h.mood_loop.phase().label(), "Detecting");
    }

    #[test]
    fn classifier_failure_keeps_previous_mood() {
        let mut h = harness(
            5,
            one_face(),
            Arc::new(MockClassifier::err(ClassifyError::Inference("boom".into()))),
            MockMusicApi::finds("T1"),
            PlaybackConfig::default(),
        );
        push(h.mood_loop.context().slot(), "sad");
        let report = h.mood_loop.tick().unwrap();
        assert_eq!(report.reading.unwrap().label(), "sad");

        settle(&h.mood_loop);
        let report = h.mood_loop.tick().unwrap();
        assert!(!report.fresh);
        assert_eq!(report.reading.unwrap().label(), "sad");
    }

    #[test]
    fn device_exhaustion_shuts_down_and_releases_once() {
        let mut h = harness(
            1,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T1"),
            PlaybackConfig::default(),
        );
        assert!(h.mood_loop.tick().is_ok());
        assert_eq!(h.mood_loop.tick().unwrap_err(), LoopError::DeviceUnavailable);
        assert_eq!(h.mood_loop.state(), LoopState::ShuttingDown);
        assert_eq!(h.mood_loop.phase(), LoopState::ShuttingDown);
        assert_eq!(h.mood_loop.tick().unwrap_err(), LoopError::ShutDown);

        h.mood_loop.shutdown();
        drop(h.mood_loop);
        assert_eq!(h.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_shutdown_releases_device() {
        let mut h = harness(
            10,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T1"),
            PlaybackConfig::default(),
        );
        h.mood_loop.tick().unwrap();
        h.mood_loop.shutdown();
        assert_eq!(h.released.load(Ordering::SeqCst), 1);
        assert_eq!(h.mood_loop.trigger_manual().unwrap_err(), LoopError::ShutDown);
    }

    // ---- Manual trigger ---

    #[test]
    fn manual_trigger_without_mood_is_reported() {
        let mut h = harness(
            2,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T1"),
            PlaybackConfig::default(),
        );
        h.mood_loop.tick().unwrap();
        assert_eq!(h.mood_loop.trigger_manual().unwrap_err(), LoopError::NoMoodYet);
        assert!(h.api.calls().is_empty());
    }

    #[test]
    fn manual_trigger_plays_latest_mood() {
        let mut h = harness(
            2,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T7"),
            PlaybackConfig::default(),
        );
        push(h.mood_loop.context().slot(), "sadness");
        h.mood_loop.tick().unwrap();

        let outcome = h.mood_loop.trigger_manual().unwrap();
        assert!(matches!(
            outcome,
            PlaybackOutcome::Started { ref track_id, .. } if track_id == "T7"
        ));
        assert_eq!(h.mood_loop.last_outcome(), Some(&outcome));
        assert_eq!(h.api.play_calls().len(), 1);
        assert_eq!(h.mood_loop.state(), LoopState::Idle);
    }

    #[test]
    fn manual_trigger_reports_unsupported_mood() {
        let mut h = harness(
            2,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T7"),
            PlaybackConfig::default(),
        );
        push(h.mood_loop.context().slot(), "contempt");
        h.mood_loop.tick().unwrap();
        assert!(matches!(
            h.mood_loop.trigger_manual().unwrap(),
            PlaybackOutcome::UnsupportedMood { .. }
        ));
        assert!(h.api.calls().is_empty());
    }

    // ---- Auto trigger ---

    #[test]
    fn auto_trigger_fires_once_per_fresh_reading() {
        let mut h = harness(
            5,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T1"),
            auto_playback(),
        );
        push(h.mood_loop.context().slot(), "happy");
        let report = h.mood_loop.tick().unwrap();
        assert!(report.outcome.as_ref().is_some_and(|o| o.is_started()));

        // stale reading: nothing new drained, nothing fired
        let report = h.mood_loop.tick().unwrap();
        assert!(report.outcome.is_none());
        assert_eq!(h.api.play_calls().len(), 1);
    }

    #[test]
    fn auto_trigger_debounces_same_emotion() {
        let mut h = harness(
            5,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T1"),
            auto_playback(),
        );
        push(h.mood_loop.context().slot(), "happy");
        assert!(h.mood_loop.tick().unwrap().outcome.is_some());

        push(h.mood_loop.context().slot(), "happiness");
        assert!(h.mood_loop.tick().unwrap().outcome.is_none());

        push(h.mood_loop.context().slot(), "sad");
        assert!(h.mood_loop.tick().unwrap().outcome.is_some());
        assert_eq!(h.api.play_calls().len(), 2);
    }

    #[test]
    fn auto_trigger_uses_only_freshest_reading() {
        let mut h = harness(
            5,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T1"),
            auto_playback(),
        );
        let slot = Arc::clone(h.mood_loop.context().slot());
        push(&slot, "sad");
        push(&slot, "angry");
        push(&slot, "neutral");

        let report = h.mood_loop.tick().unwrap();
        assert_eq!(report.reading.unwrap().label(), "neutral");
        assert_eq!(h.api.calls().len(), 2);
    }

    #[test]
    fn slow_playback_times_out() {
        let mut h = harness(
            2,
            Vec::new(),
            Arc::new(MockClassifier::ok("happy")),
            MockMusicApi::finds("T1").with_delay(Duration::from_secs(5)),
            PlaybackConfig {
                timeout_secs: 1,
                ..PlaybackConfig::default()
            },
        );
        push(h.mood_loop.context().slot(), "happy");
        h.mood_loop.tick().unwrap();

        let started = Instant::now();
        assert_eq!(h.mood_loop.trigger_manual().unwrap(), PlaybackOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    // ---- TriggerGate ---

    #[test]
    fn gate_allows_after_cooldown() {
        let mut gate = TriggerGate::new(Duration::from_secs(30));
        let t0 = Instant::now();
        assert!(gate.allow(Emotion::Happy, t0));
        assert!(!gate.allow(Emotion::Happy, t0 + Duration::from_secs(10)));
        assert!(gate.allow(Emotion::Happy, t0 + Duration::from_secs(31)));
    }

    #[test]
    fn gate_allows_different_emotion_immediately() {
        let mut gate = TriggerGate::new(Duration::from_secs(30));
        let t0 = Instant::now();
        assert!(gate.allow(Emotion::Sad, t0));
        assert!(gate.allow(Emotion::Angry, t0));
        assert!(gate.allow(Emotion::Sad, t0));
    }

    #[test]
    fn gate_respects_manual_record() {
        let mut gate = TriggerGate::new(Duration::from_secs(30));
        let t0 = Instant::now();
        gate.record(Emotion::Neutral, t0);
        assert!(!gate.allow(Emotion::Neutral, t0 + Duration::from_secs(1)));
    }
}
