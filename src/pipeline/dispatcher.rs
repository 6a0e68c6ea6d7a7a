//! Background classification of face regions.
//!
//! # Flow
//!
//! ```text
//! render thread                       blocking pool
//! ─────────────                       ─────────────
//! submit(frame, region)
//!   ├─ crop region          (copy)
//!   ├─ try_acquire permit ──busy──▶ Skipped
//!   └─ spawn_blocking ──────────────▶ classifier.classify(face)
//!                                       ├─ valid → slot.push(reading)
//!                                       └─ Err / malformed → warn, drop
//! ```
//!
//! At most `max_in_flight` classifications run at once.  A face seen while
//! every permit is taken is skipped for that tick; the next frame will offer
//! it again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::emotion::{Classification, EmotionClassifier};
use crate::vision::{FaceRegion, Frame};

use super::slot::{MoodReading, MoodSlot};

/// What [`ClassificationDispatcher::submit`] did with a region.
#[derive(Debug)]
pub enum Submission {
    /// A background task was started.
    Spawned(JoinHandle<()>),
    /// Every permit was in use.
    Skipped,
    /// The region does not overlap the frame.
    EmptyRegion,
}

impl Submission {
    pub fn is_spawned(&self) -> bool {
        matches!(self, Submission::Spawned(_))
    }
}

/// Spawns bounded classification tasks that publish into a [`MoodSlot`].
pub struct ClassificationDispatcher {
    classifier: Arc<dyn EmotionClassifier>,
    slot: Arc<MoodSlot>,
    permits: Arc<Semaphore>,
    capacity: usize,
    runtime: Handle,
    skipped: AtomicU64,
}

impl ClassificationDispatcher {
    /// # Arguments
    ///
    /// * `classifier`    — shared model, called from blocking tasks.
    /// * `slot`          — hand-off cell read by the render loop.
    /// * `max_in_flight` — concurrency cap (values below 1 are raised to 1).
    /// * `runtime`       — runtime whose blocking pool runs the tasks.
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        slot: Arc<MoodSlot>,
        max_in_flight: usize,
        runtime: Handle,
    ) -> Self {
        let capacity = max_in_flight.max(1);
        Self {
            classifier,
            slot,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            runtime,
            skipped: AtomicU64::new(0),
        }
    }

    /// Crop `region` out of `frame` and classify it in the background.
    pub fn submit(&self, frame: &Frame, region: FaceRegion) -> Submission {
        let Some(face) = frame.crop(&region) else {
            return Submission::EmptyRegion;
        };

        let permit = match Arc::clone(&self.permits).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                let n = self.skipped.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!("dispatch: all workers busy, skipping face ({n} skipped so far)");
                return Submission::Skipped;
            }
        };

        let classifier = Arc::clone(&self.classifier);
        let slot = Arc::clone(&self.slot);
        let handle = self.runtime.spawn_blocking(move || {
            let _permit = permit;
            classify_and_publish(classifier.as_ref(), &slot, &face, region);
        });
        Submission::Spawned(handle)
    }

    /// Classifications currently running.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Faces skipped because every worker was busy.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn slot(&self) -> &Arc<MoodSlot> {
        &self.slot
    }
}

/// Classify one face and push the result; failures are logged and dropped.
///
/// Returns `true` when a reading was published.
pub fn classify_and_publish(
    classifier: &dyn EmotionClassifier,
    slot: &MoodSlot,
    face: &Frame,
    region: FaceRegion,
) -> bool {
    match classifier.classify(face).and_then(Classification::validated) {
        Ok(classification) => {
            log::debug!(
                "dispatch: frame {} → {}",
                face.seq(),
                classification.label
            );
            slot.push(MoodReading::new(classification, face.seq(), region));
            true
        }
        Err(e) => {
            log::warn!("dispatch: classification of frame {} failed: {e}", face.seq());
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
