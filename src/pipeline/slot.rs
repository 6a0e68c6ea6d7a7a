//! Single-slot, last-write-wins hand-off between classification tasks and the
//! render loop.
//!
//! Writers [`push`](MoodSlot::push) by atomically replacing the slot; the
//! reader [`take`](MoodSlot::take)s by atomically swapping it with `None`.
//! Neither side blocks, and a reader always sees either a whole
//! [`MoodReading`] or nothing.

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;

use crate::emotion::{Classification, Emotion};
use crate::vision::FaceRegion;

/// One delivered classification and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodReading {
    pub classification: Classification,
    /// Capture counter of the frame the face was cut from.
    pub frame_seq: u64,
    pub face: FaceRegion,
    pub observed_at: Instant,
}

impl MoodReading {
    pub fn new(classification: Classification, frame_seq: u64, face: FaceRegion) -> Self {
        Self {
            classification,
            frame_seq,
            face,
            observed_at: Instant::now(),
        }
    }

    pub fn label(&self) -> &str {
        &self.classification.label
    }

    pub fn emotion(&self) -> Option<Emotion> {
        self.classification.emotion()
    }
}

/// The hand-off cell.  Share it as `Arc<MoodSlot>`.
#[derive(Default)]
pub struct MoodSlot {
    cell: ArcSwapOption<MoodReading>,
}

impl MoodSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `reading`, overwriting any unread one.
    pub fn push(&self, reading: MoodReading) {
        self.cell.store(Some(Arc::new(reading)));
    }

    /// The most recent unread reading, leaving the slot empty.
    pub fn take(&self) -> Option<Arc<MoodReading>> {
        self.cell.swap(None)
    }

    /// `true` when a reading is waiting.
    pub fn is_pending(&self) -> bool {
        self.cell.load().is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
