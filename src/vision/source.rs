//! `FrameSource` / `FaceLocator` traits and the vision error type.

use thiserror::Error;

use super::frame::{FaceRegion, Frame};

// ---------------------------------------------------------------------------
// VisionError
// ---------------------------------------------------------------------------

/// Errors raised while setting up capture devices or detector models.
///
/// Once running, neither trait reports errors: an unavailable device shows up
/// as `None` from [`FrameSource::next_frame`], and a detector hiccup as an
/// empty region list.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The capture device could not be opened.
    #[error("cannot open capture device {index}: {reason}")]
    DeviceOpen { index: i32, reason: String },

    /// A detector or classifier model could not be loaded.
    #[error("cannot load model {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    /// Any other backend failure.
    #[error("vision backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "camera")]
impl From<opencv::Error> for VisionError {
    fn from(e: opencv::Error) -> Self {
        VisionError::Backend(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// FrameSource
// ---------------------------------------------------------------------------

/// Produces a continuous sequence of frames from a capture device.
///
/// The source owns the device handle exclusively.  [`release`](Self::release)
/// must be idempotent: the owning context calls it on every shutdown path and
/// again from `Drop`.
pub trait FrameSource: Send {
    /// Grab the next frame.  `None` means the device is unavailable; the
    /// caller treats that as fatal for the render loop.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Release the underlying device.  Later calls are no-ops.
    fn release(&mut self);
}

// ---------------------------------------------------------------------------
// FaceLocator
// ---------------------------------------------------------------------------

/// Finds face rectangles in a frame.
///
/// Runs synchronously on the render thread.  Zero faces is an empty `Vec`,
/// never an error; results are unordered.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Vec<FaceRegion>;
}

// Compile-time assertion: both traits must be usable as trait objects.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn FrameSource>, _: Box<dyn FaceLocator>) {}
};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Yields `frames` solid grey frames, then reports the device as gone.
/// Counts `release` calls through a shared counter.
#[cfg(test)]
pub struct MockFrameSource {
    remaining: usize,
    next_seq: u64,
    released: bool,
    release_calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
impl MockFrameSource {
    pub fn new(frames: usize) -> Self {
        Self {
            remaining: frames,
            next_seq: 0,
            released: false,
            release_calls: Default::default(),
        }
    }

    /// Counter incremented each time the device is actually released.
    pub fn release_counter(&self) -> std::sync::Arc<std::sync::atomic::AtomicUsize> {
        std::sync::Arc::clone(&self.release_calls)
    }
}

#[cfg(test)]
impl FrameSource for MockFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.released || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        Frame::solid(seq, 64, 48, [90, 90, 90]).ok()
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.release_calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }
}

/// Reports the same regions for every frame.
#[cfg(test)]
pub struct MockFaceLocator(pub Vec<FaceRegion>);

#[cfg(test)]
impl FaceLocator for MockFaceLocator {
    fn locate(&mut self, _frame: &Frame) -> Vec<FaceRegion> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vision_error_display_mentions_device_index() {
        let e = VisionError::DeviceOpen {
            index: 2,
            reason: "busy".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains('2') && msg.contains("busy"));
    }

    #[test]
    fn mock_source_runs_dry_then_releases_once() {
        use std::sync::atomic::Ordering;

        let mut src = MockFrameSource::new(2);
        let counter = src.release_counter();
        assert_eq!(src.next_frame().map(|f| f.seq()), Some(0));
        assert_eq!(src.next_frame().map(|f| f.seq()), Some(1));
        assert!(src.next_frame().is_none());

        src.release();
        src.release();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
