//! Application context: the capture device, the detector and the hand-off
//! slot, owned in one place.
//!
//! The device is acquired when the context is built and released exactly
//! once: by [`AppContext::release`] on an orderly shutdown, or by `Drop` on
//! any other exit path.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::DispatchConfig;
use crate::emotion::EmotionClassifier;
use crate::vision::{FaceLocator, FaceRegion, Frame, FrameSource};

use super::dispatcher::ClassificationDispatcher;
use super::slot::MoodSlot;

pub struct AppContext {
    source: Option<Box<dyn FrameSource>>,
    locator: Box<dyn FaceLocator>,
    dispatcher: ClassificationDispatcher,
}

impl AppContext {
    /// Take ownership of an opened `source` and wire a dispatcher that runs
    /// `classifier` on `runtime`'s blocking pool.
    pub fn new(
        source: Box<dyn FrameSource>,
        locator: Box<dyn FaceLocator>,
        classifier: Arc<dyn EmotionClassifier>,
        dispatch: &DispatchConfig,
        runtime: Handle,
    ) -> Self {
        let slot = Arc::new(MoodSlot::new());
        Self {
            source: Some(source),
            locator,
            dispatcher: ClassificationDispatcher::new(
                classifier,
                slot,
                dispatch.max_in_flight,
                runtime,
            ),
        }
    }

    /// Next frame from the device.  `None` once released or when the device
    /// stops producing.
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.source.as_mut()?.next_frame()
    }

    pub fn locate(&mut self, frame: &Frame) -> Vec<FaceRegion> {
        self.locator.locate(frame)
    }

    pub fn dispatcher(&self) -> &ClassificationDispatcher {
        &self.dispatcher
    }

    pub fn slot(&self) -> &Arc<MoodSlot> {
        self.dispatcher.slot()
    }

    pub fn is_released(&self) -> bool {
        self.source.is_none()
    }

    /// Release the capture device.  Safe to call repeatedly.
    ///
    /// Classification tasks still running are left to finish on their own;
    /// whatever they publish is never read.
    pub fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
            log::info!(
                "context: capture device released ({} classification(s) still running)",
                self.dispatcher.in_flight()
            );
        }
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.release();
    }
}
