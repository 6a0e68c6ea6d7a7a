//! Webcam capture via OpenCV `VideoCapture`.
//!
//! [`OpenCvCamera`] opens the device once with the configured resolution and
//! converts every BGR `Mat` into an RGB [`Frame`].  The device is released
//! exactly once: explicitly through [`FrameSource::release`] or, failing
//! that, on drop.

use opencv::{core::Mat, imgproc, prelude::*, videoio};

use crate::config::CameraConfig;

use super::frame::Frame;
use super::source::{FrameSource, VisionError};

/// OpenCV-backed [`FrameSource`].
pub struct OpenCvCamera {
    /// `None` once released.
    capture: Option<videoio::VideoCapture>,
    index: i32,
    next_seq: u64,
}

impl OpenCvCamera {
    /// Open camera `config.index` and request `config.width` × `config.height`.
    ///
    /// # Errors
    ///
    /// [`VisionError::DeviceOpen`] when OpenCV cannot open the device.
    pub fn open(config: &CameraConfig) -> Result<Self, VisionError> {
        let open_err = |reason: String| VisionError::DeviceOpen {
            index: config.index,
            reason,
        };

        let mut capture = videoio::VideoCapture::new(config.index, videoio::CAP_ANY)
            .map_err(|e| open_err(e.to_string()))?;

        if !capture.is_opened().map_err(|e| open_err(e.to_string()))? {
            return Err(open_err("device did not open".into()));
        }

        // Resolution is a request; drivers may pick the nearest mode.
        capture.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(config.width))?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(config.height))?;
        capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)?;

        log::info!(
            "camera {}: opened at {}x{} (requested {}x{})",
            config.index,
            capture.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0),
            capture.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0),
            config.width,
            config.height
        );

        Ok(Self {
            capture: Some(capture),
            index: config.index,
            next_seq: 0,
        })
    }

    fn grab(&mut self) -> Result<Option<Frame>, VisionError> {
        let Some(capture) = self.capture.as_mut() else {
            return Ok(None);
        };

        let mut bgr = Mat::default();
        if !capture.read(&mut bgr)? || bgr.empty() {
            return Ok(None);
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB)?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let pixels = rgb.data_bytes()?.to_vec();

        let seq = self.next_seq;
        self.next_seq += 1;

        Frame::from_rgb(seq, width, height, pixels)
            .map(Some)
            .map_err(|e| VisionError::Backend(e.to_string()))
    }
}

impl FrameSource for OpenCvCamera {
    fn next_frame(&mut self) -> Option<Frame> {
        match self.grab() {
            Ok(frame) => {
                if frame.is_none() {
                    log::warn!("camera {}: no frame available", self.index);
                }
                frame
            }
            Err(e) => {
                log::warn!("camera {}: capture failed: {e}", self.index);
                None
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            match capture.release() {
                Ok(()) => log::info!("camera {}: released", self.index),
                Err(e) => log::warn!("camera {}: release failed: {e}", self.index),
            }
        }
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.release();
    }
}
