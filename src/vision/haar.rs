//! Haar-cascade face detection via OpenCV `CascadeClassifier`.

use opencv::{
    core::{Mat, Rect, Size, Vector},
    objdetect,
    prelude::*,
};

use crate::config::VisionConfig;

use super::frame::{FaceRegion, Frame};
use super::source::{FaceLocator, VisionError};

/// [`FaceLocator`] backed by a frontal-face Haar cascade.
pub struct HaarFaceLocator {
    cascade: objdetect::CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
    min_size: i32,
}

impl HaarFaceLocator {
    /// Load the cascade XML named by `config.cascade_path`.
    ///
    /// # Errors
    ///
    /// [`VisionError::ModelLoad`] when the file is missing or OpenCV rejects it.
    pub fn load(config: &VisionConfig) -> Result<Self, VisionError> {
        let path = config.cascade_path.display().to_string();
        let load_err = |reason: String| VisionError::ModelLoad {
            path: path.clone(),
            reason,
        };

        if !config.cascade_path.exists() {
            return Err(load_err("file not found".into()));
        }

        let cascade =
            objdetect::CascadeClassifier::new(&path).map_err(|e| load_err(e.to_string()))?;
        if cascade.empty().map_err(|e| load_err(e.to_string()))? {
            return Err(load_err("cascade is empty".into()));
        }

        log::info!("face locator: loaded cascade {path}");

        Ok(Self {
            cascade,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_size: config.min_face_size,
        })
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceRegion>, VisionError> {
        let gray = frame.to_gray();
        let mat = Mat::new_rows_cols_with_data(frame.height() as i32, frame.width() as i32, &gray)?;

        let mut rects: Vector<Rect> = Vector::new();
        self.cascade.detect_multi_scale(
            &*mat,
            &mut rects,
            self.scale_factor,
            self.min_neighbors,
            0,
            Size::new(self.min_size, self.min_size),
            Size::default(),
        )?;

        Ok(rects
            .iter()
            .filter(|r| r.x >= 0 && r.y >= 0 && r.width > 0 && r.height > 0)
            .map(|r| FaceRegion::new(r.x as u32, r.y as u32, r.width as u32, r.height as u32))
            .collect())
    }
}

impl FaceLocator for HaarFaceLocator {
    fn locate(&mut self, frame: &Frame) -> Vec<FaceRegion> {
        self.detect(frame).unwrap_or_else(|e| {
            log::warn!("face locator: detection failed on frame {}: {e}", frame.seq());
            Vec::new()
        })
    }
}
