//! FER+ emotion model run through OpenCV's DNN module.
//!
//! The network takes a `1×1×64×64` grayscale tensor and emits eight logits in
//! the order of [`FERPLUS_LABELS`].  Logits are soft-maxed into probabilities
//! before being handed back as a [`Classification`].

use std::path::Path;
use std::sync::Mutex;

use opencv::{
    core::{self, Mat, Scalar, Size},
    dnn,
    prelude::*,
};

use crate::vision::{Frame, VisionError};

use super::classifier::{Classification, ClassifyError, EmotionClassifier};

/// Output order of the FER+ network.
pub const FERPLUS_LABELS: [&str; 8] = [
    "neutral",
    "happiness",
    "surprise",
    "sadness",
    "anger",
    "disgust",
    "fear",
    "contempt",
];

/// [`EmotionClassifier`] backed by a FER+ ONNX file.
///
/// `dnn::Net::forward` needs `&mut self`, so the network sits behind a
/// `Mutex`; concurrent classifications serialise on it.
pub struct FerPlusClassifier {
    net: Mutex<dnn::Net>,
    input_size: i32,
}

impl FerPlusClassifier {
    /// Load the network from `model_path`.
    ///
    /// # Errors
    ///
    /// [`VisionError::ModelLoad`] when the file is missing or unreadable.
    pub fn load(model_path: impl AsRef<Path>, input_size: i32) -> Result<Self, VisionError> {
        let path = model_path.as_ref();
        let load_err = |reason: String| VisionError::ModelLoad {
            path: path.display().to_string(),
            reason,
        };

        if !path.exists() {
            return Err(load_err("file not found".into()));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| load_err("path is not valid UTF-8".into()))?;

        let net = dnn::read_net_from_onnx(path_str).map_err(|e| load_err(e.to_string()))?;
        log::info!("classifier: loaded FER+ model {}", path.display());

        Ok(Self {
            net: Mutex::new(net),
            input_size,
        })
    }

    fn infer(&self, face: &Frame) -> opencv::Result<Vec<f32>> {
        let gray = face.to_gray();
        let mat = Mat::new_rows_cols_with_data(face.height() as i32, face.width() as i32, &gray)?;
        let blob = dnn::blob_from_image(
            &*mat,
            1.0,
            Size::new(self.input_size, self.input_size),
            Scalar::default(),
            false,
            false,
            core::CV_32F,
        )?;

        let mut net = self
            .net
            .lock()
            .map_err(|_| opencv::Error::new(core::StsError, "classifier lock poisoned"))?;
        net.set_input_def(&blob)?;
        let out = net.forward_single_def()?;
        Ok(out.data_typed::<f32>()?.to_vec())
    }
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl EmotionClassifier for FerPlusClassifier {
    fn classify(&self, face: &Frame) -> Result<Classification, ClassifyError> {
        let logits = self
            .infer(face)
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        if logits.len() != FERPLUS_LABELS.len() {
            return Err(ClassifyError::Malformed(format!(
                "expected {} outputs, got {}",
                FERPLUS_LABELS.len(),
                logits.len()
            )));
        }

        let scores = FERPLUS_LABELS
            .iter()
            .map(|l| l.to_string())
            .zip(softmax(&logits))
            .collect();
        Classification::from_scores(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(p[2] > p[1] && p[1] > p[0]);
    }

    #[test]
    fn load_missing_model_errors() {
        assert!(matches!(
            FerPlusClassifier::load("/nonexistent/ferplus.onnx", 64),
            Err(VisionError::ModelLoad { .. })
        ));
    }
}
