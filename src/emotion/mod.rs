//! Emotion labels and the classifier seam.
//!
//! This module provides:
//! * [`Emotion`] — the fixed label set the mood table is keyed by.
//! * [`Classification`] — a dominant label plus per-label scores.
//! * [`EmotionClassifier`] — blocking trait implemented by model backends.
//! * [`FerPlusClassifier`] — FER+ ONNX model run through OpenCV DNN
//!   (`camera` feature).
//! * [`ClassifyError`] — error variants for a single classification.

pub mod classifier;
pub mod label;

#[cfg(feature = "camera")]
pub mod ferplus;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use classifier::{Classification, ClassifyError, EmotionClassifier};
pub use label::Emotion;

#[cfg(feature = "camera")]
pub use ferplus::FerPlusClassifier;

#[cfg(test)]
pub use classifier::MockClassifier;
