//! Core `EmotionClassifier` trait and the `Classification` result type.
//!
//! # Overview
//!
//! [`EmotionClassifier`] is the interface used by the classification
//! dispatcher.  It is blocking, object-safe and `Send + Sync` so one instance
//! can sit behind an `Arc<dyn EmotionClassifier>` and be called from many
//! `spawn_blocking` tasks at once.
//!
//! [`MockClassifier`] (available under `#[cfg(test)]`) returns a
//! pre-configured response without loading any model.

use thiserror::Error;

use crate::vision::Frame;

use super::label::Emotion;

// ---------------------------------------------------------------------------
// ClassifyError
// ---------------------------------------------------------------------------

/// All errors that can arise from a single classification.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    /// The model could not be loaded.
    #[error("emotion model unavailable: {0}")]
    ModelUnavailable(String),

    /// Inference failed inside the backend.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The backend produced something that is not a usable result.
    #[error("malformed classification: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// A dominant label plus the score of every label the model knows.
///
/// Labels are kept in the classifier's own vocabulary; mapping onto
/// [`Emotion`] happens through [`Emotion::parse`].  Scores are probabilities
/// (summing to roughly 1.0) when produced by [`Classification::from_scores`].
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub scores: Vec<(String, f32)>,
}

impl Classification {
    /// Build a result from raw per-label scores, picking the highest score as
    /// the dominant label.
    ///
    /// # Errors
    ///
    /// [`ClassifyError::Malformed`] when `scores` is empty or contains a
    /// non-finite or negative value.
    pub fn from_scores(scores: Vec<(String, f32)>) -> Result<Self, ClassifyError> {
        let label = scores
            .iter()
            .filter(|(_, s)| s.is_finite())
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(l, _)| l.clone())
            .ok_or_else(|| ClassifyError::Malformed("no scores".into()))?;
        Self { label, scores }.validated()
    }

    /// Check the invariants the rest of the pipeline relies on.
    ///
    /// # Errors
    ///
    /// [`ClassifyError::Malformed`] for a blank label or any non-finite or
    /// negative score.
    pub fn validated(self) -> Result<Self, ClassifyError> {
        if self.label.trim().is_empty() {
            return Err(ClassifyError::Malformed("empty label".into()));
        }
        if let Some((l, s)) = self.scores.iter().find(|(_, s)| !s.is_finite() || *s < 0.0) {
            return Err(ClassifyError::Malformed(format!("score {s} for {l:?}")));
        }
        Ok(self)
    }

    /// The dominant label normalised onto [`Emotion`], if it is one.
    pub fn emotion(&self) -> Option<Emotion> {
        Emotion::parse(&self.label)
    }

    /// Every label except the dominant one, highest score first.
    pub fn others(&self) -> Vec<(&str, f32)> {
        let mut rest: Vec<(&str, f32)> = self
            .scores
            .iter()
            .filter(|(l, _)| *l != self.label)
            .map(|(l, s)| (l.as_str(), *s))
            .collect();
        rest.sort_by(|a, b| b.1.total_cmp(&a.1));
        rest
    }
}

// ---------------------------------------------------------------------------
// EmotionClassifier trait
// ---------------------------------------------------------------------------

/// Blocking, thread-safe interface for emotion models.
///
/// `face` is the cropped face region, RGB8.  Implementations may take tens
/// to hundreds of milliseconds; callers run them off the render thread.
pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, face: &Frame) -> Result<Classification, ClassifyError>;
}

// Compile-time assertion: Box<dyn EmotionClassifier> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn EmotionClassifier>) {}
};

// ---------------------------------------------------------------------------
// MockClassifier  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response for every face.
#[cfg(test)]
pub struct MockClassifier {
    response: Result<Classification, ClassifyError>,
}

#[cfg(test)]
impl MockClassifier {
    /// Always classify as `label` with full confidence.
    pub fn ok(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            response: Ok(Classification {
                scores: vec![(label.clone(), 1.0)],
                label,
            }),
        }
    }

    /// Always answer with `classification`, unchecked.
    pub fn returning(classification: Classification) -> Self {
        Self {
            response: Ok(classification),
        }
    }

    /// Always fail with `error`.
    pub fn err(error: ClassifyError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
impl EmotionClassifier for MockClassifier {
    fn classify(&self, _face: &Frame) -> Result<Classification, ClassifyError> {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
