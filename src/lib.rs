//! Webcam mood detection that starts a mood-matched track on Spotify.
//!
//! See [`pipeline`] for how frames, classification and playback fit
//! together.  OpenCV-backed capture, face detection and the emotion model
//! are behind the `camera` feature.

pub mod app;
pub mod config;
pub mod emotion;
pub mod mood;
pub mod pipeline;
pub mod spotify;
pub mod vision;
