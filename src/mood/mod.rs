//! Mood → music mapping.
//!
//! This module provides:
//! * [`MoodTable`] — emotion → candidate artists, loaded from settings.
//! * [`ArtistPicker`] — uniform random choice with an injectable RNG.
//! * [`MoodMapper`] — label → artist → token → search → play.
//! * [`PlaybackOutcome`] — how one playback request ended.

pub mod mapper;
pub mod outcome;
pub mod picker;
pub mod table;

pub use mapper::{MoodMapper, PlaybackTarget, Selection};
pub use outcome::PlaybackOutcome;
pub use picker::ArtistPicker;
pub use table::MoodTable;
