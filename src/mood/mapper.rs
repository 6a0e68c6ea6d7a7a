//! Mood → playback mapping.
//!
//! [`MoodMapper::trigger`] turns a classifier label into a started track:
//!
//! ```text
//! label ──Emotion::parse──▶ Emotion ──MoodTable──▶ candidates
//!       ──ArtistPicker────▶ artist
//!       ──TokenProvider───▶ fresh AccessToken        (every call)
//!       ──search_top_track▶ track id | NoTrackFound
//!       ──start_playback──▶ Started  | PlayFailed
//! ```
//!
//! Selection ([`MoodMapper::select`]) is pure apart from the injected RNG and
//! never touches the network.  Remote failures become a
//! [`PlaybackOutcome`] variant; nothing is retried.

use std::sync::Arc;

use crate::emotion::Emotion;
use crate::spotify::{track_uri, ApiError, AuthError, MusicApi, TokenProvider};

use super::outcome::PlaybackOutcome;
use super::picker::ArtistPicker;
use super::table::MoodTable;

/// Where playback goes and how to authenticate for it.
#[derive(Clone)]
pub struct PlaybackTarget {
    /// Long-lived credential exchanged for an access token on every trigger.
    pub refresh_token: String,
    /// Device that receives the play command, passed verbatim.
    pub device_id: String,
}

impl std::fmt::Debug for PlaybackTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackTarget")
            .field("refresh_token", &"<redacted>")
            .field("device_id", &self.device_id)
            .finish()
    }
}

/// The artist picked for a supported mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub emotion: Emotion,
    pub artist: String,
}

pub struct MoodMapper {
    table: MoodTable,
    picker: ArtistPicker,
    tokens: Arc<dyn TokenProvider>,
    api: Arc<dyn MusicApi>,
    target: PlaybackTarget,
}

impl MoodMapper {
    pub fn new(
        table: MoodTable,
        picker: ArtistPicker,
        tokens: Arc<dyn TokenProvider>,
        api: Arc<dyn MusicApi>,
        target: PlaybackTarget,
    ) -> Self {
        Self {
            table,
            picker,
            tokens,
            api,
            target,
        }
    }

    pub fn table(&self) -> &MoodTable {
        &self.table
    }

    /// Normalise `label` and pick one of its candidate artists.
    ///
    /// `None` when the label is not a known emotion or the emotion has no
    /// candidates.
    pub fn select(&self, label: &str) -> Option<Selection> {
        let emotion = Emotion::parse(label)?;
        let artist = self.picker.choose(self.table.candidates(emotion))?;
        Some(Selection {
            emotion,
            artist: artist.to_string(),
        })
    }

    /// Run one full playback request for `label`.
    pub async fn trigger(&self, label: &str) -> PlaybackOutcome {
        let Some(selection) = self.select(label) else {
            log::info!("mood: no artists for label {label:?}");
            return PlaybackOutcome::UnsupportedMood {
                label: label.trim().to_lowercase(),
            };
        };
        let artist = selection.artist;
        log::info!("mood: {} → {artist}", selection.emotion);

        let token = match self.tokens.refresh(&self.target.refresh_token).await {
            Ok(token) => token,
            Err(AuthError::Timeout) => return PlaybackOutcome::TimedOut,
            Err(e) => {
                log::warn!("mood: token refresh failed: {e}");
                return PlaybackOutcome::AuthFailed(e.to_string());
            }
        };

        let track_id = match self.api.search_top_track(&artist, &token).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                log::warn!("mood: search for {artist:?} returned no tracks");
                return PlaybackOutcome::NoTrackFound { artist };
            }
            Err(ApiError::Timeout) => return PlaybackOutcome::TimedOut,
            Err(e) => {
                log::warn!("mood: search failed: {e}");
                return PlaybackOutcome::SearchFailed { status: e.status() };
            }
        };

        let uri = track_uri(&track_id);
        match self
            .api
            .start_playback(&self.target.device_id, &uri, &token)
            .await
        {
            Ok(()) => {
                log::info!("mood: playing {uri} by {artist}");
                PlaybackOutcome::Started { artist, track_id }
            }
            Err(ApiError::Timeout) => PlaybackOutcome::TimedOut,
            Err(e) => {
                log::warn!("mood: play failed: {e}");
                PlaybackOutcome::PlayFailed { status: e.status() }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
