//! Result of one playback request.

/// Every way a playback request can end.
///
/// None of these are errors from the caller's point of view: failures of the
/// remote service are folded into a variant and shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The track is playing on the target device.
    Started { artist: String, track_id: String },
    /// The label is not a key of the mood table.  No network call was made.
    UnsupportedMood { label: String },
    /// The search for `artist` returned nothing.  Playback was not attempted.
    NoTrackFound { artist: String },
    /// Search call failed.  `status` is `None` when no response arrived.
    SearchFailed { status: Option<u16> },
    /// Play call failed.  `status` is `None` when no response arrived.
    PlayFailed { status: Option<u16> },
    /// Token refresh failed.
    AuthFailed(String),
    /// The whole request exceeded its time budget and was abandoned.
    TimedOut,
}

impl PlaybackOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, PlaybackOutcome::Started { .. })
    }

    /// One-line description for the status bar.
    pub fn summary(&self) -> String {
        fn status_text(status: &Option<u16>) -> String {
            status.map_or_else(|| "no response".to_string(), |s| format!("HTTP {s}"))
        }

        match self {
            PlaybackOutcome::Started { artist, .. } => format!("Now playing: {artist}"),
            PlaybackOutcome::UnsupportedMood { label } => {
                format!("No music mapped for mood \"{label}\"")
            }
            PlaybackOutcome::NoTrackFound { artist } => format!("No track found for {artist}"),
            PlaybackOutcome::SearchFailed { status } => {
                format!("Search failed ({})", status_text(status))
            }
            PlaybackOutcome::PlayFailed { status } => {
                format!("Playback failed ({})", status_text(status))
            }
            PlaybackOutcome::AuthFailed(reason) => format!("Spotify login failed: {reason}"),
            PlaybackOutcome::TimedOut => "Spotify did not answer in time".to_string(),
        }
    }
}

impl std::fmt::Display for PlaybackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
