//! Spotify Web API integration.
//!
//! This module provides:
//! * [`TokenProvider`] — async trait exchanging the long-lived refresh token
//!   for a short-lived [`AccessToken`].
//! * [`SpotifyTokenProvider`] — refresh-token grant against the accounts
//!   service.
//! * [`MusicApi`] — async trait for the two calls playback needs: top-track
//!   search and start-playback.
//! * [`SpotifyClient`] — `reqwest` implementation of [`MusicApi`], plus
//!   device listing.
//! * [`AuthError`] / [`ApiError`] — error variants for each side.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use mood_player::config::{AppConfig, Credentials};
//! use mood_player::spotify::{track_uri, MusicApi, SpotifyClient, SpotifyTokenProvider, TokenProvider};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::default();
//!     let creds = Credentials::from_env()?;
//!
//!     let tokens = SpotifyTokenProvider::from_config(&creds, &config.playback);
//!     let api = SpotifyClient::from_config(&config.playback);
//!
//!     let token = tokens.refresh(&creds.refresh_token).await?;
//!     if let Some(id) = api.search_top_track("Adele", &token).await? {
//!         api.start_playback("my-device", &track_uri(&id), &token).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
#[cfg(test)]
mod stub;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use auth::{AccessToken, AuthError, SpotifyTokenProvider, TokenProvider};
pub use client::{track_uri, ApiError, Device, MusicApi, SpotifyClient};

#[cfg(test)]
pub use auth::MockTokenProvider;
#[cfg(test)]
pub use client::{ApiCall, MockMusicApi};
