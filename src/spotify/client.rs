//! Core `MusicApi` trait and `SpotifyClient` implementation.
//!
//! `SpotifyClient` talks to the Spotify Web API under
//! [`PlaybackConfig::api_base_url`].  Every call takes the access token
//! explicitly so nothing token-related is cached on the client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::PlaybackConfig;

use super::auth::AccessToken;

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors that can occur during a Web API call.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Non-2xx response.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// HTTP transport or connection error.
    #[error("request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The response body was not the expected JSON.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    /// HTTP status of a rejected call; `None` when no response arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// MusicApi trait
// ---------------------------------------------------------------------------

/// The two remote operations a playback request needs.
#[async_trait]
pub trait MusicApi: Send + Sync {
    /// Id of the top track for `artist`, or `None` when the search is empty.
    async fn search_top_track(
        &self,
        artist: &str,
        token: &AccessToken,
    ) -> Result<Option<String>, ApiError>;

    /// Start playing `track_uri` on `device_id`.
    async fn start_playback(
        &self,
        device_id: &str,
        track_uri: &str,
        token: &AccessToken,
    ) -> Result<(), ApiError>;
}

/// Playback URI for a track id.
///
/// ```
/// assert_eq!(mood_player::spotify::track_uri("T123"), "spotify:track:T123");
/// ```
pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{track_id}")
}

// ---------------------------------------------------------------------------
// MockMusicApi  (test-only)
// ---------------------------------------------------------------------------

/// One call received by [`MockMusicApi`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Search { artist: String, token: String },
    Play { device_id: String, track_uri: String, token: String },
}

/// Scripted [`MusicApi`] that records every call.
#[cfg(test)]
pub struct MockMusicApi {
    search: Result<Option<String>, ApiError>,
    play: Result<(), ApiError>,
    delay: Option<Duration>,
    calls: std::sync::Mutex<Vec<ApiCall>>,
}

#[cfg(test)]
impl MockMusicApi {
    /// Search finds `track_id` and playback succeeds.
    pub fn finds(track_id: &str) -> Self {
        Self::scripted(Ok(Some(track_id.to_string())), Ok(()))
    }

    pub fn scripted(search: Result<Option<String>, ApiError>, play: Result<(), ApiError>) -> Self {
        Self {
            search,
            play,
            delay: None,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Sleep this long inside every call before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn play_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ApiCall::Play { .. }))
            .collect()
    }

    async fn pause(&self) {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
    }
}

#[cfg(test)]
#[async_trait]
impl MusicApi for MockMusicApi {
    async fn search_top_track(
        &self,
        artist: &str,
        token: &AccessToken,
    ) -> Result<Option<String>, ApiError> {
        self.calls.lock().unwrap().push(ApiCall::Search {
            artist: artist.to_string(),
            token: token.secret().to_string(),
        });
        self.pause().await;
        self.search.clone()
    }

    async fn start_playback(
        &self,
        device_id: &str,
        track_uri: &str,
        token: &AccessToken,
    ) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(ApiCall::Play {
            device_id: device_id.to_string(),
            track_uri: track_uri.to_string(),
            token: token.secret().to_string(),
        });
        self.pause().await;
        self.play.clone()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<Device>,
}

/// A playback device registered on the account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Device {
    /// `None` for restricted devices that cannot be targeted.
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub is_active: bool,
}

fn parse_search_response(body: &str) -> Result<Option<String>, ApiError> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(parsed
        .tracks
        .and_then(|page| page.items.into_iter().next())
        .map(|item| item.id))
}

fn parse_devices_response(body: &str) -> Result<Vec<Device>, ApiError> {
    let parsed: DevicesResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(parsed.devices)
}

/// Map a non-2xx response to [`ApiError::Http`], passing 2xx through.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Http {
        status: status.as_u16(),
        body,
    })
}

// ---------------------------------------------------------------------------
// SpotifyClient
// ---------------------------------------------------------------------------

/// `reqwest`-backed Spotify Web API client.
pub struct SpotifyClient {
    client: reqwest::Client,
    base_url: String,
}

impl SpotifyClient {
    /// Build a client from playback settings.
    ///
    /// The HTTP client is pre-configured with `config.timeout_secs` as the
    /// per-request timeout.
    pub fn from_config(config: &PlaybackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Devices currently available for playback on the account.
    pub async fn list_devices(&self, token: &AccessToken) -> Result<Vec<Device>, ApiError> {
        let response = self
            .client
            .get(self.url("me/player/devices"))
            .bearer_auth(token.secret())
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        parse_devices_response(&body)
    }
}

#[async_trait]
impl MusicApi for SpotifyClient {
    async fn search_top_track(
        &self,
        artist: &str,
        token: &AccessToken,
    ) -> Result<Option<String>, ApiError> {
        let query = format!("artist:{artist}");
        let response = self
            .client
            .get(self.url("search"))
            .bearer_auth(token.secret())
            .query(&[("q", query.as_str()), ("type", "track"), ("limit", "1")])
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        parse_search_response(&body)
    }

    async fn start_playback(
        &self,
        device_id: &str,
        track_uri: &str,
        token: &AccessToken,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({ "uris": [track_uri] });
        let response = self
            .client
            .put(self.url("me/player/play"))
            .bearer_auth(token.secret())
            .query(&[("device_id", device_id)])
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::stub::StubServer;

    // --- search parsing ---

    #[test]
    fn search_takes_first_item() {
        let body = r#"{"tracks":{"href":"x","items":[{"id":"T123","name":"Levitating"},{"id":"T999"}],"total":2}}"#;
        assert_eq!(parse_search_response(body).unwrap(), Some("T123".into()));
    }

    #[test]
    fn search_with_no_items_is_none() {
        let body = r#"{"tracks":{"items":[],"total":0}}"#;
        assert_eq!(parse_search_response(body).unwrap(), None);
    }

    #[test]
    fn search_without_tracks_key_is_none() {
        assert_eq!(parse_search_response("{}").unwrap(), None);
    }

    #[test]
    fn search_garbage_is_parse_error() {
        assert!(matches!(
            parse_search_response("<html>"),
            Err(ApiError::Parse(_))
        ));
    }

    // --- devices parsing ---

    #[test]
    fn devices_are_parsed() {
        let body = r#"{"devices":[
            {"id":"abc","is_active":true,"name":"Laptop","type":"Computer","volume_percent":50},
            {"id":null,"is_active":false,"name":"TV","type":"TV"}
        ]}"#;
        let devices = parse_devices_response(body).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id.as_deref(), Some("abc"));
        assert_eq!(devices[0].kind, "Computer");
        assert!(devices[0].is_active);
        assert!(devices[1].id.is_none());
    }

    // --- helpers ---

    #[test]
    fn track_uri_format() {
        assert_eq!(track_uri("T123"), "spotify:track:T123");
    }

    #[test]
    fn api_error_status() {
        let e = ApiError::Http {
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(e.status(), Some(404));
        assert_eq!(ApiError::Timeout.status(), None);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let mut config = PlaybackConfig::default();
        config.api_base_url = "http://localhost:9000/v1/".into();
        let client = SpotifyClient::from_config(&config);
        assert_eq!(client.url("search"), "http://localhost:9000/v1/search");
    }

    // --- wire format ---

    fn client_for(stub: &StubServer) -> SpotifyClient {
        let mut config = PlaybackConfig::default();
        config.api_base_url = format!("{}/v1", stub.url);
        SpotifyClient::from_config(&config)
    }

    fn token() -> AccessToken {
        AccessToken::new("tok", Duration::from_secs(60))
    }

    #[tokio::test]
    async fn search_requests_single_track_for_artist() {
        let stub = StubServer::respond(200, r#"{"tracks":{"items":[{"id":"T123"}]}}"#).await;
        let client = client_for(&stub);

        let found = client.search_top_track("Dua Lipa", &token()).await.unwrap();
        assert_eq!(found.as_deref(), Some("T123"));

        let req = stub.request().await;
        assert_eq!(req.method, "GET");
        assert_eq!(
            req.target,
            "/v1/search?q=artist%3ADua+Lipa&type=track&limit=1"
        );
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn empty_search_is_none() {
        let stub = StubServer::respond(200, r#"{"tracks":{"items":[],"total":0}}"#).await;
        let client = client_for(&stub);
        assert_eq!(client.search_top_track("Adele", &token()).await.unwrap(), None);
        stub.request().await;
    }

    #[tokio::test]
    async fn search_error_status_is_http_error() {
        let stub = StubServer::respond(503, r#"{"error":{"status":503}}"#).await;
        let client = client_for(&stub);
        let err = client.search_top_track("Adele", &token()).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        stub.request().await;
    }

    #[tokio::test]
    async fn play_puts_track_uri_to_device() {
        let stub = StubServer::respond(204, "").await;
        let client = client_for(&stub);

        client
            .start_playback("device-42", "spotify:track:T123", &token())
            .await
            .unwrap();

        let req = stub.request().await;
        assert_eq!(req.method, "PUT");
        assert_eq!(req.target, "/v1/me/player/play?device_id=device-42");
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
        assert_eq!(body, serde_json::json!({ "uris": ["spotify:track:T123"] }));
    }

    #[tokio::test]
    async fn play_accepts_any_2xx() {
        let stub = StubServer::respond(202, "{}").await;
        let client = client_for(&stub);
        assert!(client
            .start_playback("d", "spotify:track:T1", &token())
            .await
            .is_ok());
        stub.request().await;
    }

    #[tokio::test]
    async fn play_404_is_http_error() {
        let stub = StubServer::respond(404, r#"{"error":{"status":404,"message":"Device not found"}}"#).await;
        let client = client_for(&stub);

        let err = client
            .start_playback("gone", "spotify:track:T1", &token())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 404, ref body } if body.contains("Device not found")));
        stub.request().await;
    }

    #[tokio::test]
    async fn list_devices_hits_player_devices() {
        let stub = StubServer::respond(200, r#"{"devices":[{"id":"abc","name":"Laptop","type":"Computer"}]}"#).await;
        let client = client_for(&stub);

        let devices = client.list_devices(&token()).await.unwrap();
        assert_eq!(devices[0].name, "Laptop");

        let req = stub.request().await;
        assert_eq!((req.method.as_str(), req.target.as_str()), ("GET", "/v1/me/player/devices"));
    }

    #[test]
    fn client_is_object_safe() {
        let api: Box<dyn MusicApi> = Box::new(SpotifyClient::from_config(&PlaybackConfig::default()));
        drop(api);
    }
}
