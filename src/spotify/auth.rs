//! Access-token refresh.
//!
//! The OAuth authorisation-code flow that produces the long-lived refresh
//! token happens outside this program; here we only run the
//! `refresh_token` grant.  No token is cached: callers ask for a fresh one
//! on every playback request.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{Credentials, PlaybackConfig};

// ---------------------------------------------------------------------------
// AuthError
// ---------------------------------------------------------------------------

/// Errors that can occur while refreshing an access token.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// HTTP transport or connection error.
    #[error("token request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("token request timed out")]
    Timeout,

    /// The accounts service refused the refresh token or client credentials.
    #[error("token refresh rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("failed to parse token response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AccessToken
// ---------------------------------------------------------------------------

/// Longest lifetime an [`AccessToken`] is trusted for, whatever the server
/// claims.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// A short-lived bearer token and the instant it stops being valid.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: Instant,
}

impl AccessToken {
    /// `lifetime` is capped at [`MAX_TOKEN_LIFETIME`].
    pub fn new(secret: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            expires_at: Instant::now() + lifetime.min(MAX_TOKEN_LIFETIME),
        }
    }

    /// The bearer value for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TokenProvider trait
// ---------------------------------------------------------------------------

/// Exchanges a long-lived refresh token for an [`AccessToken`].
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError>;
}

// ---------------------------------------------------------------------------
// MockTokenProvider  (test-only)
// ---------------------------------------------------------------------------

/// Hands out `token-1`, `token-2`, ... and records the refresh tokens it was
/// given.  Optionally fails every call.
#[cfg(test)]
pub struct MockTokenProvider {
    calls: std::sync::Mutex<Vec<String>>,
    failure: Option<AuthError>,
}

#[cfg(test)]
impl MockTokenProvider {
    pub fn new() -> Self {
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            failure: None,
        }
    }

    pub fn failing(error: AuthError) -> Self {
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    /// Refresh tokens received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl TokenProvider for MockTokenProvider {
    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(refresh_token.to_string());
            calls.len()
        };
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(AccessToken::new(format!("token-{n}"), Duration::from_secs(3600))),
        }
    }
}

// ---------------------------------------------------------------------------
// SpotifyTokenProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Runs the `refresh_token` grant against the Spotify accounts service.
pub struct SpotifyTokenProvider {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl SpotifyTokenProvider {
    /// Build a provider from the client credentials and playback settings.
    ///
    /// The HTTP client carries `config.timeout_secs` as its per-request
    /// timeout.
    pub fn from_config(credentials: &Credentials, config: &PlaybackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            token_url: config.accounts_url.clone(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
        }
    }
}

/// Turn a token endpoint body into an [`AccessToken`].
fn parse_token_response(body: &str) -> Result<AccessToken, AuthError> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|e| AuthError::Parse(e.to_string()))?;
    if parsed.access_token.is_empty() {
        return Err(AuthError::Parse("empty access_token".into()));
    }
    Ok(AccessToken::new(
        parsed.access_token,
        Duration::from_secs(parsed.expires_in),
    ))
}

#[async_trait]
impl TokenProvider for SpotifyTokenProvider {
    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token = parse_token_response(&body)?;
        log::debug!("auth: access token refreshed");
        Ok(token)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
