//! Spotify credentials and the target device, read from the environment.
//!
//! Keys are looked up once at startup.  A missing or blank key is fatal:
//! callers get a [`ConfigError`] and the process exits before any window
//! opens.  A `.env` file in the working directory is merged into the
//! environment first by [`load_dotenv`].

use thiserror::Error;

/// Errors raised while reading startup configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment key {0} is missing or empty")]
    MissingKey(&'static str),
}

/// Merge `.env` from the working directory into the process environment.
///
/// Returns `true` when a file was loaded.  Existing variables win over the
/// file.  A missing file is not an error.
pub fn load_dotenv() -> bool {
    match dotenvy::dotenv() {
        Ok(path) => {
            log::info!("config: loaded {}", path.display());
            true
        }
        Err(e) if e.not_found() => false,
        Err(e) => {
            log::warn!("config: ignoring unreadable .env: {e}");
            false
        }
    }
}

/// Fetch `key` through `lookup`, treating blank values as missing.
pub fn require_key<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingKey(key))
}

/// OAuth client credentials plus the long-lived refresh token.
///
/// `REDIRECT_URI` must be set as well but is not kept: only the external
/// authorisation flow uses it.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Credentials {
    pub const CLIENT_ID: &'static str = "CLIENT_ID";
    pub const CLIENT_SECRET: &'static str = "CLIENT_SECRET";
    pub const REDIRECT_URI: &'static str = "REDIRECT_URI";
    pub const REFRESH_TOKEN: &'static str = "SPOTIPY_REFRESH_TOKEN";
    pub const DEVICE_ID: &'static str = "DEVICE_ID";

    /// Read all credential keys from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Read all credential keys through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = require_key(&lookup, Self::CLIENT_ID)?;
        let client_secret = require_key(&lookup, Self::CLIENT_SECRET)?;
        require_key(&lookup, Self::REDIRECT_URI)?;
        Ok(Self {
            client_id,
            client_secret,
            refresh_token: require_key(&lookup, Self::REFRESH_TOKEN)?,
        })
    }

    /// The playback target device id from the process environment.
    pub fn device_id_from_env() -> Result<String, ConfigError> {
        require_key(&|k: &str| std::env::var(k).ok(), Self::DEVICE_ID)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CLIENT_ID", "cid"),
            ("CLIENT_SECRET", "csecret"),
            ("REDIRECT_URI", "http://localhost:8888/callback"),
            ("SPOTIPY_REFRESH_TOKEN", "rtoken"),
        ]
    }

    #[test]
    fn all_keys_present() {
        let creds = Credentials::from_lookup(env(&full_env())).unwrap();
        assert_eq!(creds.client_id, "cid");
        assert_eq!(creds.client_secret, "csecret");
        assert_eq!(creds.refresh_token, "rtoken");
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let mut pairs = full_env();
        pairs.retain(|(k, _)| *k != "CLIENT_SECRET");
        let err = Credentials::from_lookup(env(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::MissingKey("CLIENT_SECRET"));
        assert!(err.to_string().contains("CLIENT_SECRET"));
    }

    #[test]
    fn redirect_uri_is_still_required() {
        let mut pairs = full_env();
        pairs.retain(|(k, _)| *k != "REDIRECT_URI");
        assert_eq!(
            Credentials::from_lookup(env(&pairs)).unwrap_err(),
            ConfigError::MissingKey("REDIRECT_URI")
        );
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut pairs = full_env();
        pairs[3] = ("SPOTIPY_REFRESH_TOKEN", "   ");
        let err = Credentials::from_lookup(env(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::MissingKey("SPOTIPY_REFRESH_TOKEN"));
    }

    #[test]
    fn values_are_trimmed() {
        let lookup = env(&[("DEVICE_ID", "  dev-1\n")]);
        assert_eq!(require_key(&lookup, "DEVICE_ID").unwrap(), "dev-1");
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::from_lookup(env(&full_env())).unwrap();
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("csecret"));
        assert!(!dbg.contains("rtoken"));
        assert!(dbg.contains("cid"));
    }
}
