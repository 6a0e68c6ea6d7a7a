//! Print the playback devices registered on the Spotify account, so the
//! right `DEVICE_ID` can be put into `.env`.

use mood_player::{
    config::{load_dotenv, AppConfig, Credentials},
    spotify::{SpotifyClient, SpotifyTokenProvider, TokenProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    load_dotenv();
    let credentials = Credentials::from_env()?;
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    let tokens = SpotifyTokenProvider::from_config(&credentials, &config.playback);
    let api = SpotifyClient::from_config(&config.playback);

    let token = tokens.refresh(&credentials.refresh_token).await?;
    let devices = api.list_devices(&token).await?;

    if devices.is_empty() {
        println!("No devices found. Open Spotify on the target device and try again.");
    }
    for device in devices {
        let id = device.id.as_deref().unwrap_or("<restricted>");
        println!("Device ID: {id}, Device Name: {}", device.name);
    }
    Ok(())
}
