//! Configuration management for tunemap.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults for endpoints and pacing
//!
//! Credentials have no defaults. A missing credential is an
//! [`AuthError::MissingConfig`], which aborts any command that talks to Spotify.

use std::{env, path::PathBuf, time::Duration};

use crate::error::AuthError;

const DEFAULT_SCOPE: &str = "user-library-read";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_INTERVAL_MS: u64 = 100;

/// Root of everything tunemap stores locally.
///
/// - Linux: `~/.local/share/tunemap`
/// - macOS: `~/Library/Application Support/tunemap`
/// - Windows: `%LOCALAPPDATA%/tunemap`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tunemap");
    path
}

/// Loads environment variables from `<data_dir>/.env`.
///
/// Creates the data directory if needed. A missing `.env` file is fine since
/// the variables may already be exported in the shell; a file that exists but
/// cannot be parsed is reported as an error.
///
/// # Example
///
/// ```
/// use tunemap::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn required(name: &str) -> Result<String, AuthError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AuthError::MissingConfig(name.to_string())),
    }
}

fn with_default(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn number_or(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Address the local OAuth callback server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    with_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Client id of the registered Spotify application (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, AuthError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Client secret of the registered Spotify application
/// (`SPOTIFY_API_AUTH_CLIENT_SECRET`). Never log this value.
pub fn spotify_client_secret() -> Result<String, AuthError> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Redirect URI registered with the Spotify application (`SPOTIFY_API_REDIRECT_URI`).
pub fn spotify_redirect_uri() -> Result<String, AuthError> {
    required("SPOTIFY_API_REDIRECT_URI")
}

/// Permission scope requested during authorization (`SPOTIFY_API_AUTH_SCOPE`).
pub fn spotify_scope() -> String {
    with_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    with_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apiurl() -> String {
    with_default("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    with_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Upper bound for a single remote call (`TUNEMAP_REQUEST_TIMEOUT_SECS`).
pub fn request_timeout() -> Duration {
    Duration::from_secs(number_or(
        "TUNEMAP_REQUEST_TIMEOUT_SECS",
        DEFAULT_TIMEOUT_SECS,
    ))
}

/// Minimum gap between two remote calls (`TUNEMAP_REQUEST_INTERVAL_MS`).
pub fn request_interval() -> Duration {
    Duration::from_millis(number_or("TUNEMAP_REQUEST_INTERVAL_MS", DEFAULT_INTERVAL_MS))
}
