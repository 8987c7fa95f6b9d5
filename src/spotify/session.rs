use std::time::Duration;

use reqwest::Client;

use crate::{config, error::AuthError, management::TokenManager};

/// An authenticated handle to the Spotify Web API.
///
/// Acquired once per run and handed to the catalog; dropping it ends the
/// session.
pub struct Session {
    tokens: TokenManager,
    http: Client,
    api_url: String,
}

impl Session {
    /// Opens a session from the token stored by `tunemap auth`.
    pub async fn open() -> Result<Self, AuthError> {
        // credentials are needed for refreshing, check them up front
        config::spotify_client_id()?;
        config::spotify_client_secret()?;

        let tokens = TokenManager::load().await.map_err(AuthError::NoToken)?;
        Self::with_tokens(tokens, config::spotify_apiurl(), config::request_timeout())
    }

    pub fn with_tokens(
        tokens: TokenManager,
        api_url: String,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            tokens,
            http,
            api_url,
        })
    }

    pub async fn bearer(&mut self) -> String {
        self.tokens.get_valid_token().await
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}
