use std::{sync::Arc, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config,
    error::AuthError,
    info,
    management::TokenManager,
    server::start_api_server,
    types::{PkceToken, Token},
    utils, warning,
};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires_in: Option<u64>,
}

/// Runs the authorization-code flow with PKCE and persists the token.
///
/// Starts the local callback server, opens the consent page in the browser
/// and waits up to 60 seconds for Spotify to redirect back. The handshake is
/// one-shot: any failure is returned and nothing is retried.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tokio::sync::Mutex;
///
/// let shared_state = Arc::new(Mutex::new(None));
/// let token = auth(shared_state).await?;
/// ```
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Result<Token, AuthError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = authorize_url(
        &config::spotify_apiauth_url(),
        &config::spotify_client_id()?,
        &config::spotify_redirect_uri()?,
        &config::spotify_scope(),
        &code_challenge,
    );
    // fail before opening the browser if the exchange cannot succeed
    config::spotify_client_secret()?;

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    // store verifier before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    } else {
        info!("Waiting for authorization in the browser...");
    }

    let token = wait_for_token(shared_state)
        .await
        .ok_or(AuthError::TimedOut)?;

    TokenManager::new(token.clone())
        .persist()
        .await
        .map_err(AuthError::NoToken)?;

    Ok(token)
}

/// Builds the consent URL the user is sent to.
pub fn authorize_url(
    base: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    code_challenge: &str,
) -> String {
    format!(
        "{base}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}",
        base = base,
        client_id = urlencoding::encode(client_id),
        redirect_uri = urlencoding::encode(redirect_uri),
        code_challenge = code_challenge,
        scope = urlencoding::encode(scope),
    )
}

async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

fn basic_credentials() -> Result<String, AuthError> {
    let pair = format!(
        "{}:{}",
        config::spotify_client_id()?,
        config::spotify_client_secret()?
    );
    Ok(format!("Basic {}", STANDARD.encode(pair.as_bytes())))
}

/// Exchanges an authorization code plus the PKCE verifier for a token.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token, AuthError> {
    let redirect_uri = config::spotify_redirect_uri()?;

    let res = Client::new()
        .post(config::spotify_apitoken_url())
        .header("Authorization", basic_credentials()?)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json: TokenResponse = res.json().await?;
    into_token(json, None)
}

/// Exchanges a refresh token for a fresh access token.
///
/// Spotify may omit the refresh token in the response; the previous one is
/// kept in that case.
pub async fn refresh_token(refresh_token: &str) -> Result<Token, AuthError> {
    let res = Client::new()
        .post(config::spotify_apitoken_url())
        .header("Authorization", basic_credentials()?)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json: TokenResponse = res.json().await?;
    into_token(json, Some(refresh_token))
}

fn into_token(json: TokenResponse, previous_refresh: Option<&str>) -> Result<Token, AuthError> {
    let refresh_token = json
        .refresh_token
        .or_else(|| previous_refresh.map(str::to_string))
        .ok_or(AuthError::Malformed("refresh_token"))?;

    Ok(Token {
        access_token: json
            .access_token
            .ok_or(AuthError::Malformed("access_token"))?,
        refresh_token,
        scope: json.scope.unwrap_or_default(),
        expires_in: json.expires_in.unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}
