use axum::response::Json;
use serde_json::{Value, json};

use crate::management::TokenManager;

/// Liveness check for the callback server. `token_cached` tells whether a
/// previous `tunemap auth` left a token on disk.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "token_cached": TokenManager::token_path().exists(),
    }))
}
