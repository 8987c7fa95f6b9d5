use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{error, spotify, success, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    match spotify::auth::auth(shared_state).await {
        Ok(token) => success!("Authentication successful! Granted scope: {}", token.scope),
        Err(e) => error!("Authentication failed: {}", e),
    }
}
