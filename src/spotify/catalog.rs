use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::{
    config,
    error::{FetchError, LookupError},
    spotify::Session,
    types::{AudioFeatures, SearchResponse, TrackId},
};

/// The remote track catalog, reduced to the two calls the pipeline needs.
#[allow(async_fn_in_trait)]
pub trait TrackCatalog {
    /// Best-match track id for a search query.
    async fn resolve(&mut self, query: &str) -> Result<TrackId, LookupError>;

    /// Audio descriptors for a single track id.
    async fn fetch_features(&mut self, id: &TrackId) -> Result<AudioFeatures, FetchError>;
}

/// [`TrackCatalog`] backed by the Spotify Web API.
///
/// Calls go out one at a time with at least `interval` between them. Each
/// call is bounded by the session's request timeout and is never retried.
pub struct SpotifyCatalog {
    session: Session,
    interval: Duration,
    last_call: Option<Instant>,
}

impl SpotifyCatalog {
    pub fn new(session: Session) -> Self {
        Self::with_interval(session, config::request_interval())
    }

    pub fn with_interval(session: Session, interval: Duration) -> Self {
        Self {
            session,
            interval,
            last_call: None,
        }
    }

    async fn pace(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }

    async fn get(&mut self, url: &str) -> Result<String, reqwest::Error> {
        self.pace().await;
        let token = self.session.bearer().await;
        self.session
            .http()
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl TrackCatalog for SpotifyCatalog {
    async fn resolve(&mut self, query: &str) -> Result<TrackId, LookupError> {
        let api_url = format!(
            "{uri}/search?q={q}&type=track&limit=1",
            uri = self.session.api_url(),
            q = urlencoding::encode(query),
        );

        let body = self.get(&api_url).await?;
        parse_search(query, &body)
    }

    async fn fetch_features(&mut self, id: &TrackId) -> Result<AudioFeatures, FetchError> {
        let api_url = format!(
            "{uri}/audio-features/{id}",
            uri = self.session.api_url(),
            id = urlencoding::encode(&id.0),
        );

        let body = self.get(&api_url).await?;
        parse_features(id, &body)
    }
}

/// Picks the first search hit out of a `/search` response body.
pub fn parse_search(query: &str, body: &str) -> Result<TrackId, LookupError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    response
        .tracks
        .items
        .into_iter()
        .next()
        .map(|track| TrackId(track.id))
        .ok_or_else(|| LookupError::NoMatch(query.to_string()))
}

/// Decodes an `/audio-features/{id}` response body; `null` means no data.
pub fn parse_features(id: &TrackId, body: &str) -> Result<AudioFeatures, FetchError> {
    let features: Option<AudioFeatures> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    features.ok_or_else(|| FetchError::Empty(id.to_string()))
}
