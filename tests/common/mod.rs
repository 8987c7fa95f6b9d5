#![allow(dead_code)]

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tunemap::{
    error::{FetchError, LookupError},
    management::FeatureTable,
    spotify::TrackCatalog,
    types::{AudioFeatures, FeatureRow, ListeningEvent, TrackId},
};

/// In-memory catalog answering from fixed tables and recording every call.
#[derive(Default)]
pub struct FakeCatalog {
    pub ids: HashMap<String, String>,
    pub features: HashMap<String, AudioFeatures>,
    pub queries: Vec<String>,
    pub feature_calls: Vec<String>,
}

impl FakeCatalog {
    pub fn with_track(mut self, query: &str, id: &str) -> Self {
        self.ids.insert(query.to_string(), id.to_string());
        self
    }

    pub fn with_features(mut self, id: &str, seed: f64) -> Self {
        self.features.insert(id.to_string(), features(id, seed));
        self
    }
}

impl TrackCatalog for FakeCatalog {
    async fn resolve(&mut self, query: &str) -> Result<TrackId, LookupError> {
        self.queries.push(query.to_string());
        self.ids
            .get(query)
            .map(|id| TrackId(id.clone()))
            .ok_or_else(|| LookupError::NoMatch(query.to_string()))
    }

    async fn fetch_features(&mut self, id: &TrackId) -> Result<AudioFeatures, FetchError> {
        self.feature_calls.push(id.0.clone());
        self.features
            .get(&id.0)
            .cloned()
            .ok_or_else(|| FetchError::Empty(id.0.clone()))
    }
}

pub fn event(title: &str, artist: &str, seconds: f64) -> ListeningEvent {
    ListeningEvent {
        track_name: title.to_string(),
        artist_name: artist.to_string(),
        end_time: NaiveDateTime::parse_from_str("2020-11-02 18:04", "%Y-%m-%d %H:%M").unwrap(),
        sec_played: seconds,
    }
}

pub fn features(id: &str, seed: f64) -> AudioFeatures {
    AudioFeatures {
        danceability: Some((seed * 0.37).fract()),
        energy: Some((seed * 0.61 + 0.1).fract()),
        key: Some((seed * 5.0) % 12.0),
        loudness: Some(-3.0 - (seed * 1.7) % 12.0),
        mode: Some(seed % 2.0),
        speechiness: Some((seed * 0.13).fract() / 4.0),
        acousticness: Some((seed * 0.29 + 0.3).fract()),
        instrumentalness: Some((seed * 0.07).fract() / 10.0),
        liveness: Some((seed * 0.19 + 0.05).fract() / 2.0),
        valence: Some((seed * 0.43 + 0.2).fract()),
        tempo: Some(80.0 + (seed * 17.0) % 90.0),
        kind: "audio_features".to_string(),
        id: id.to_string(),
        uri: format!("spotify:track:{}", id),
        track_href: format!("https://api.spotify.com/v1/tracks/{}", id),
        analysis_url: format!("https://api.spotify.com/v1/audio-analysis/{}", id),
        duration_ms: Some(150_000.0 + (seed * 23_456.0) % 120_000.0),
        time_signature: Some(if seed as u64 % 5 == 0 { 3.0 } else { 4.0 }),
    }
}

pub fn row(title: &str, seed: f64) -> FeatureRow {
    FeatureRow::new(title.to_string(), features(&format!("id{}", seed), seed))
}

pub fn table(n: usize) -> FeatureTable {
    FeatureTable::new(
        (1..=n)
            .map(|i| row(&format!("Track {}", i), i as f64))
            .collect(),
    )
}
