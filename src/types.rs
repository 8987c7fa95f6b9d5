use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// One entry of an exported `StreamingHistory<N>.json` segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingRecord {
    pub end_time: String,
    pub artist_name: String,
    pub track_name: String,
    pub ms_played: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListeningEvent {
    pub track_name: String,
    pub artist_name: String,
    pub end_time: NaiveDateTime,
    pub sec_played: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub music: Vec<ListeningEvent>,
    pub podcasts: Vec<ListeningEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedTitle {
    pub title: String,
    pub seconds_played: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub String);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub title: String,
    pub id: Option<TrackId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: SearchTracks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTracks {
    pub items: Vec<SearchTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTrack {
    pub id: String,
    pub name: String,
}

/// Payload of `GET /audio-features/{id}`.
///
/// Numeric fields are optional because the service occasionally returns
/// `null` for individual descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub key: Option<f64>,
    pub loudness: Option<f64>,
    pub mode: Option<f64>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub track_href: String,
    #[serde(default)]
    pub analysis_url: String,
    pub duration_ms: Option<f64>,
    pub time_signature: Option<f64>,
}

/// Names of the 13 audio descriptors used for clustering, in column order.
pub const DESCRIPTOR_COLUMNS: [&str; 13] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "duration_ms",
    "time_signature",
];

/// Header of the persisted feature table, matching [`FeatureRow`] field order.
pub const FEATURE_TABLE_COLUMNS: [&str; 19] = [
    "title",
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "type",
    "id",
    "uri",
    "track_href",
    "analysis_url",
    "duration_ms",
    "time_signature",
];

/// One row of the persisted feature table, keyed by track title.
///
/// Field order is the on-disk column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub title: String,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub key: Option<f64>,
    pub loudness: Option<f64>,
    pub mode: Option<f64>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub uri: String,
    pub track_href: String,
    pub analysis_url: String,
    pub duration_ms: Option<f64>,
    pub time_signature: Option<f64>,
}

impl FeatureRow {
    pub fn new(title: String, features: AudioFeatures) -> Self {
        Self {
            title,
            danceability: features.danceability,
            energy: features.energy,
            key: features.key,
            loudness: features.loudness,
            mode: features.mode,
            speechiness: features.speechiness,
            acousticness: features.acousticness,
            instrumentalness: features.instrumentalness,
            liveness: features.liveness,
            valence: features.valence,
            tempo: features.tempo,
            kind: features.kind,
            id: features.id,
            uri: features.uri,
            track_href: features.track_href,
            analysis_url: features.analysis_url,
            duration_ms: features.duration_ms,
            time_signature: features.time_signature,
        }
    }

    /// The 13 descriptors in [`DESCRIPTOR_COLUMNS`] order, or `None` if any
    /// of them is missing or not finite.
    pub fn descriptors(&self) -> Option<[f64; 13]> {
        let values = [
            self.danceability?,
            self.energy?,
            self.key?,
            self.loudness?,
            self.mode?,
            self.speechiness?,
            self.acousticness?,
            self.instrumentalness?,
            self.liveness?,
            self.valence?,
            self.tempo?,
            self.duration_ms?,
            self.time_signature?,
        ];
        values.iter().all(|v| v.is_finite()).then_some(values)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupFailure {
    pub title: String,
    pub query: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub title: String,
    pub id: String,
    pub reason: String,
}

/// Outcome of a resolve and fetch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchReport {
    pub requested: usize,
    pub resolved: usize,
    pub fetched: usize,
    pub skipped_titles: Vec<String>,
    pub lookup_failures: Vec<LookupFailure>,
    pub fetch_failures: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn failure_count(&self) -> usize {
        self.lookup_failures.len() + self.fetch_failures.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMethod {
    Pca,
    Tsne,
}

impl fmt::Display for ProjectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionMethod::Pca => f.write_str("pca"),
            ProjectionMethod::Tsne => f.write_str("tsne"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPoint {
    pub title: String,
    pub x: f64,
    pub y: f64,
    pub label: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub method: ProjectionMethod,
    pub points: Vec<ProjectedPoint>,
    pub centroids: Vec<Centroid>,
    pub inertia: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterReport {
    pub pca: Projection,
    pub tsne: Projection,
    /// Share of variance captured by the two principal components.
    pub explained_variance: [f64; 2],
    pub dropped_rows: usize,
}

/// One line of the projection export consumed by plotting tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    pub method: ProjectionMethod,
    pub title: String,
    pub x: f64,
    pub y: f64,
    pub label: usize,
    pub is_centroid: bool,
}

#[derive(Tabled)]
pub struct TopTrackRow {
    pub rank: usize,
    pub title: String,
    pub minutes: String,
}

#[derive(Tabled)]
pub struct ClusterTableRow {
    pub cluster: usize,
    pub size: usize,
    pub centroid: String,
    pub tracks: String,
}

#[derive(Tabled)]
pub struct FailureTableRow {
    pub stage: String,
    pub track: String,
    pub reason: String,
}
