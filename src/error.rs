//! Error types for every stage of the pipeline.
//!
//! Authentication failures are fatal for a run. Lookup and fetch failures are
//! recorded in a [`crate::types::FetchReport`] and the run continues.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing configuration value {0}")]
    MissingConfig(String),

    #[error("no stored token, run `tunemap auth` first: {0}")]
    NoToken(String),

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token response is missing field `{0}`")]
    Malformed(&'static str),

    #[error("authorization was not completed in time")]
    TimedOut,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no search results for `{0}`")]
    NoMatch(String),

    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed search response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("audio-features request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no audio features available for {0}")]
    Empty(String),

    #[error("malformed audio-features response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("cannot read history segment: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse history segment: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid endTime `{value}`: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("cannot read filter configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse filter configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("feature table I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("feature table is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("need at least {needed} complete rows to form {needed} clusters, got {got}")]
    TooFewRows { needed: usize, got: usize },

    #[error("invalid clustering settings: {0}")]
    Config(String),
}
