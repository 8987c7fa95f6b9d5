mod common;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use common::FakeCatalog;
use indicatif::ProgressBar;
use serde_json::json;
use tunemap::{
    error::{FetchError, LookupError},
    fetcher::fetch_all,
    management::TokenManager,
    spotify::{Session, SpotifyCatalog, TrackCatalog, parse_features, parse_search},
    types::{FetchReport, Token, TrackId, TrackRecord},
};

/// Requests seen by the local API stand-in, as raw query strings or paths.
#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<String>>>,
}

impl Seen {
    fn count(&self, needle: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.contains(needle))
            .count()
    }
}

async fn search(
    State(seen): State<Seen>,
    RawQuery(raw): RawQuery,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    seen.requests.lock().unwrap().push(raw.unwrap_or_default());
    match params.get("q").map(String::as_str) {
        Some("Rate Limited") => StatusCode::TOO_MANY_REQUESTS.into_response(),
        Some("Server Error") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => Json(json!({
            "tracks": { "items": [ { "id": "id-hello", "name": "Hello, Goodbye" } ] }
        }))
        .into_response(),
    }
}

async fn audio_features(State(seen): State<Seen>, Path(id): Path<String>) -> Response {
    seen.requests
        .lock()
        .unwrap()
        .push(format!("/audio-features/{}", id));
    match id.as_str() {
        "id-hello" => Json(json!({
            "danceability": 0.5, "energy": 0.6, "key": 2, "loudness": -6.1,
            "mode": 1, "speechiness": 0.03, "acousticness": 0.2,
            "instrumentalness": 0.0, "liveness": 0.1, "valence": 0.9,
            "tempo": 120.0, "type": "audio_features", "id": "id-hello",
            "duration_ms": 180000, "time_signature": 4
        }))
        .into_response(),
        "id-null" => Json(serde_json::Value::Null).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn local_catalog(interval: Duration) -> (SpotifyCatalog, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/search", get(search))
        .route("/audio-features/{id}", get(audio_features))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let token = Token {
        access_token: "test-access".to_string(),
        refresh_token: "test-refresh".to_string(),
        scope: "user-library-read".to_string(),
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    };
    let session = Session::with_tokens(
        TokenManager::new(token),
        format!("http://{}", addr),
        Duration::from_secs(5),
    )
    .unwrap();

    (SpotifyCatalog::with_interval(session, interval), seen)
}

fn track(title: &str, id: Option<&str>) -> TrackRecord {
    TrackRecord {
        title: title.to_string(),
        id: id.map(|id| TrackId(id.to_string())),
    }
}

#[tokio::test]
async fn test_fetch_all_keys_rows_by_title() {
    let mut catalog = FakeCatalog::default()
        .with_features("id-kyoto", 1.0)
        .with_features("id-garden", 2.0);
    let mut report = FetchReport::default();

    let table = fetch_all(
        &mut catalog,
        &[track("Kyoto", Some("id-kyoto")), track("Garden Song", Some("id-garden"))],
        &mut report,
        &ProgressBar::hidden(),
    )
    .await;

    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].title, "Kyoto");
    assert_eq!(table.rows()[0].id, "id-kyoto");
    assert_eq!(table.rows()[1].title, "Garden Song");
    assert_eq!(report.fetched, 2);
}

#[tokio::test]
async fn test_fetch_all_skips_unresolved_and_failed_tracks() {
    let mut catalog = FakeCatalog::default()
        .with_features("id-kyoto", 1.0)
        .with_features("id-motion", 3.0);
    let mut report = FetchReport::default();

    let table = fetch_all(
        &mut catalog,
        &[
            track("Kyoto", Some("id-kyoto")),
            track("Unknown", None),
            track("Gone", Some("id-gone")),
            track("Motion Sickness", Some("id-motion")),
        ],
        &mut report,
        &ProgressBar::hidden(),
    )
    .await;

    assert_eq!(catalog.feature_calls, vec!["id-kyoto", "id-gone", "id-motion"]);
    let titles: Vec<&str> = table.rows().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Kyoto", "Motion Sickness"]);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.fetch_failures.len(), 1);
    assert_eq!(report.fetch_failures[0].title, "Gone");
    assert_eq!(report.fetch_failures[0].id, "id-gone");
    assert_eq!(report.failure_count(), 1);
}

#[test]
fn test_parse_search_takes_first_item() {
    let body = r#"{"tracks":{"items":[
        {"id":"4uLU6hMCjMI75M1A2tKUQC","name":"Kyoto"},
        {"id":"other","name":"Kyoto (Live)"}
    ]}}"#;
    let id = parse_search("Kyoto", body).unwrap();
    assert_eq!(id, TrackId("4uLU6hMCjMI75M1A2tKUQC".to_string()));
}

#[test]
fn test_parse_search_no_items_is_no_match() {
    let body = r#"{"tracks":{"items":[]}}"#;
    assert!(matches!(
        parse_search("Nothing", body),
        Err(LookupError::NoMatch(q)) if q == "Nothing"
    ));
}

#[test]
fn test_parse_search_malformed_body() {
    assert!(matches!(
        parse_search("Kyoto", r#"{"error":{"status":401}}"#),
        Err(LookupError::Malformed(_))
    ));
}

#[test]
fn test_parse_features_reads_payload() {
    let body = r#"{
        "danceability": 0.735, "energy": 0.578, "key": 5, "loudness": -11.84,
        "mode": 0, "speechiness": 0.0461, "acousticness": 0.514,
        "instrumentalness": 0.0902, "liveness": 0.159, "valence": 0.636,
        "tempo": 98.002, "type": "audio_features", "id": "abc",
        "uri": "spotify:track:abc",
        "track_href": "https://api.spotify.com/v1/tracks/abc",
        "analysis_url": "https://api.spotify.com/v1/audio-analysis/abc",
        "duration_ms": 255349, "time_signature": 4
    }"#;
    let features = parse_features(&TrackId("abc".to_string()), body).unwrap();

    assert_eq!(features.key, Some(5.0));
    assert_eq!(features.duration_ms, Some(255349.0));
    assert_eq!(features.kind, "audio_features");
}

#[test]
fn test_parse_features_null_is_empty() {
    let id = TrackId("abc".to_string());
    assert!(matches!(
        parse_features(&id, "null"),
        Err(FetchError::Empty(ref missing)) if missing == "abc"
    ));
}

#[tokio::test]
async fn test_spotify_catalog_encodes_search_query() {
    let (mut catalog, seen) = local_catalog(Duration::ZERO).await;

    let id = catalog.resolve("Hello, Goodbye").await.unwrap();

    assert_eq!(id, TrackId("id-hello".to_string()));
    assert_eq!(seen.count("q=Hello%2C%20Goodbye&type=track&limit=1"), 1);
}

#[tokio::test]
async fn test_spotify_catalog_paces_calls() {
    let interval = Duration::from_millis(200);
    let (mut catalog, seen) = local_catalog(interval).await;

    let start = Instant::now();
    catalog.resolve("First").await.unwrap();
    catalog.resolve("Second").await.unwrap();
    catalog
        .fetch_features(&TrackId("id-hello".to_string()))
        .await
        .unwrap();

    assert!(start.elapsed() >= interval * 2);
    assert_eq!(seen.requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_spotify_catalog_does_not_retry_rate_limit() {
    let (mut catalog, seen) = local_catalog(Duration::ZERO).await;

    let limited = catalog.resolve("Rate Limited").await;
    let failed = catalog.resolve("Server Error").await;

    assert!(matches!(limited, Err(LookupError::Request(_))));
    assert!(matches!(failed, Err(LookupError::Request(_))));
    assert_eq!(seen.count("q=Rate%20Limited"), 1);
    assert_eq!(seen.count("q=Server%20Error"), 1);
}

#[tokio::test]
async fn test_spotify_catalog_features_status_handling() {
    let (mut catalog, seen) = local_catalog(Duration::ZERO).await;

    let features = catalog
        .fetch_features(&TrackId("id-hello".to_string()))
        .await
        .unwrap();
    let missing = catalog
        .fetch_features(&TrackId("id-unknown".to_string()))
        .await;
    let empty = catalog
        .fetch_features(&TrackId("id-null".to_string()))
        .await;

    assert_eq!(features.tempo, Some(120.0));
    assert_eq!(features.uri, "");
    assert!(matches!(missing, Err(FetchError::Request(_))));
    assert!(matches!(empty, Err(FetchError::Empty(ref id)) if id == "id-null"));
    assert_eq!(seen.count("/audio-features/id-unknown"), 1);
}

#[tokio::test]
async fn test_fetch_all_records_http_failures() {
    let (mut catalog, _) = local_catalog(Duration::ZERO).await;
    let mut report = FetchReport::default();

    let table = fetch_all(
        &mut catalog,
        &[track("Hello, Goodbye", Some("id-hello")), track("Gone", Some("id-gone"))],
        &mut report,
        &ProgressBar::hidden(),
    )
    .await;

    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].title, "Hello, Goodbye");
    assert_eq!(report.fetch_failures.len(), 1);
    assert_eq!(report.fetch_failures[0].id, "id-gone");
}
