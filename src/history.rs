//! Streaming-history ingestion.
//!
//! A Spotify data export splits a user's history over several
//! `StreamingHistory<N>.json` segments. Each segment is a JSON array of
//! `{endTime, artistName, trackName, msPlayed}` objects.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::{
    error::HistoryError,
    filters::Filters,
    types::{ListeningEvent, Partition, StreamingRecord},
};

pub const END_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const SEGMENT_PREFIX: &str = "StreamingHistory";
const SEGMENT_SUFFIX: &str = ".json";
const MUSIC_INFIX: &str = "_music_";

/// Finds the history segments in `dir`, ordered by their segment number.
///
/// `StreamingHistory10.json` sorts after `StreamingHistory2.json`.
pub async fn discover_segments(dir: &Path) -> Result<Vec<PathBuf>, HistoryError> {
    let mut segments: Vec<(u32, PathBuf)> = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(number) = segment_number(name) {
            segments.push((number, path));
        }
    }

    segments.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(segments.into_iter().map(|(_, path)| path).collect())
}

/// Segment number of a music history file.
///
/// Accepts `StreamingHistory<N>.json` and the newer
/// `StreamingHistory_music_<N>.json`. Podcast segments
/// (`StreamingHistory_podcast_<N>.json`) use another schema and, like
/// names without a number, are not segments.
fn segment_number(file_name: &str) -> Option<u32> {
    let stem = file_name
        .strip_prefix(SEGMENT_PREFIX)?
        .strip_suffix(SEGMENT_SUFFIX)?;
    let digits = stem.strip_prefix(MUSIC_INFIX).unwrap_or(stem);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Loads all segments and concatenates their events in the given order.
pub async fn load_segments(paths: &[PathBuf]) -> Result<Vec<ListeningEvent>, HistoryError> {
    let mut events = Vec::new();
    for path in paths {
        let content = async_fs::read_to_string(path).await?;
        events.extend(parse_segment(&content)?);
    }
    Ok(events)
}

pub fn parse_segment(content: &str) -> Result<Vec<ListeningEvent>, HistoryError> {
    let records: Vec<StreamingRecord> = serde_json::from_str(content)?;
    records.into_iter().map(to_event).collect()
}

pub fn to_event(record: StreamingRecord) -> Result<ListeningEvent, HistoryError> {
    let end_time = NaiveDateTime::parse_from_str(&record.end_time, END_TIME_FORMAT).map_err(
        |source| HistoryError::Timestamp {
            value: record.end_time.clone(),
            source,
        },
    )?;

    Ok(ListeningEvent {
        track_name: record.track_name,
        artist_name: record.artist_name,
        end_time,
        sec_played: ms_to_seconds(record.ms_played),
    })
}

/// Milliseconds to seconds, rounded half-to-even to one decimal place.
pub fn ms_to_seconds(ms: u64) -> f64 {
    (ms as f64 / 100.0).round_ties_even() / 10.0
}

/// Splits events into music and podcasts.
///
/// Podcast artists land in `podcasts`. Podcast and noise artists are both
/// excluded from `music`, so noise wins for an artist present in both sets.
pub fn partition(events: &[ListeningEvent], filters: &Filters) -> Partition {
    let mut partition = Partition::default();
    for event in events {
        if filters.is_podcast(&event.artist_name) {
            partition.podcasts.push(event.clone());
        }
        if !filters.is_excluded_from_music(&event.artist_name) {
            partition.music.push(event.clone());
        }
    }
    partition
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub events: usize,
    pub music: usize,
    pub podcasts: usize,
    pub distinct_titles: usize,
    pub music_hours: f64,
}

pub fn summarize(events: &[ListeningEvent], partition: &Partition) -> HistorySummary {
    let mut titles: Vec<&str> = partition
        .music
        .iter()
        .map(|e| e.track_name.as_str())
        .collect();
    titles.sort_unstable();
    titles.dedup();

    HistorySummary {
        events: events.len(),
        music: partition.music.len(),
        podcasts: partition.podcasts.len(),
        distinct_titles: titles.len(),
        music_hours: partition.music.iter().map(|e| e.sec_played).sum::<f64>() / 3600.0,
    }
}
