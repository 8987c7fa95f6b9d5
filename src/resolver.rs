//! Title ranking and title to track id resolution.

use std::collections::HashMap;

use indicatif::ProgressBar;

use crate::{
    filters::Filters,
    spotify::TrackCatalog,
    types::{FetchReport, ListeningEvent, LookupFailure, RankedTitle, TrackRecord},
    warning,
};

/// Default number of distinct titles sent to the catalog.
pub const DEFAULT_TITLE_CAP: usize = 1500;

/// Groups plays by title and returns the `cap` most listened titles.
///
/// Titles are ordered by total seconds played, descending. Ties keep the
/// order in which titles were first encountered.
pub fn rank_titles(music: &[ListeningEvent], cap: usize) -> Vec<RankedTitle> {
    let mut ranked: Vec<RankedTitle> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for event in music {
        match positions.get(event.track_name.as_str()) {
            Some(&pos) => ranked[pos].seconds_played += event.sec_played,
            None => {
                positions.insert(event.track_name.as_str(), ranked.len());
                ranked.push(RankedTitle {
                    title: event.track_name.clone(),
                    seconds_played: event.sec_played,
                });
            }
        }
    }

    // sort_by is stable, equal totals stay in encounter order
    ranked.sort_by(|a, b| b.seconds_played.total_cmp(&a.seconds_played));
    ranked.truncate(cap);
    ranked
}

/// Resolves every ranked title to a track id with a single search each.
///
/// Unsearchable titles are skipped without a remote call. A failed search is
/// logged, recorded in `report` and leaves the track without an id.
pub async fn resolve_all<C: TrackCatalog>(
    catalog: &mut C,
    ranked: &[RankedTitle],
    filters: &Filters,
    report: &mut FetchReport,
    pb: &ProgressBar,
) -> Vec<TrackRecord> {
    report.requested = ranked.len();
    let mut tracks = Vec::with_capacity(ranked.len());

    for (pos, entry) in ranked.iter().enumerate() {
        pb.set_message(format!(
            "Resolving {title} ({count}/{total})",
            title = entry.title,
            count = pos + 1,
            total = ranked.len()
        ));

        if filters.is_unsearchable(&entry.title) {
            report.skipped_titles.push(entry.title.clone());
            tracks.push(TrackRecord {
                title: entry.title.clone(),
                id: None,
            });
            pb.inc(1);
            continue;
        }

        let query = filters.search_query(&entry.title);
        let id = match catalog.resolve(query).await {
            Ok(id) => {
                report.resolved += 1;
                Some(id)
            }
            Err(e) => {
                pb.suspend(|| warning!("Something went wrong with {}: {}", entry.title, e));
                report.lookup_failures.push(LookupFailure {
                    title: entry.title.clone(),
                    query: query.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        };

        tracks.push(TrackRecord {
            title: entry.title.clone(),
            id,
        });
        pb.inc(1);
    }

    tracks
}
