//! Audio-feature collection.

use indicatif::ProgressBar;

use crate::{
    management::FeatureTable,
    spotify::TrackCatalog,
    types::{FeatureRow, FetchFailure, FetchReport, TrackRecord},
    warning,
};

/// Fetches features for every resolved track, keyed by the track's title.
///
/// Tracks without an id are passed over. A failed fetch is logged, recorded
/// in `report` and produces no row.
pub async fn fetch_all<C: TrackCatalog>(
    catalog: &mut C,
    tracks: &[TrackRecord],
    report: &mut FetchReport,
    pb: &ProgressBar,
) -> FeatureTable {
    let mut table = FeatureTable::default();

    for track in tracks {
        let Some(id) = &track.id else {
            continue;
        };

        pb.set_message(format!("Fetching features for {}", track.title));

        match catalog.fetch_features(id).await {
            Ok(features) => {
                table.push(FeatureRow::new(track.title.clone(), features));
                report.fetched += 1;
            }
            Err(e) => {
                pb.suspend(|| warning!("Can't get features for URI: {} ({})", id, e));
                report.fetch_failures.push(FetchFailure {
                    title: track.title.clone(),
                    id: id.to_string(),
                    reason: e.to_string(),
                });
            }
        }
        pb.inc(1);
    }

    table
}
