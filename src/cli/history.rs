use std::path::{Path, PathBuf};

use tabled::Table;

use crate::{
    cli::{load_filters, load_history},
    history as loader, info,
    resolver::rank_titles,
    types::TopTrackRow,
    utils, warning,
};

pub async fn history(dir: &Path, top: usize, filters: Option<PathBuf>) {
    let filters = load_filters(filters).await;
    let events = load_history(dir).await;
    let partition = loader::partition(&events, &filters);
    let summary = loader::summarize(&events, &partition);

    info!(
        "{events} events: {music} music, {podcasts} podcast, {noise} other",
        events = summary.events,
        music = summary.music,
        podcasts = summary.podcasts,
        noise = summary.events - summary.music - summary.podcasts,
    );
    info!(
        "{titles} distinct titles, {hours:.1} hours of music",
        titles = summary.distinct_titles,
        hours = summary.music_hours,
    );

    let ranked = rank_titles(&partition.music, top);
    if ranked.is_empty() {
        warning!("No music plays left after filtering.");
        return;
    }

    let rows: Vec<TopTrackRow> = ranked
        .into_iter()
        .enumerate()
        .map(|(pos, entry)| TopTrackRow {
            rank: pos + 1,
            title: utils::truncate(&entry.title, 60),
            minutes: utils::format_minutes(entry.seconds_played),
        })
        .collect();

    println!("{}", Table::new(rows));
}
