use std::path::{Path, PathBuf};

use tabled::Table;

use crate::{
    cli::{load_filters, load_history},
    error, fetcher, history, info,
    management::{FeatureTable, ReportManager},
    resolver,
    spotify::{Session, SpotifyCatalog},
    success,
    types::{FailureTableRow, FetchReport},
    utils, warning,
};

pub async fn fetch(dir: &Path, limit: usize, output: Option<PathBuf>, filters: Option<PathBuf>) {
    let filters = load_filters(filters).await;
    let events = load_history(dir).await;
    let partition = history::partition(&events, &filters);
    let ranked = resolver::rank_titles(&partition.music, limit);
    info!(
        "Resolving the {} most played of {} music plays.",
        ranked.len(),
        partition.music.len()
    );

    let session = match Session::open().await {
        Ok(session) => session,
        Err(e) => error!(
            "Failed to open Spotify session. Please run tunemap auth\n Error: {}",
            e
        ),
    };
    let mut catalog = SpotifyCatalog::new(session);
    let mut report = FetchReport::default();

    let pb = utils::progress_bar(ranked.len() as u64, "Resolving titles...");
    let tracks = resolver::resolve_all(&mut catalog, &ranked, &filters, &mut report, &pb).await;
    pb.finish_and_clear();
    info!("Resolved {} of {} titles.", report.resolved, report.requested);

    let pb = utils::progress_bar(report.resolved as u64, "Fetching audio features...");
    let table = fetcher::fetch_all(&mut catalog, &tracks, &mut report, &pb).await;
    pb.finish_and_clear();

    let path = output.unwrap_or_else(FeatureTable::default_path);
    if let Err(e) = table.persist(&path).await {
        error!("Cannot write feature table to {}: {}", path.display(), e);
    }

    let report_path = ReportManager::path_for(&path);
    if let Err(e) = ReportManager::new(report.clone()).persist(&report_path).await {
        warning!("Cannot write fetch report to {}: {}", report_path.display(), e);
    }

    print_failures(&report);
    success!(
        "Stored features for {} tracks in {} ({} failures, {} skipped).",
        table.len(),
        path.display(),
        report.failure_count(),
        report.skipped_titles.len()
    );
}

fn print_failures(report: &FetchReport) {
    if report.failure_count() == 0 {
        return;
    }

    let lookups = report.lookup_failures.iter().map(|f| FailureTableRow {
        stage: "search".to_string(),
        track: utils::truncate(&f.title, 50),
        reason: f.reason.clone(),
    });
    let fetches = report.fetch_failures.iter().map(|f| FailureTableRow {
        stage: "features".to_string(),
        track: utils::truncate(&f.title, 50),
        reason: f.reason.clone(),
    });

    let rows: Vec<FailureTableRow> = lookups.chain(fetches).collect();
    println!("{}", Table::new(rows));
}
