use std::path::PathBuf;

use tabled::Table;

use crate::{
    analysis::{self, ClusterSettings},
    error, info,
    management::{FeatureTable, projections},
    success,
    types::{ClusterTableRow, Projection},
    utils, warning,
};

const SAMPLE_TITLES: usize = 3;

pub async fn cluster(input: Option<PathBuf>, output: Option<PathBuf>, settings: ClusterSettings) {
    let path = input.unwrap_or_else(FeatureTable::default_path);
    let table = match FeatureTable::load(&path).await {
        Ok(table) => table,
        Err(e) => error!(
            "Cannot load feature table from {}. Run tunemap fetch first.\n Error: {}",
            path.display(),
            e
        ),
    };
    info!("Loaded {} tracks from {}", table.len(), path.display());

    let pb = utils::progress_bar(settings.tsne_iterations as u64, "Embedding with t-SNE...");
    let worker_pb = pb.clone();
    let result =
        tokio::task::spawn_blocking(move || analysis::run_pipeline(&table, &settings, &worker_pb))
            .await;
    pb.finish_and_clear();

    let report = match result {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => error!("Clustering failed: {}", e),
        Err(e) => error!("Clustering task panicked: {}", e),
    };

    if report.dropped_rows > 0 {
        warning!(
            "Dropped {} tracks with missing audio features.",
            report.dropped_rows
        );
    }

    info!(
        "PCA explains {:.1}% + {:.1}% of the variance.",
        report.explained_variance[0] * 100.0,
        report.explained_variance[1] * 100.0
    );
    print_projection("k-Means Clustering via PCA", &report.pca);
    print_projection("k-Means Clustering via t-SNE Reduction", &report.tsne);

    let out = output.unwrap_or_else(projections::default_path);
    match projections::persist(&report, &out).await {
        Ok(_) => success!("Projections written to {}", out.display()),
        Err(e) => error!("Cannot write projections to {}: {}", out.display(), e),
    }
}

fn print_projection(title: &str, projection: &Projection) {
    let rows: Vec<ClusterTableRow> = projection
        .centroids
        .iter()
        .enumerate()
        .map(|(label, centroid)| {
            let members: Vec<&str> = projection
                .points
                .iter()
                .filter(|p| p.label == label)
                .map(|p| p.title.as_str())
                .collect();
            ClusterTableRow {
                cluster: label,
                size: members.len(),
                centroid: format!("({:.2}, {:.2})", centroid.x, centroid.y),
                tracks: members
                    .iter()
                    .take(SAMPLE_TITLES)
                    .map(|t| utils::truncate(t, 30))
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })
        .collect();

    println!("{}\n{}\n", title, Table::new(rows));
}
