//! # Clustering pipeline
//!
//! Turns a feature table into two complementary 2-D views of the listening
//! history, each partitioned by k-means:
//!
//! ```text
//! FeatureTable ─▶ drop incomplete rows ─▶ standardize ─┬─▶ PCA ──▶ k-means
//!                                                      └─▶ t-SNE ─▶ k-means
//! ```
//!
//! PCA keeps global linear structure, t-SNE keeps local neighborhoods. The
//! two projections are not comparable with each other; both carry their own
//! labels and centroids. Row order is preserved end to end, so point `i` of
//! either projection is row `i` of the retained table.

mod kmeans;
mod pca;
mod scale;
mod tsne;

pub use kmeans::{KMeans, KMeansFit};
pub use pca::{Pca, symmetric_eigen};
pub use scale::standardize;
pub use tsne::Tsne;

use indicatif::ProgressBar;
use ndarray::Array2;

use crate::{
    error::ClusterError,
    management::FeatureTable,
    types::{Centroid, ClusterReport, ProjectedPoint, Projection, ProjectionMethod},
};

pub const DEFAULT_CLUSTERS: usize = 7;

#[derive(Debug, Clone)]
pub struct ClusterSettings {
    pub clusters: usize,
    pub seed: u64,
    pub perplexity: f64,
    pub tsne_iterations: usize,
    pub kmeans_restarts: usize,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS,
            seed: 0,
            perplexity: 30.0,
            tsne_iterations: 1000,
            kmeans_restarts: 10,
        }
    }
}

/// Runs the whole pipeline on `table`.
///
/// `pb` tracks the t-SNE iterations, the only slow step.
pub fn run_pipeline(
    table: &FeatureTable,
    settings: &ClusterSettings,
    pb: &ProgressBar,
) -> Result<ClusterReport, ClusterError> {
    if settings.clusters == 0 {
        return Err(ClusterError::Config(
            "cluster count must be at least 1".to_string(),
        ));
    }

    let complete = table.complete_rows();
    let dropped_rows = table.len() - complete.len();
    if complete.len() < settings.clusters.max(2) {
        return Err(ClusterError::TooFewRows {
            needed: settings.clusters.max(2),
            got: complete.len(),
        });
    }

    let titles: Vec<String> = complete.iter().map(|(t, _)| t.to_string()).collect();
    let flat: Vec<f64> = complete.iter().flat_map(|(_, d)| d.iter().copied()).collect();
    let features = Array2::from_shape_vec((complete.len(), 13), flat)
        .map_err(|e| ClusterError::Config(e.to_string()))?;

    let standardized = standardize(&features);

    let (pca, pca_coords) = Pca::fit_transform(&standardized, 2);
    let tsne = Tsne {
        perplexity: settings.perplexity,
        n_iter: settings.tsne_iterations,
        seed: settings.seed,
        ..Tsne::default()
    };
    let tsne_coords = tsne.fit_transform(&standardized, pb)?;

    let kmeans = KMeans::new(settings.clusters)
        .with_seed(settings.seed)
        .with_restarts(settings.kmeans_restarts);

    let explained_variance = [
        pca.explained_variance_ratio.first().copied().unwrap_or(0.0),
        pca.explained_variance_ratio.get(1).copied().unwrap_or(0.0),
    ];

    Ok(ClusterReport {
        pca: project(ProjectionMethod::Pca, &titles, &pca_coords, &kmeans)?,
        tsne: project(ProjectionMethod::Tsne, &titles, &tsne_coords, &kmeans)?,
        explained_variance,
        dropped_rows,
    })
}

/// Clusters 2-D coordinates and attaches labels to titles by position.
fn project(
    method: ProjectionMethod,
    titles: &[String],
    coords: &Array2<f64>,
    kmeans: &KMeans,
) -> Result<Projection, ClusterError> {
    let fit = kmeans.fit(coords)?;

    let points = titles
        .iter()
        .zip(coords.outer_iter())
        .zip(fit.labels.iter())
        .map(|((title, xy), &label)| ProjectedPoint {
            title: title.clone(),
            x: xy[0],
            y: xy[1],
            label,
        })
        .collect();

    let centroids = fit
        .centroids
        .outer_iter()
        .map(|c| Centroid { x: c[0], y: c[1] })
        .collect();

    Ok(Projection {
        method,
        points,
        centroids,
        inertia: fit.inertia,
    })
}
