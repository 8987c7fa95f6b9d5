mod common;

use common::{row, table};
use indicatif::ProgressBar;
use ndarray::{Array2, Axis, array};
use tunemap::{
    analysis::{
        ClusterSettings, DEFAULT_CLUSTERS, KMeans, Pca, Tsne, run_pipeline, standardize,
        symmetric_eigen,
    },
    error::ClusterError,
    management::{FeatureTable, projections},
    types::ProjectionMethod,
};

fn fast_settings() -> ClusterSettings {
    ClusterSettings {
        tsne_iterations: 300,
        ..ClusterSettings::default()
    }
}

#[test]
fn test_standardize_zero_mean_unit_variance() {
    let data = array![[1.0, 10.0, 5.0], [2.0, 20.0, 5.0], [3.0, 60.0, 5.0], [6.0, 30.0, 5.0]];
    let scaled = standardize(&data);

    for (c, column) in scaled.axis_iter(Axis(1)).enumerate() {
        let mean = column.sum() / 4.0;
        let variance = column.mapv(|v| (v - mean) * (v - mean)).sum() / 4.0;
        assert!(mean.abs() < 1e-12, "column {} mean {}", c, mean);
        if c < 2 {
            assert!((variance - 1.0).abs() < 1e-12, "column {} var {}", c, variance);
        } else {
            // constant column is only centered
            assert!(variance.abs() < 1e-12);
        }
    }
}

#[test]
fn test_symmetric_eigen_known_matrix() {
    let (values, vectors) = symmetric_eigen(array![[2.0, 1.0], [1.0, 2.0]]);

    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    assert!((sorted[0] - 1.0).abs() < 1e-10);
    assert!((sorted[1] - 3.0).abs() < 1e-10);

    let a = array![[2.0, 1.0], [1.0, 2.0]];
    for (i, &lambda) in values.iter().enumerate() {
        let v = vectors.column(i);
        let av = a.dot(&v);
        for k in 0..2 {
            assert!((av[k] - lambda * v[k]).abs() < 1e-10);
        }
    }
}

#[test]
fn test_pca_on_points_along_a_line() {
    let data = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
    let (pca, projected) = Pca::fit_transform(&data, 2);

    assert!((pca.explained_variance_ratio[0] - 1.0).abs() < 1e-10);
    assert!(pca.explained_variance_ratio[1].abs() < 1e-10);
    // positive loadings, so the first coordinate grows along the line
    assert!(pca.components[[0, 0]] > 0.0);
    assert!(projected[[0, 0]] < projected[[3, 0]]);
    for value in projected.column(1) {
        assert!(value.abs() < 1e-10);
    }
}

#[test]
fn test_kmeans_separates_blobs() {
    let data = array![
        [0.0, 0.0],
        [0.1, 0.2],
        [0.2, 0.1],
        [10.0, 10.0],
        [10.1, 9.9],
        [9.9, 10.2],
        [-10.0, 10.0],
        [-9.8, 10.1],
    ];
    let fit = KMeans::new(3).with_seed(7).fit(&data).unwrap();

    assert_eq!(fit.labels[0], fit.labels[1]);
    assert_eq!(fit.labels[1], fit.labels[2]);
    assert_eq!(fit.labels[3], fit.labels[4]);
    assert_eq!(fit.labels[4], fit.labels[5]);
    assert_eq!(fit.labels[6], fit.labels[7]);
    assert_ne!(fit.labels[0], fit.labels[3]);
    assert_ne!(fit.labels[0], fit.labels[6]);
    assert_ne!(fit.labels[3], fit.labels[6]);
    assert_eq!(fit.centroids.nrows(), 3);
    assert!(fit.inertia < 1.0);
}

#[test]
fn test_kmeans_rejects_too_few_rows() {
    let data = Array2::<f64>::zeros((3, 2));
    assert!(matches!(
        KMeans::new(7).fit(&data),
        Err(ClusterError::TooFewRows { needed: 7, got: 3 })
    ));
}

#[test]
fn test_tsne_is_deterministic() {
    let data = standardize(&array![
        [0.0, 1.0, 2.0],
        [1.0, 0.0, 3.0],
        [5.0, 5.0, 5.0],
        [6.0, 5.5, 4.0],
        [0.5, 0.5, 2.5],
        [5.5, 6.0, 4.5],
    ]);
    let tsne = Tsne {
        n_iter: 200,
        ..Tsne::default()
    };

    let first = tsne.fit_transform(&data, &ProgressBar::hidden()).unwrap();
    let second = tsne.fit_transform(&data, &ProgressBar::hidden()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.dim(), (6, 2));
    assert!(first.iter().all(|v| v.is_finite()));
}

#[test]
fn test_tsne_perplexity_shrinks_for_small_inputs() {
    let tsne = Tsne::default();
    assert_eq!(tsne.effective_perplexity(10), 3.0);
    assert_eq!(tsne.effective_perplexity(2), 1.0);
    assert_eq!(tsne.effective_perplexity(500), 30.0);
}

#[test]
fn test_pipeline_ten_rows() {
    let report = run_pipeline(&table(10), &ClusterSettings::default(), &ProgressBar::hidden())
        .unwrap();

    for (projection, method) in [
        (&report.pca, ProjectionMethod::Pca),
        (&report.tsne, ProjectionMethod::Tsne),
    ] {
        assert_eq!(projection.method, method);
        assert_eq!(projection.points.len(), 10);
        assert_eq!(projection.centroids.len(), DEFAULT_CLUSTERS);
        assert!(projection.points.iter().all(|p| p.label < DEFAULT_CLUSTERS));
        for (i, point) in projection.points.iter().enumerate() {
            assert_eq!(point.title, format!("Track {}", i + 1));
        }
    }
    assert_eq!(report.dropped_rows, 0);
    assert!(report.explained_variance[0] >= report.explained_variance[1]);
}

#[test]
fn test_pipeline_is_deterministic() {
    let table = table(25);
    let first = run_pipeline(&table, &fast_settings(), &ProgressBar::hidden()).unwrap();
    let second = run_pipeline(&table, &fast_settings(), &ProgressBar::hidden()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_pipeline_drops_incomplete_rows() {
    let mut rows: Vec<_> = (1..=12).map(|i| row(&format!("Track {}", i), i as f64)).collect();
    rows[3].energy = None;
    rows[8].duration_ms = None;

    let report = run_pipeline(
        &FeatureTable::new(rows),
        &fast_settings(),
        &ProgressBar::hidden(),
    )
    .unwrap();

    assert_eq!(report.dropped_rows, 2);
    assert_eq!(report.pca.points.len(), 10);
    assert!(report.pca.points.iter().all(|p| p.title != "Track 4"));
}

#[test]
fn test_pipeline_needs_enough_rows() {
    let result = run_pipeline(&table(5), &ClusterSettings::default(), &ProgressBar::hidden());
    assert!(matches!(
        result,
        Err(ClusterError::TooFewRows { needed: 7, got: 5 })
    ));
}

#[test]
fn test_pipeline_rejects_zero_clusters() {
    let settings = ClusterSettings {
        clusters: 0,
        ..ClusterSettings::default()
    };
    assert!(matches!(
        run_pipeline(&table(10), &settings, &ProgressBar::hidden()),
        Err(ClusterError::Config(_))
    ));
}

#[tokio::test]
async fn test_projection_records_and_export() {
    let report = run_pipeline(&table(10), &fast_settings(), &ProgressBar::hidden()).unwrap();

    let records = projections::records(&report);
    assert_eq!(records.len(), 2 * (10 + DEFAULT_CLUSTERS));
    assert_eq!(records.iter().filter(|r| r.is_centroid).count(), 2 * DEFAULT_CLUSTERS);
    assert_eq!(records[10].title, "centroid 0");
    assert_eq!(records[17].method, ProjectionMethod::Tsne);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clusters/projections.csv");
    projections::persist(&report, &path).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("method,title,x,y,label,is_centroid"));
    assert_eq!(lines.count(), records.len());
}
