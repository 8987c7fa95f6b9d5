use std::path::{Path, PathBuf};

use crate::{
    config,
    error::TableError,
    types::{ClusterReport, Projection, ProjectionRecord},
};

/// Flattens a [`ClusterReport`] into rows for plotting tools.
///
/// Member points come first, followed by the centroids of the same method,
/// marked with `is_centroid` and titled `centroid <label>`.
pub fn records(report: &ClusterReport) -> Vec<ProjectionRecord> {
    let mut records = Vec::new();
    for projection in [&report.pca, &report.tsne] {
        push_projection(&mut records, projection);
    }
    records
}

fn push_projection(records: &mut Vec<ProjectionRecord>, projection: &Projection) {
    records.extend(projection.points.iter().map(|p| ProjectionRecord {
        method: projection.method,
        title: p.title.clone(),
        x: p.x,
        y: p.y,
        label: p.label,
        is_centroid: false,
    }));
    records.extend(
        projection
            .centroids
            .iter()
            .enumerate()
            .map(|(label, c)| ProjectionRecord {
                method: projection.method,
                title: format!("centroid {}", label),
                x: c.x,
                y: c.y,
                label,
                is_centroid: true,
            }),
    );
}

pub fn default_path() -> PathBuf {
    config::data_dir().join("clusters/projections.csv")
}

pub async fn persist(report: &ClusterReport, path: &Path) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records(report) {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TableError::Io(e.into_error()))?;

    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }
    async_fs::write(path, bytes).await?;
    Ok(())
}
