//! # CLI Module
//!
//! User-facing commands. Each command wires the library stages together and
//! owns the user interaction: progress bars, tables and fatal error exits.
//!
//! ```text
//! tunemap auth      Spotify authorization, stores the token
//! tunemap history   listening summary and most played titles
//! tunemap fetch     history ─▶ resolve ─▶ audio features ─▶ features.csv
//! tunemap cluster   features.csv ─▶ PCA / t-SNE ─▶ k-means ─▶ projections.csv
//! ```
//!
//! `fetch` is slow and rate limited, `cluster` is fast and repeatable; the
//! persisted feature table decouples the two.

mod auth;
mod cluster;
mod fetch;
mod history;

pub use auth::auth;
pub use cluster::cluster;
pub use fetch::fetch;
pub use history::history;

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    error, error::FilterError, filters::Filters, history as loader, info,
    types::ListeningEvent, utils, warning,
};

/// Loads the filter configuration. A missing default file means "no
/// filters"; a missing file that was asked for explicitly is fatal.
async fn load_filters(path: Option<PathBuf>) -> Filters {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(Filters::default_path);

    match Filters::load(&path).await {
        Ok(filters) => filters,
        Err(FilterError::Io(e)) if e.kind() == ErrorKind::NotFound && !explicit => {
            warning!(
                "No filter configuration at {}, all plays count as music.",
                path.display()
            );
            Filters::default()
        }
        Err(e) => error!("Cannot load filters from {}: {}", path.display(), e),
    }
}

async fn load_history(dir: &Path) -> Vec<ListeningEvent> {
    let segments = match loader::discover_segments(dir).await {
        Ok(segments) if !segments.is_empty() => segments,
        Ok(_) => error!(
            "No StreamingHistory<N>.json files found in {}",
            dir.display()
        ),
        Err(e) => error!("Cannot read {}: {}", dir.display(), e),
    };

    let pb = utils::spinner(&format!("Loading {} history segments...", segments.len()));
    let result = loader::load_segments(&segments).await;
    pb.finish_and_clear();

    match result {
        Ok(events) => {
            info!(
                "Loaded {} plays from {} history segments.",
                events.len(),
                segments.len()
            );
            events
        }
        Err(e) => error!("Cannot load listening history: {}", e),
    }
}
