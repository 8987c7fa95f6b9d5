//! Artist allow/deny lists and title overrides.
//!
//! Loaded once at startup from `filters.json` and never mutated afterwards.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{config, error::FilterError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Artists whose plays are podcast episodes.
    pub podcast_artists: HashSet<String>,
    /// Artists whose plays are background noise, excluded from music.
    pub noise_artists: HashSet<String>,
    /// Titles that search poorly, mapped to a better search query.
    pub difficult_titles: HashMap<String, String>,
    /// Titles that are never found remotely and are skipped without a search.
    pub unsearchable_titles: HashSet<String>,
}

impl Filters {
    pub fn default_path() -> PathBuf {
        config::data_dir().join("filters.json")
    }

    pub async fn load(path: &Path) -> Result<Self, FilterError> {
        let content = async_fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn is_podcast(&self, artist: &str) -> bool {
        self.podcast_artists.contains(artist)
    }

    /// True for artists that never count as music: podcasts and noise.
    pub fn is_excluded_from_music(&self, artist: &str) -> bool {
        self.podcast_artists.contains(artist) || self.noise_artists.contains(artist)
    }

    pub fn is_unsearchable(&self, title: &str) -> bool {
        self.unsearchable_titles.contains(title)
    }

    /// The query to send for `title`: its override if one is configured,
    /// otherwise the title itself.
    pub fn search_query<'a>(&'a self, title: &'a str) -> &'a str {
        self.difficult_titles
            .get(title)
            .map(String::as_str)
            .unwrap_or(title)
    }
}
