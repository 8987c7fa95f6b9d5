use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::{
    config,
    error::TableError,
    types::{FEATURE_TABLE_COLUMNS, FeatureRow},
};

/// Audio features of the resolved tracks, in resolver order.
///
/// Persisted as CSV with one header row and one row per track; the first
/// column is the track title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    pub fn default_path() -> PathBuf {
        config::data_dir().join("features/features.csv")
    }

    pub fn push(&mut self, row: FeatureRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with all 13 descriptors present, in table order.
    pub fn complete_rows(&self) -> Vec<(&str, [f64; 13])> {
        self.rows
            .iter()
            .filter_map(|row| row.descriptors().map(|d| (row.title.as_str(), d)))
            .collect()
    }

    /// Serializes the table. The header row is written even when the table
    /// has no rows.
    pub fn to_csv(&self) -> Result<Vec<u8>, TableError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(FEATURE_TABLE_COLUMNS)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.into_inner().map_err(|e| TableError::Io(e.into_error()))
    }

    /// Parses a feature table.
    ///
    /// Tables exported with an unnamed index column are accepted; that
    /// column is read as the title.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader.headers()?.clone();
        if headers.get(0).is_some_and(str::is_empty) {
            let renamed: StringRecord = std::iter::once("title")
                .chain(headers.iter().skip(1))
                .collect();
            reader.set_headers(renamed);
        }

        let rows = reader
            .deserialize::<FeatureRow>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub async fn load(path: &Path) -> Result<Self, TableError> {
        let bytes = async_fs::read(path).await?;
        Self::from_csv(&bytes)
    }

    pub async fn persist(&self, path: &Path) -> Result<(), TableError> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        async_fs::write(path, self.to_csv()?).await?;
        Ok(())
    }
}
