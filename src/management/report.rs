use std::path::{Path, PathBuf};

use crate::{error::TableError, types::FetchReport};

const REPORT_FILE: &str = "fetch-report.json";

pub struct ReportManager {
    report: FetchReport,
}

impl ReportManager {
    pub fn new(report: FetchReport) -> Self {
        Self { report }
    }

    /// The report lives next to the feature table it describes.
    pub fn path_for(table_path: &Path) -> PathBuf {
        table_path
            .parent()
            .map(|dir| dir.join(REPORT_FILE))
            .unwrap_or_else(|| PathBuf::from(REPORT_FILE))
    }

    pub async fn load(path: &Path) -> Result<Self, TableError> {
        let content = async_fs::read_to_string(path).await?;
        Ok(Self {
            report: serde_json::from_str(&content)?,
        })
    }

    pub async fn persist(&self, path: &Path) -> Result<(), TableError> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.report)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    pub fn report(&self) -> &FetchReport {
        &self.report
    }
}
