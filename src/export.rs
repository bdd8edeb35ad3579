//! CSV export of the lower-bound filter result.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::filter::FilteredViews;

pub const DOWNLOAD_FILE_NAME: &str = "datos_filtrados.csv";
pub const DOWNLOAD_MIME: &str = "text/csv";

/// An export ready to be written somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Only the rows above the lower threshold are offered for download.
    pub fn from_views(views: &FilteredViews) -> PolarsResult<Self> {
        Ok(Self {
            file_name: DOWNLOAD_FILE_NAME,
            mime: DOWNLOAD_MIME,
            bytes: encode_csv(views.above.frame())?,
        })
    }

    /// Write into `dir`, replacing any earlier export. Returns the written path.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
        let path = dir.join(self.file_name);
        std::fs::write(&path, &self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "exported filtered rows");
        Ok(path)
    }
}

/// UTF-8 CSV with a header row. Datetimes are written in ISO 8601.
pub fn encode_csv(frame: &DataFrame) -> PolarsResult<Vec<u8>> {
    let mut df = frame.clone();
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)?;
    Ok(buf)
}
