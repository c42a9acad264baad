//! CSV log of files moved into the done directory.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Result;
use crate::models::record::MovedFileRecord;

const HEADER: [&str; 4] = ["filename", "location", "status", "moved_at"];

/// Append-only CSV of [`MovedFileRecord`]s.
#[derive(Debug, Clone)]
pub struct MovedLog {
    path: PathBuf,
}

impl MovedLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `records`. The header row is written when the file is new.
    pub fn append(&self, records: &[MovedFileRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let is_new = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            wtr.write_record(HEADER)?;
        }
        for record in records {
            wtr.write_record([
                record.filename.as_str(),
                &record.location.display().to_string(),
                &record.status.to_string(),
                &record.moved_at.to_rfc3339(),
            ])?;
        }
        wtr.flush()?;

        debug!("Logged {} moved files to {}", records.len(), self.path.display());
        Ok(())
    }
}
