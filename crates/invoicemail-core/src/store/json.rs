//! Email records as a pretty-printed JSON array.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, warn};

use super::{RecordStore, Result};
use crate::models::record::{upsert_record, EmailRecord};

/// JSON array of [`EmailRecord`]s, rewritten on every update.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, records: &[EmailRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records.serialize(&mut serializer)?;

        fs::write(&self.path, buf)?;
        Ok(())
    }
}

impl RecordStore for JsonStore {
    /// Missing files load as empty. So do malformed ones, after a warning;
    /// their content is lost on the next write.
    fn load(&self) -> Result<Vec<EmailRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Error decoding {}, starting fresh: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    fn upsert(&self, record: &EmailRecord) -> Result<()> {
        let mut records = self.load()?;
        let updated = upsert_record(&mut records, record.clone());
        self.write(&records)?;
        debug!(
            "{} record for {} in {}",
            if updated { "Updated" } else { "Appended" },
            record.sender,
            self.path.display()
        );
        Ok(())
    }
}
