//! Persistence of email metadata and of the moved-file log.
//!
//! Stores rewrite their files wholesale and take no locks. Two processes
//! writing the same store will lose each other's updates.

mod json;
mod moved_log;
mod sheet;

pub use json::JsonStore;
pub use moved_log::MovedLog;
pub use sheet::{SheetStore, COLUMNS};

use std::path::Path;

use tracing::error;

use crate::error::StoreError;
use crate::models::config::StoreConfig;
use crate::models::record::EmailRecord;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Collection of [`EmailRecord`]s keyed by `(date, sender)`.
pub trait RecordStore {
    /// All records, in insertion order.
    fn load(&self) -> Result<Vec<EmailRecord>>;

    /// Replace the record with the same key, or append it.
    fn upsert(&self, record: &EmailRecord) -> Result<()>;
}

/// JSON and spreadsheet stores updated together.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    pub json: JsonStore,
    pub sheet: SheetStore,
}

impl MetadataStore {
    pub fn new(json: JsonStore, sheet: SheetStore) -> Self {
        Self { json, sheet }
    }

    /// Stores at the configured paths, relative ones resolved against `base`.
    pub fn from_config(config: &StoreConfig, base: &Path) -> Self {
        Self::new(
            JsonStore::new(config.json_path_in(base)),
            SheetStore::new(config.sheet_path_in(base)),
        )
    }

    /// Upsert into both stores. A failure in one does not stop the other.
    ///
    /// Returns `true` when both writes succeeded.
    pub fn upsert(&self, record: &EmailRecord) -> bool {
        let mut ok = true;
        if let Err(e) = self.json.upsert(record) {
            error!("Error saving to {}: {}", self.json.path().display(), e);
            ok = false;
        }
        if let Err(e) = self.sheet.upsert(record) {
            error!("Error saving to {}: {}", self.sheet.path().display(), e);
            ok = false;
        }
        ok
    }
}
