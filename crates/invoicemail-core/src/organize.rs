//! Rename processed files after their invoice number and file them away.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::OrganizeError;
use crate::models::config::FolderConfig;
use crate::models::record::{InvoiceMatch, MovedFileRecord};

/// Result type for organize operations.
pub type Result<T> = std::result::Result<T, OrganizeError>;

/// Directory used when the pending folder name carries no marker.
const DEFAULT_DONE_NAME: &str = "done";

/// Pending and done directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLayout {
    pub pending: PathBuf,
    pub done: PathBuf,
}

impl FolderLayout {
    pub fn new(pending: impl Into<PathBuf>, done: impl Into<PathBuf>) -> Self {
        Self {
            pending: pending.into(),
            done: done.into(),
        }
    }

    /// Derive the done directory from the pending one.
    ///
    /// The first occurrence of `pending_marker` in the last path component is
    /// replaced with `done_marker` (`.../re_` becomes `.../Re_Erledigt`).
    /// Without the marker the done directory is a sibling named `done`.
    pub fn derive(pending: impl Into<PathBuf>, pending_marker: &str, done_marker: &str) -> Self {
        let pending = pending.into();
        let name = pending
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let done_name = if !pending_marker.is_empty() && name.contains(pending_marker) {
            name.replacen(pending_marker, done_marker, 1)
        } else {
            DEFAULT_DONE_NAME.to_string()
        };

        let done = match pending.parent() {
            Some(parent) => parent.join(done_name),
            None => PathBuf::from(done_name),
        };

        Self { pending, done }
    }

    /// Layout described by the configuration.
    pub fn from_config(folders: &FolderConfig) -> Self {
        match &folders.done {
            Some(done) => Self::new(&folders.pending, done),
            None => Self::derive(&folders.pending, &folders.pending_marker, &folders.done_marker),
        }
    }
}

/// Replace characters Windows does not allow in file names with `_`.
pub fn sanitize_for_filesystem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect()
}

/// `<invoice>_<name>` with `/` in the invoice number turned into `-`.
pub fn renamed_file_name(original: &str, invoice_number: &str) -> String {
    format!(
        "{}_{}",
        invoice_number.replace('/', "-"),
        sanitize_for_filesystem(original)
    )
}

/// Renames files after their invoice number and moves them to the done directory.
pub struct FileOrganizer {
    layout: FolderLayout,
}

impl FileOrganizer {
    pub fn new(layout: FolderLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &FolderLayout {
        &self.layout
    }

    /// Create the done directory if it does not exist yet.
    pub fn ensure_done_dir(&self) -> Result<()> {
        if !self.layout.done.exists() {
            fs::create_dir_all(&self.layout.done).map_err(|source| OrganizeError::CreateDir {
                path: self.layout.done.clone(),
                source,
            })?;
            info!("Created folder: {}", self.layout.done.display());
        }
        Ok(())
    }

    /// Rename `path` in place, then move it into the done directory.
    ///
    /// If the move fails the file stays renamed where it is.
    pub fn organize(&self, path: &Path, invoice_number: &str) -> Result<MovedFileRecord> {
        if !path.is_file() {
            return Err(OrganizeError::NotFound(path.to_path_buf()));
        }
        let original = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| OrganizeError::InvalidName(path.to_path_buf()))?;

        let new_name = renamed_file_name(original, invoice_number);
        let renamed = path.with_file_name(&new_name);
        let destination = self.layout.done.join(&new_name);

        if destination.exists() {
            return Err(OrganizeError::AlreadyExists(destination));
        }
        if renamed != path && renamed.exists() {
            return Err(OrganizeError::AlreadyExists(renamed));
        }

        self.ensure_done_dir()?;

        fs::rename(path, &renamed).map_err(|source| OrganizeError::Rename {
            from: path.to_path_buf(),
            to: renamed.clone(),
            source,
        })?;

        info!("Moving {} to {}", new_name, destination.display());
        move_file(&renamed, &destination).map_err(|source| OrganizeError::Move {
            from: renamed.clone(),
            to: destination.clone(),
            source,
        })?;

        Ok(MovedFileRecord::moved(new_name, &self.layout.done))
    }

    /// Organize every match that has an invoice number.
    ///
    /// Failures are logged and skipped; the rest are still processed.
    pub fn organize_all(&self, matches: &[InvoiceMatch]) -> Vec<MovedFileRecord> {
        matches
            .iter()
            .filter_map(|m| {
                let number = m.invoice_number.as_deref()?;
                match self.organize(&m.path, number) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("Error processing {}: {}", m.path.display(), e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// `rename`, falling back to copy and delete across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if to.exists() {
                return Err(rename_err);
            }
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
