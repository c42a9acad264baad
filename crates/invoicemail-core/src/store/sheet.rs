//! Email records as an Excel table.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, warn};

use super::{RecordStore, Result};
use crate::error::StoreError;
use crate::models::record::{upsert_record, EmailRecord};

/// Column titles of the table, in order.
pub const COLUMNS: [&str; 5] = ["Date", "Email", "Subject", "Attachments", "Invoice_number"];

const ATTACHMENT_SEPARATOR: &str = ", ";

/// Spreadsheet of [`EmailRecord`]s.
///
/// Every update reads the whole table and writes the whole workbook back.
#[derive(Debug, Clone)]
pub struct SheetStore {
    path: PathBuf,
}

impl SheetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Only `.xlsx` is written, so any other extension is refused.
    fn check_format(&self) -> Result<()> {
        let is_xlsx = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
        if is_xlsx {
            Ok(())
        } else {
            Err(StoreError::SheetFormat(self.path.clone()))
        }
    }

    fn read(&self) -> Result<Vec<EmailRecord>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .map_err(|e: calamine::XlsxError| StoreError::SheetRead(e.to_string()))?;

        let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
            return Ok(Vec::new());
        };
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| StoreError::SheetRead(e.to_string()))?;

        let records = range
            .rows()
            .filter(|row| !is_header(row))
            .filter_map(row_to_record)
            .collect();
        Ok(records)
    }

    fn write(&self, records: &[EmailRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();

        for (col, title) in COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &bold)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, &record.date)?;
            sheet.write_string(row, 1, &record.sender)?;
            sheet.write_string(row, 2, &record.subject)?;
            sheet.write_string(row, 3, record.attachments.join(ATTACHMENT_SEPARATOR))?;
            sheet.write_string(row, 4, record.invoice_number.clone().unwrap_or_default())?;
        }

        workbook.save(&self.path)?;
        Ok(())
    }
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_header(row: &[Data]) -> bool {
    cell_text(row.first()) == COLUMNS[0] && cell_text(row.get(1)) == COLUMNS[1]
}

fn row_to_record(row: &[Data]) -> Option<EmailRecord> {
    let date = cell_text(row.first());
    let sender = cell_text(row.get(1));
    if date.is_empty() && sender.is_empty() {
        return None;
    }

    let attachments = cell_text(row.get(3))
        .split(ATTACHMENT_SEPARATOR)
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect();
    let invoice_number = Some(cell_text(row.get(4))).filter(|n| !n.is_empty());

    Some(
        EmailRecord::new(date, sender, cell_text(row.get(2)))
            .with_attachments(attachments)
            .with_invoice_number(invoice_number),
    )
}

impl RecordStore for SheetStore {
    /// Missing or unreadable workbooks load as empty.
    fn load(&self) -> Result<Vec<EmailRecord>> {
        self.check_format()?;
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        match self.read() {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Error reading {}, starting fresh: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    fn upsert(&self, record: &EmailRecord) -> Result<()> {
        let mut records = self.load()?;
        upsert_record(&mut records, record.clone());
        self.write(&records)?;
        debug!("Wrote {} rows to {}", records.len(), self.path.display());
        Ok(())
    }
}
