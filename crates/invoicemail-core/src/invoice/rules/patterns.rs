//! Regex patterns for German invoice number labels.
//!
//! Patterns are case-sensitive and run with multi-line and dot-all flags.

use lazy_static::lazy_static;
use regex::Regex;

/// Label whose value is printed on the following line.
pub const SPLIT_LINE_LABEL: &str = "Rechnungs-Nr.";

lazy_static! {
    // Standalone number on the line after a split-line label
    pub static ref NEXT_LINE_NUMBER: Regex = Regex::new(
        r"\b(\d{6,})\b"
    ).unwrap();

    // "Rechnungsnr.: RE12345"
    pub static ref RE_PREFIXED_NUMBER: Regex = Regex::new(
        r"(?ms)Rechnungsnr\.\s*:\s*(RE\d+)"
    ).unwrap();

    // "Rechnung 2024/0001"
    pub static ref YEAR_SLASH_NUMBER: Regex = Regex::new(
        r"(?ms)Rechnung\s+(\d{4}/\d{4})"
    ).unwrap();

    // "Rechnung Nr. X", "Rechnungs-Nr. X", "Rechnungsnummer: X"
    pub static ref LABELED_NUMBER: Regex = Regex::new(
        r"(?ms)(?:Rechnung\s*Nr\.?|Rechnungs-Nr\.?|Rechnungsnummer)[\s:]*[-\s]*([\w\d-]+)"
    ).unwrap();

    // Long digit run somewhere before a "Rechnungsnummer" label
    pub static ref DIGITS_BEFORE_LABEL_COLON: Regex = Regex::new(
        r"(?ms)(\d{8,})\s*[\s\S]*?Rechnungsnummer\s*[:\s]*"
    ).unwrap();

    pub static ref DIGITS_ADJACENT_LABEL: Regex = Regex::new(
        r"(?ms)(\d{8,})\s*Rechnungsnummer\s*[:\s]*"
    ).unwrap();

    pub static ref DIGITS_BEFORE_LABEL: Regex = Regex::new(
        r"(?ms)(\d{8,})\s*[\s\S]*?Rechnungsnummer"
    ).unwrap();
}
