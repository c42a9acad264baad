//! Invoice number extraction module.

mod scanner;
pub mod rules;

pub use rules::{extract_invoice_number, InvoiceNumberExtractor, InvoiceRule};
pub use scanner::{list_pdfs, InvoiceScanner};
