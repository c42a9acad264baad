//! Invoice number ("Rechnungsnummer") extraction.
//!
//! Rules run in a fixed order, labeled forms first and bare digit runs last.
//! The first rule that matches wins.

use regex::Regex;
use tracing::trace;

use super::patterns::*;
use super::{ExtractionMatch, FieldExtractor};

/// One invoice number rule, listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceRule {
    /// `Rechnungsnr.: RE12345`.
    RePrefixed,
    /// `Rechnung 2024/0001`.
    YearSlash,
    /// `Rechnungs-Nr.` with a 6+ digit number on the next line.
    SplitLineLabel,
    /// `Rechnung Nr.`, `Rechnungs-Nr.` or `Rechnungsnummer` followed by a token.
    Labeled,
    /// 8+ digits, later `Rechnungsnummer` with optional colon.
    DigitsBeforeLabelColon,
    /// 8+ digits directly followed by `Rechnungsnummer`.
    DigitsAdjacentLabel,
    /// 8+ digits, later `Rechnungsnummer`.
    DigitsBeforeLabel,
}

impl InvoiceRule {
    /// All rules, highest priority first.
    pub const ORDERED: [InvoiceRule; 7] = [
        InvoiceRule::RePrefixed,
        InvoiceRule::YearSlash,
        InvoiceRule::SplitLineLabel,
        InvoiceRule::Labeled,
        InvoiceRule::DigitsBeforeLabelColon,
        InvoiceRule::DigitsAdjacentLabel,
        InvoiceRule::DigitsBeforeLabel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InvoiceRule::SplitLineLabel => "split_line_label",
            InvoiceRule::RePrefixed => "re_prefixed",
            InvoiceRule::YearSlash => "year_slash",
            InvoiceRule::Labeled => "labeled",
            InvoiceRule::DigitsBeforeLabelColon => "digits_before_label_colon",
            InvoiceRule::DigitsAdjacentLabel => "digits_adjacent_label",
            InvoiceRule::DigitsBeforeLabel => "digits_before_label",
        }
    }

    pub fn confidence(self) -> f32 {
        match self {
            InvoiceRule::RePrefixed => 0.95,
            InvoiceRule::YearSlash => 0.9,
            InvoiceRule::SplitLineLabel => 0.85,
            InvoiceRule::Labeled => 0.8,
            InvoiceRule::DigitsBeforeLabelColon | InvoiceRule::DigitsAdjacentLabel => 0.5,
            InvoiceRule::DigitsBeforeLabel => 0.4,
        }
    }

    fn pattern(self) -> Option<&'static Regex> {
        match self {
            InvoiceRule::SplitLineLabel => None,
            InvoiceRule::RePrefixed => Some(&*RE_PREFIXED_NUMBER),
            InvoiceRule::YearSlash => Some(&*YEAR_SLASH_NUMBER),
            InvoiceRule::Labeled => Some(&*LABELED_NUMBER),
            InvoiceRule::DigitsBeforeLabelColon => Some(&*DIGITS_BEFORE_LABEL_COLON),
            InvoiceRule::DigitsAdjacentLabel => Some(&*DIGITS_ADJACENT_LABEL),
            InvoiceRule::DigitsBeforeLabel => Some(&*DIGITS_BEFORE_LABEL),
        }
    }

    /// Apply this rule alone.
    pub fn apply(self, text: &str) -> Option<ExtractionMatch<String>> {
        let Some(pattern) = self.pattern() else {
            return split_line_match(text);
        };

        let caps = pattern.captures(text)?;
        let group = caps.get(1)?;
        let value = group.as_str().trim();
        if value.is_empty() {
            return None;
        }

        let full_match = caps.get(0)?;
        Some(ExtractionMatch::new(
            value.to_string(),
            self.confidence(),
            full_match.as_str(),
        ))
    }
}

fn split_line_match(text: &str) -> Option<ExtractionMatch<String>> {
    let lines: Vec<&str> = text.split('\n').collect();

    lines.iter().enumerate().find_map(|(i, line)| {
        if !line.contains(SPLIT_LINE_LABEL) {
            return None;
        }
        let next_line = lines.get(i + 1)?;
        let number = NEXT_LINE_NUMBER.captures(next_line)?.get(1)?;
        Some(ExtractionMatch::new(
            number.as_str().trim().to_string(),
            InvoiceRule::SplitLineLabel.confidence(),
            format!("{}\n{}", line, next_line),
        ))
    })
}

/// Invoice number extractor applying [`InvoiceRule::ORDERED`].
pub struct InvoiceNumberExtractor {
    rules: Vec<InvoiceRule>,
}

impl InvoiceNumberExtractor {
    /// Create an extractor with every rule enabled.
    pub fn new() -> Self {
        Self {
            rules: InvoiceRule::ORDERED.to_vec(),
        }
    }

    /// Drop rules that only look at bare digit runs.
    pub fn labeled_only(mut self) -> Self {
        self.rules.retain(|rule| {
            !matches!(
                rule,
                InvoiceRule::DigitsBeforeLabelColon
                    | InvoiceRule::DigitsAdjacentLabel
                    | InvoiceRule::DigitsBeforeLabel
            )
        });
        self
    }

    /// First rule that matches, with the rule itself.
    pub fn extract_with_rule(&self, text: &str) -> Option<(InvoiceRule, ExtractionMatch<String>)> {
        self.rules.iter().find_map(|rule| {
            let found = rule.apply(text)?;
            trace!("Invoice number rule {} matched {:?}", rule.name(), found.value);
            Some((*rule, found))
        })
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_with_rule(text).map(|(_, m)| m)
    }
}

/// Extract the invoice number from text.
pub fn extract_invoice_number(text: &str) -> Option<String> {
    InvoiceNumberExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_re_prefixed_number() {
        assert_eq!(
            extract_invoice_number("Kunde: Muster GmbH\nRechnungsnr.: RE12345\nDatum: 01.02.2024"),
            Some("RE12345".to_string())
        );
        assert_eq!(
            extract_invoice_number("Rechnungsnr. :RE987"),
            Some("RE987".to_string())
        );
    }

    #[test]
    fn test_year_slash_number() {
        assert_eq!(
            extract_invoice_number("Rechnung 2024/0042 vom 03.04.2024"),
            Some("2024/0042".to_string())
        );
    }

    #[test]
    fn test_labeled_variants() {
        assert_eq!(
            extract_invoice_number("Rechnung Nr. A-1001\nBetrag: 10,00 EUR"),
            Some("A-1001".to_string())
        );
        assert_eq!(
            extract_invoice_number("Rechnungsnummer: 2024-17"),
            Some("2024-17".to_string())
        );
        assert_eq!(
            extract_invoice_number("RechnungNr 77AB"),
            Some("77AB".to_string())
        );
    }

    #[test]
    fn test_split_line_label_beats_labeled() {
        let text = "Rechnungs-Nr. Kunden-Nr. Datum\n4711001 10020 01.02.2024";
        assert_eq!(extract_invoice_number(text), Some("4711001".to_string()));

        let (rule, m) = InvoiceNumberExtractor::new().extract_with_rule(text).unwrap();
        assert_eq!(rule, InvoiceRule::SplitLineLabel);
        assert!(m.source.starts_with("Rechnungs-Nr."));
    }

    #[test]
    fn test_re_prefixed_beats_split_line() {
        let text = "Rechnungs-Nr. Datum\n20240101 Seite 1\nRechnungsnr.: RE12345";
        assert_eq!(extract_invoice_number(text), Some("RE12345".to_string()));

        let text = "Rechnungs-Nr.\n20240101\nRechnung 2024/0007";
        assert_eq!(extract_invoice_number(text), Some("2024/0007".to_string()));
    }

    #[test]
    fn test_split_line_without_number_falls_through() {
        // Next line has only short numbers, so the labeled rule takes the token after the label.
        let text = "Rechnungs-Nr. X-55\nSeite 1";
        assert_eq!(extract_invoice_number(text), Some("X-55".to_string()));
    }

    #[test]
    fn test_digits_before_label() {
        let text = "Kundenkonto\n12345678\nBitte geben Sie bei Zahlung die Rechnungsnummer";
        assert_eq!(extract_invoice_number(text), Some("12345678".to_string()));

        let text = "987654321 Rechnungsnummer:";
        assert_eq!(extract_invoice_number(text), Some("987654321".to_string()));
    }

    #[test]
    fn test_short_digits_are_ignored() {
        assert_eq!(extract_invoice_number("1234567\nRechnungsnummer"), None);
    }

    #[test]
    fn test_no_match_returns_none() {
        assert_eq!(extract_invoice_number(""), None);
        assert_eq!(extract_invoice_number("Lieferschein 123\nBestellnummer 99999999"), None);
        assert_eq!(extract_invoice_number("rechnungsnr.: re12345"), None);
    }

    #[test]
    fn test_labeled_beats_digit_rule() {
        // The order number appears first in the text, yet the labeled rule wins.
        let text = "Bestellung 55555555\nRechnungsnummer: R-2024-9";
        assert_eq!(extract_invoice_number(text), Some("R-2024-9".to_string()));
    }

    #[test]
    fn test_labeled_only_skips_digit_rules() {
        let extractor = InvoiceNumberExtractor::new().labeled_only();
        assert!(extractor.extract("12345678\nRechnungsnummer").is_none());
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let text = "Größe: ÄÖÜ ß €\nRechnungs-Nr.\n€ 123456 ü";
        assert_eq!(extract_invoice_number(text), Some("123456".to_string()));
    }
}
