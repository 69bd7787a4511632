// =============================================================================
// extraction.rs - FIVE WAYS TO FIND A DOLLAR AMOUNT
// =============================================================================
//
// Courts record money in whatever column, sentence or bracket felt right at
// the time. Each way we know of reading an amount is a named strategy; the
// classifier decides which ones to try and in what order.
//
//   DirectAmount               "$ 1,234.50" in the amount column
//   BracketedDescriptionAmount "[FINE 100.00]" inside the description
//   TotalPaidPattern           "TOTAL AMOUNT PAID: $50.00"
//   ReceiptPattern             "RECEIPT ... TOTAL AMOUNT PAID ON CASE # CF-2020-1 : $50.00"
//   NameTransferRecovery       "CF-2020-1: $150.00 ON TRANSFER TO SMITH, JOHN"
//
// Every strategy returns `None` rather than guessing.
// =============================================================================

use std::str::FromStr;
use std::sync::LazyLock;

use memchr::memmem;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{DocketRow, ExtractionStrategy, Subject};
use crate::phrase_scanner;

static BRACKETED_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:.*?)(\d+\.\d{2})(?:.*?)\]").expect("valid bracketed amount regex")
});

static TOTAL_PAID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"TOTAL AMOUNT PAID:\s*\$?\s*(\d[\d,]*\.\d{2})").expect("valid total paid regex")
});

static TOTAL_PAID_ON_CASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"TOTAL AMOUNT PAID ON CASE\s*#\s*[A-Za-z0-9-]*\s*:\s*\$\s?(\d[\d,]*\.\d{2})")
        .expect("valid total paid on case regex")
});

const TRANSFER_MARKER: &[u8] = b"ON TRANSFER TO";

impl ExtractionStrategy {
    /// Run this strategy against one docket row.
    pub fn extract(self, row: &DocketRow, subject: &Subject) -> Option<Decimal> {
        match self {
            ExtractionStrategy::DirectAmount => row.amount.as_deref().and_then(direct_amount),
            ExtractionStrategy::BracketedDescriptionAmount => {
                bracketed_description_amount(&row.description)
            }
            ExtractionStrategy::TotalPaidPattern => total_paid_amount(&row.description),
            ExtractionStrategy::ReceiptPattern => receipt_amount(&row.description),
            ExtractionStrategy::NameTransferRecovery => {
                name_transfer_amount(&row.description, &row.case_number, subject)
            }
        }
    }
}

/// Parse an amount cell. Cells without a digit are not amounts at all;
/// `$`, `,` and spaces are stripped before parsing.
pub fn direct_amount(raw: &str) -> Option<Decimal> {
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    match Decimal::from_str(&cleaned) {
        Ok(amount) => Some(amount),
        Err(_) => {
            debug!(raw = raw, "Amount cell is not a number, dropping row");
            None
        }
    }
}

/// First `d+.dd` value enclosed in square brackets.
pub fn bracketed_description_amount(description: &str) -> Option<Decimal> {
    capture_amount(&BRACKETED_AMOUNT, description)
}

/// `TOTAL AMOUNT PAID: $X.XX`
pub fn total_paid_amount(description: &str) -> Option<Decimal> {
    capture_amount(&TOTAL_PAID, description)
}

/// `TOTAL AMOUNT PAID ON CASE #<case>: $X.XX`, only on lines that mention a
/// receipt.
pub fn receipt_amount(description: &str) -> Option<Decimal> {
    if !phrase_scanner::mentions_receipt(description) {
        return None;
    }
    capture_amount(&TOTAL_PAID_ON_CASE, description)
}

/// Sum of every `<case>: $AMOUNT ON TRANSFER TO ... LAST, FIRST` in the
/// description. `None` when the description does not name the subject in
/// docket form or no transfer clause matches.
pub fn name_transfer_amount(description: &str, case_number: &str, subject: &Subject) -> Option<Decimal> {
    let full_name = subject.docket_name();
    let bytes = description.as_bytes();
    if memmem::find(bytes, full_name.as_bytes()).is_none()
        || memmem::find(bytes, TRANSFER_MARKER).is_none()
    {
        return None;
    }

    let pattern = format!(
        r"{}:\s*\$([\d,.]+)\s+ON TRANSFER TO.*?{}\b",
        regex::escape(case_number),
        regex::escape(&full_name)
    );
    let transfer = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            debug!(case = case_number, error = %e, "Could not build transfer pattern");
            return None;
        }
    };

    let amounts: Vec<Decimal> = transfer
        .captures_iter(description)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| parse_money(m.as_str()))
        .collect();

    if amounts.is_empty() {
        return None;
    }
    let total = amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount));
    if total.is_none() {
        debug!(case = case_number, "Transfer amounts overflow, nothing recovered");
    }
    total
}

fn capture_amount(re: &Regex, text: &str) -> Option<Decimal> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_money(m.as_str()))
}

fn parse_money(text: &str) -> Option<Decimal> {
    let cleaned = text.replace(',', "");
    Decimal::from_str(cleaned.trim_end_matches('.')).ok()
}
