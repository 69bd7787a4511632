// =============================================================================
// models.rs - THE LEDGER'S BUILDING BLOCKS
// =============================================================================
//
// A docket page is a chronological log of everything that happened in a
// case. Somewhere between "DEFENDANT APPEARS" and "WARRANT RETURNED" are the
// lines that matter to us: what the court assessed, and what got paid.
//
// The types here describe three stages of that journey:
//
//   DocketRow    : one scraped line, still wearing its original strings
//   LedgerEntry  : a row we have committed to a dollar amount for
//   LedgerResult : the per-case verdict the report layer consumes
// =============================================================================

use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::party_filter::PartyFilterFallback;

/// One parsed line from a court docket.
///
/// `amount` keeps the raw cell text. `None` means the assembled table has no
/// amount column at all; `Some("")` is the sentinel for "column exists, cell
/// was blank".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocketRow {
    pub case_number: String,
    /// Resolved date after forward-fill. `None` when the cell held text we
    /// could not read as a date, or when no earlier row carried one.
    pub date: Option<NaiveDate>,
    pub code: String,
    pub description: String,
    pub party: String,
    pub amount: Option<String>,
}

/// The assembled, row-oriented docket for one case.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocketTable {
    pub case_number: String,
    /// Lower-cased, canonicalized column names in first-seen order.
    pub columns: Vec<String>,
    pub rows: Vec<DocketRow>,
}

impl DocketTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The subject of the report. Names arrive already resolved from whatever
/// alias/profile lookup ran upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
}

impl Subject {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            middle_name: None,
        }
    }

    pub fn with_middle_name(mut self, middle_name: impl Into<String>) -> Self {
        let middle = middle_name.into();
        self.middle_name = if middle.trim().is_empty() { None } else { Some(middle) };
        self
    }

    /// First and last name, trimmed and lower-cased, for containment checks.
    pub fn name_tokens(&self) -> (String, String) {
        (
            self.first_name.trim().to_lowercase(),
            self.last_name.trim().to_lowercase(),
        )
    }

    /// The name as the docket clerk types it: `LAST, FIRST`.
    pub fn docket_name(&self) -> String {
        format!(
            "{}, {}",
            self.last_name.trim().to_uppercase(),
            self.first_name.trim().to_uppercase()
        )
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.middle_name {
            Some(middle) => write!(f, "{} {} {}", self.first_name, middle, self.last_name),
            None => write!(f, "{} {}", self.first_name, self.last_name),
        }
    }
}

/// Which extraction rule produced a ledger entry's amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// The docket's own amount column.
    DirectAmount,
    /// A `[... 123.45 ...]` value inside the description.
    BracketedDescriptionAmount,
    /// `TOTAL AMOUNT PAID: $X.XX`
    TotalPaidPattern,
    /// `TOTAL AMOUNT PAID ON CASE #<case>: $X.XX` on a receipt line.
    ReceiptPattern,
    /// `<case>: $X.XX ON TRANSFER TO ... LAST, FIRST` replacing a zero payment.
    NameTransferRecovery,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStrategy::DirectAmount => write!(f, "DIRECT_AMOUNT"),
            ExtractionStrategy::BracketedDescriptionAmount => write!(f, "BRACKETED_DESCRIPTION"),
            ExtractionStrategy::TotalPaidPattern => write!(f, "TOTAL_PAID"),
            ExtractionStrategy::ReceiptPattern => write!(f, "RECEIPT"),
            ExtractionStrategy::NameTransferRecovery => write!(f, "NAME_TRANSFER"),
        }
    }
}

/// A classified row with a clean numeric amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub case_number: String,
    pub date: Option<NaiveDate>,
    pub code: String,
    pub description: String,
    pub party: String,
    pub amount: Decimal,
    pub strategy: ExtractionStrategy,
}

impl LedgerEntry {
    pub fn from_row(row: &DocketRow, amount: Decimal, strategy: ExtractionStrategy) -> Self {
        Self {
            case_number: row.case_number.clone(),
            date: row.date,
            code: row.code.clone(),
            description: row.description.clone(),
            party: row.party.clone(),
            amount,
            strategy,
        }
    }
}

/// A calendar month, irrespective of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The month after this one.
    pub fn succ(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Longest-run statistics over a paid ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakStats {
    pub streak_length: u32,
    pub total_paid_months: u32,
    pub streak_start: Option<MonthKey>,
    pub streak_end: Option<MonthKey>,
    /// Earliest payment date inside the longest streak.
    pub first_payment_in_streak: Option<NaiveDate>,
    /// Latest payment date inside the longest streak.
    pub last_payment_in_streak: Option<NaiveDate>,
}

/// The per-case output unit. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerResult {
    pub case_number: String,
    pub streak_length: u32,
    pub total_paid_months: u32,
    pub streak_end: Option<MonthKey>,
    pub streak_start: Option<MonthKey>,
    pub first_payment_in_streak: Option<NaiveDate>,
    pub last_payment_in_streak: Option<NaiveDate>,
    pub total_amount_paid: Decimal,
    pub total_amount_owed: Decimal,
    pub has_payment_plan: bool,
    pub already_received_waiver: bool,
    pub party_filter: Option<PartyFilterFallback>,
    pub fee_table_paid: Vec<LedgerEntry>,
    pub fee_table_issued: Vec<LedgerEntry>,
}

impl fmt::Display for LedgerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] owed {} / paid {}, streak {} month(s), {} paid month(s)",
            self.case_number,
            self.total_amount_owed,
            self.total_amount_paid,
            self.streak_length,
            self.total_paid_months
        )
    }
}
