// =============================================================================
// classifier.rs - ISSUED OR PAID?
// =============================================================================
//
// Given the rows that concern our subject, split them into two ledgers:
//
//   ISSUED - what the court assessed (fines, fees, costs)
//   PAID   - what actually came in
//
// Neither ledger has a reliable column to lean on, so each one is a cascade
// of extraction strategies. A later tier only runs when the earlier one
// came up empty; tiers are never blended.
//
// Issued:
//   tier 1  DirectAmount over every row with a digit in its amount cell
//   tier 2  BracketedDescriptionAmount over non-payment, non-correction rows
//           (only when tier 1 found no positive amount; replaces tier 1)
//
// Paid (payment-coded rows only):
//   tier 1  TotalPaidPattern
//   tier 2  ReceiptPattern (only when tier 1 found nothing)
//   then    NameTransferRecovery for any $0.00 line that names the subject
// =============================================================================

use rust_decimal::Decimal;
use tracing::debug;

use crate::docket::assembler::COL_DATE;
use crate::error::LedgerError;
use crate::extraction;
use crate::models::{DocketRow, DocketTable, ExtractionStrategy, LedgerEntry, Subject};
use crate::phrase_scanner::{self, CaseFlags};

/// Docket codes under which payments are posted. Matched exactly.
pub const PAYMENT_CODES: &[&str] = &["ACCOUNT", "PAY", "TEXT"];

/// Codes containing this marker are account corrections, never assessments.
pub const ACCOUNT_CORRECTION_MARKER: &str = "AC";

pub fn is_payment_code(code: &str) -> bool {
    PAYMENT_CODES.contains(&code)
}

/// Both ledgers plus their totals and the case flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub issued: Vec<LedgerEntry>,
    pub paid: Vec<LedgerEntry>,
    /// Rounded to cents.
    pub total_amount_owed: Decimal,
    /// Left unrounded; rounding belongs to presentation.
    pub total_amount_paid: Decimal,
    pub flags: CaseFlags,
}

pub struct AmountClassifier<'a> {
    subject: &'a Subject,
}

impl<'a> AmountClassifier<'a> {
    pub fn new(subject: &'a Subject) -> Self {
        Self { subject }
    }

    /// Classify the party-filtered `rows` of `table`.
    ///
    /// Fails with [`LedgerError::NoDateColumn`] when the docket never had a
    /// date column, since nothing could be placed in a month.
    pub fn classify(&self, table: &DocketTable, rows: &[DocketRow]) -> Result<Classification, LedgerError> {
        if !table.has_column(COL_DATE) {
            return Err(LedgerError::NoDateColumn {
                case_number: table.case_number.clone(),
            });
        }

        let flags = phrase_scanner::scan_rows(rows);
        let mut issued = self.issued_ledger(rows);
        let mut paid = self.paid_ledger(rows);

        let total_amount_owed = checked_total(&mut issued).round_dp(2);
        let total_amount_paid = checked_total(&mut paid);

        debug!(
            case = %table.case_number,
            issued_rows = issued.len(),
            paid_rows = paid.len(),
            owed = %total_amount_owed,
            paid = %total_amount_paid,
            "Docket classified"
        );

        Ok(Classification {
            issued,
            paid,
            total_amount_owed,
            total_amount_paid,
            flags,
        })
    }

    /// The fees and fines assessed.
    pub fn issued_ledger(&self, rows: &[DocketRow]) -> Vec<LedgerEntry> {
        let direct = self.apply(ExtractionStrategy::DirectAmount, rows.iter());
        if direct.iter().any(|e| e.amount > Decimal::ZERO) {
            return direct;
        }

        let candidates = rows.iter().filter(|r| {
            !is_payment_code(&r.code) && !r.code.contains(ACCOUNT_CORRECTION_MARKER)
        });
        let bracketed = self.apply(ExtractionStrategy::BracketedDescriptionAmount, candidates);

        debug!(
            direct_rows = direct.len(),
            bracketed_rows = bracketed.len(),
            "No positive amount in the amount column, using bracketed description amounts"
        );
        bracketed
    }

    /// The payments received.
    pub fn paid_ledger(&self, rows: &[DocketRow]) -> Vec<LedgerEntry> {
        let payment_rows: Vec<&DocketRow> = rows
            .iter()
            .filter(|r| is_payment_code(&r.code))
            .filter(|r| {
                if r.date.is_none() {
                    debug!(case = %r.case_number, description = %r.description, "Undated payment row dropped");
                }
                r.date.is_some()
            })
            .collect();

        let mut paid: Vec<LedgerEntry> = self
            .apply(ExtractionStrategy::TotalPaidPattern, payment_rows.iter().copied())
            .into_iter()
            .filter(|e| e.amount >= Decimal::ZERO)
            .collect();

        if paid.is_empty() {
            paid = self.apply(ExtractionStrategy::ReceiptPattern, payment_rows.iter().copied());
            if !paid.is_empty() {
                debug!(rows = paid.len(), "Payments recovered from receipt lines");
            }
        }

        for entry in paid.iter_mut().filter(|e| e.amount.is_zero()) {
            self.recover_transfer(entry);
        }

        paid
    }

    /// Replace a $0.00 payment with the amount transferred to the subject,
    /// when the description records one.
    pub fn recover_transfer(&self, entry: &mut LedgerEntry) -> bool {
        let recovered = extraction::name_transfer_amount(
            &entry.description,
            &entry.case_number,
            self.subject,
        );
        match recovered {
            Some(amount) => {
                debug!(case = %entry.case_number, amount = %amount, "Zero payment recovered from transfer clause");
                entry.amount = amount;
                entry.strategy = ExtractionStrategy::NameTransferRecovery;
                true
            }
            None => false,
        }
    }

    fn apply<'r>(
        &self,
        strategy: ExtractionStrategy,
        rows: impl Iterator<Item = &'r DocketRow>,
    ) -> Vec<LedgerEntry> {
        rows.filter_map(|row| {
            strategy
                .extract(row, self.subject)
                .map(|amount| LedgerEntry::from_row(row, amount, strategy))
        })
        .collect()
    }
}

/// Sum a ledger, dropping any entry whose amount would overflow the running
/// total. What is left in `entries` always adds up to the returned value.
pub fn checked_total(entries: &mut Vec<LedgerEntry>) -> Decimal {
    let mut total = Decimal::ZERO;
    entries.retain(|entry| match total.checked_add(entry.amount) {
        Some(next) => {
            total = next;
            true
        }
        None => {
            debug!(
                case = %entry.case_number,
                amount = %entry.amount,
                description = %entry.description,
                "Amount overflows the ledger total, row dropped"
            );
            false
        }
    });
    total
}

#[cfg(test)]
fn sum(entries: &[LedgerEntry]) -> Decimal {
    entries.iter().map(|e| e.amount).sum()
}
