// =============================================================================
// ledger.rs - ONE CASE IN, ONE VERDICT OUT
// =============================================================================
//
// The pipeline for a single case:
//
//   page -> assemble -> dedup -> party filter -> classify -> streak -> result
//
// and a batch runner that fans cases out across rayon workers. Cases never
// share mutable state; a case that has no docket is an `Err` in its own slot
// of the output map and its siblings carry on without it.
// =============================================================================

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use scraper::Html;
use tracing::{debug, info, warn};

use crate::case_ref::CaseRef;
use crate::classifier::AmountClassifier;
use crate::docket::{assemble, dedup_rows};
use crate::error::LedgerError;
use crate::metrics::MetricsCollector;
use crate::models::{LedgerResult, Subject};
use crate::party_filter::filter_for_subject;
use crate::source::DocketSource;
use crate::streak::longest_streak;

/// Per-case results keyed by case number, in case-number order.
pub type BatchOutcomes = BTreeMap<String, Result<LedgerResult, LedgerError>>;

/// Runs the full per-case pipeline for one subject.
pub struct CaseLedgerBuilder<'a> {
    subject: &'a Subject,
}

impl<'a> CaseLedgerBuilder<'a> {
    pub fn new(subject: &'a Subject) -> Self {
        Self { subject }
    }

    pub fn build(&self, case_number: &str, doc: &Html) -> Result<LedgerResult, LedgerError> {
        let mut table = assemble(doc, case_number)?;
        let duplicates = dedup_rows(&mut table);
        if duplicates > 0 {
            debug!(case = case_number, duplicates, "Duplicate docket rows dropped");
        }

        let filtered = filter_for_subject(&table, self.subject);
        let classification = AmountClassifier::new(self.subject).classify(&table, &filtered.rows)?;
        let streak = longest_streak(&classification.paid);

        let result = LedgerResult {
            case_number: case_number.to_string(),
            streak_length: streak.streak_length,
            total_paid_months: streak.total_paid_months,
            streak_end: streak.streak_end,
            streak_start: streak.streak_start,
            first_payment_in_streak: streak.first_payment_in_streak,
            last_payment_in_streak: streak.last_payment_in_streak,
            total_amount_paid: classification.total_amount_paid,
            total_amount_owed: classification.total_amount_owed,
            has_payment_plan: classification.flags.has_payment_plan,
            already_received_waiver: classification.flags.already_received_waiver,
            party_filter: filtered.fallback,
            fee_table_paid: classification.paid,
            fee_table_issued: classification.issued,
        };

        info!(
            case = case_number,
            owed = %result.total_amount_owed,
            paid = %result.total_amount_paid,
            streak = result.streak_length,
            paid_months = result.total_paid_months,
            "Case ledger built"
        );
        Ok(result)
    }

    /// Parse `html` and build its ledger.
    pub fn build_from_html(&self, case_number: &str, html: &str) -> Result<LedgerResult, LedgerError> {
        let doc = Html::parse_document(html);
        self.build(case_number, &doc)
    }
}

/// A page somebody already fetched, waiting to be turned into a ledger.
#[derive(Debug, Clone)]
pub struct CaseDocument {
    pub case: CaseRef,
    pub html: String,
}

/// Runs many cases for one subject in parallel.
pub struct LedgerBatch<'a> {
    subject: &'a Subject,
    metrics: &'a MetricsCollector,
}

impl<'a> LedgerBatch<'a> {
    pub fn new(subject: &'a Subject, metrics: &'a MetricsCollector) -> Self {
        Self { subject, metrics }
    }

    /// Build ledgers for pages already in hand. When two documents share a
    /// case number only the first is processed.
    pub fn run_documents(&self, documents: &[CaseDocument]) -> BatchOutcomes {
        first_per_case(documents, |d| &d.case)
            .into_par_iter()
            .map(|document| {
                let outcome = CaseLedgerBuilder::new(self.subject)
                    .build_from_html(&document.case.case_number, &document.html);
                self.finish(&document.case, outcome)
            })
            .collect()
    }

    /// Load each case from `source` and build its ledger. A case the source
    /// cannot supply becomes an `Err` entry; the rest of the batch runs.
    /// Repeated case numbers are processed once.
    pub fn run_source<S: DocketSource>(&self, source: &S, cases: &[CaseRef]) -> BatchOutcomes {
        info!(cases = cases.len(), subject = %self.subject, "Ledger batch starting");
        first_per_case(cases, |c| c)
            .into_par_iter()
            .map(|case| {
                let outcome = source.load(case).and_then(|html| {
                    CaseLedgerBuilder::new(self.subject).build_from_html(&case.case_number, &html)
                });
                self.finish(case, outcome)
            })
            .collect()
    }

    fn finish(
        &self,
        case: &CaseRef,
        outcome: Result<LedgerResult, LedgerError>,
    ) -> (String, Result<LedgerResult, LedgerError>) {
        if let Err(err) = &outcome {
            warn!(case = %case.case_number, error = %err, "Case skipped");
        }
        self.metrics.record_outcome(&outcome);
        (case.case_number.clone(), outcome)
    }
}

/// Keep the first item for each case number, in input order.
fn first_per_case<T>(items: &[T], case_of: impl Fn(&T) -> &CaseRef) -> Vec<&T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| {
            let case = case_of(*item);
            let fresh = seen.insert(case.case_number.as_str());
            if !fresh {
                warn!(case = %case.case_number, "Case listed more than once, later copy ignored");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::models::{ExtractionStrategy, MonthKey};
    use crate::party_filter::PartyFilterFallback;
    use crate::source::InMemorySource;
    use crate::test_support::{docket_page, DocketFixtureRow};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn john_smith() -> Subject {
        Subject::new("John", "Smith")
    }

    fn three_monthly_payments() -> String {
        docket_page(&[
            DocketFixtureRow::new("01-10-2024", "PAY", "TOTAL AMOUNT PAID: $50.00", "SMITH, JOHN", ""),
            DocketFixtureRow::new("02-10-2024", "PAY", "TOTAL AMOUNT PAID: $50.00", "SMITH, JOHN", ""),
            DocketFixtureRow::new("03-10-2024", "PAY", "TOTAL AMOUNT PAID: $50.00", "SMITH, JOHN", ""),
        ])
    }

    #[test]
    fn test_three_months_of_payments_end_to_end() {
        let subject = john_smith();
        let result = CaseLedgerBuilder::new(&subject)
            .build_from_html("CF-2024-1", &three_monthly_payments())
            .unwrap();

        assert_eq!(result.total_amount_paid, dec("150.00"));
        assert_eq!(result.streak_length, 3);
        assert_eq!(result.total_paid_months, 3);
        assert_eq!(result.streak_start, Some(MonthKey::new(2024, 1)));
        assert_eq!(result.streak_end, Some(MonthKey::new(2024, 3)));
        assert_eq!(result.last_payment_in_streak, NaiveDate::from_ymd_opt(2024, 3, 10));
        assert!(result
            .fee_table_paid
            .iter()
            .all(|e| e.strategy == ExtractionStrategy::TotalPaidPattern));
        assert_eq!(result.party_filter, None);
    }

    #[test]
    fn test_fees_and_flags_flow_into_result() {
        let subject = john_smith();
        let page = docket_page(&[
            DocketFixtureRow::new("01-05-2024", "ACCOUNT", "FINE", "SMITH, JOHN", "$ 200.00"),
            DocketFixtureRow::new("", "CTFREE", "COURT COSTS", "SMITH, JOHN", "$ 75.50"),
            DocketFixtureRow::new("01-20-2024", "TEXT", "DEFENDANT PLACED ON PAYMENT PLAN", "SMITH, JOHN", ""),
            DocketFixtureRow::new("02-01-2024", "MO", "COURT GRANTS 983A WAIVER", "SMITH, JOHN", ""),
        ]);
        let result = CaseLedgerBuilder::new(&subject)
            .build_from_html("CF-2024-2", &page)
            .unwrap();

        assert_eq!(result.total_amount_owed, dec("275.50"));
        assert_eq!(result.fee_table_issued.len(), 2);
        assert!(result.has_payment_plan);
        assert!(result.already_received_waiver);
        assert_eq!(result.streak_length, 0);
        assert_eq!(result.streak_end, None);
    }

    #[test]
    fn test_duplicate_rows_are_counted_once() {
        let subject = john_smith();
        let row = || DocketFixtureRow::new("01-10-2024", "PAY", "TOTAL AMOUNT PAID: $50.00", "SMITH, JOHN", "");
        let page = docket_page(&[row(), row()]);
        let result = CaseLedgerBuilder::new(&subject)
            .build_from_html("CF-2024-3", &page)
            .unwrap();
        assert_eq!(result.total_amount_paid, dec("50.00"));
    }

    #[test]
    fn test_blank_party_column_keeps_every_row() {
        let subject = john_smith();
        let page = docket_page(&[
            DocketFixtureRow::new("01-10-2024", "PAY", "TOTAL AMOUNT PAID: $10.00", "", ""),
            DocketFixtureRow::new("02-10-2024", "PAY", "TOTAL AMOUNT PAID: $10.00", "", ""),
        ]);
        let result = CaseLedgerBuilder::new(&subject)
            .build_from_html("CF-2024-4", &page)
            .unwrap();
        assert_eq!(result.fee_table_paid.len(), 2);
        assert_eq!(result.party_filter, Some(PartyFilterFallback::NoPartyColumn));
    }

    #[test]
    fn test_missing_docket_does_not_stop_the_batch() {
        let subject = john_smith();
        let metrics = MetricsCollector::new();
        let documents = vec![
            CaseDocument {
                case: CaseRef::new("CF-2024-1"),
                html: three_monthly_payments(),
            },
            CaseDocument {
                case: CaseRef::new("CF-2024-2"),
                html: "<html><body><p>Case sealed.</p></body></html>".to_string(),
            },
        ];

        let outcomes = LedgerBatch::new(&subject, &metrics).run_documents(&documents);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes["CF-2024-1"].as_ref().unwrap().streak_length, 3);
        assert!(outcomes["CF-2024-2"].as_ref().unwrap_err().is_no_data());
        let snap = metrics.snapshot();
        assert_eq!(snap.cases_succeeded, 1);
        assert_eq!(snap.cases_without_data, 1);
    }

    #[test]
    fn test_source_failures_are_case_scoped() {
        let subject = john_smith();
        let metrics = MetricsCollector::new();
        let mut source = InMemorySource::new();
        source.insert("CF-2024-1", three_monthly_payments());
        let cases = vec![CaseRef::new("CF-2024-1"), CaseRef::new("CF-2024-7")];

        let outcomes = LedgerBatch::new(&subject, &metrics).run_source(&source, &cases);

        assert!(outcomes["CF-2024-1"].is_ok());
        let err = outcomes["CF-2024-7"].as_ref().unwrap_err();
        assert!(matches!(err, LedgerError::Source { .. }));
        assert_eq!(metrics.snapshot().cases_unavailable, 1);
    }

    #[test]
    fn test_repeated_case_is_built_once() {
        let subject = john_smith();
        let metrics = MetricsCollector::new();
        let documents = vec![
            CaseDocument {
                case: CaseRef::new("CF-19-5"),
                html: three_monthly_payments(),
            },
            CaseDocument {
                case: CaseRef::new("CF-2019-5"),
                html: "<html><body><p>Case sealed.</p></body></html>".to_string(),
            },
        ];

        let outcomes = LedgerBatch::new(&subject, &metrics).run_documents(&documents);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes["CF-2019-5"].as_ref().unwrap().streak_length, 3);
        assert_eq!(metrics.snapshot().cases_attempted, 1);
    }

    #[test]
    fn test_rebuilding_the_same_page_is_identical() {
        let subject = john_smith();
        let builder = CaseLedgerBuilder::new(&subject);
        let page = three_monthly_payments();
        assert_eq!(
            builder.build_from_html("CF-2024-1", &page).unwrap(),
            builder.build_from_html("CF-2024-1", &page).unwrap()
        );
    }
}
