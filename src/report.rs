// =============================================================================
// report.rs - THE BOTTOM LINE
// =============================================================================
//
// The core hands back one result per case and refuses to add anything up.
// Adding things up happens here: totals across cases, the best individual
// streak, and the streak you get when every case's payments are laid on
// one calendar. Cases that produced nothing are listed with the reason.
//
// Money is rounded to cents at this layer and nowhere earlier.
// =============================================================================

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::case_ref::CaseRef;
use crate::ledger::BatchOutcomes;
use crate::metrics::MetricsSnapshot;
use crate::models::{LedgerEntry, MonthKey, Subject};
use crate::party_filter::PartyFilterFallback;
use crate::streak::longest_streak;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_cases_searched: usize,
    pub total_fees_issued: Decimal,
    pub total_fees_paid: Decimal,
    /// Sum of each case's paid months. A month paid on two cases counts twice.
    pub total_paid_months: u32,
    pub max_consecutive_months_individual: u32,
    pub max_consecutive_months_all_cases: u32,
    pub combined_streak_start: Option<MonthKey>,
    pub combined_streak_end: Option<MonthKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSummary {
    pub case_number: String,
    pub url: Option<String>,
    pub total_amount_owed: Decimal,
    pub total_amount_paid: Decimal,
    pub streak_length: u32,
    pub total_paid_months: u32,
    pub streak_start: Option<MonthKey>,
    pub streak_end: Option<MonthKey>,
    pub first_payment_in_streak: Option<NaiveDate>,
    pub last_payment_in_streak: Option<NaiveDate>,
    pub has_payment_plan: bool,
    pub already_received_waiver: bool,
    pub party_filter: Option<PartyFilterFallback>,
    pub fee_table_paid: Vec<LedgerEntry>,
    pub fee_table_issued: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCase {
    pub case_number: String,
    pub no_data: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub subject: String,
    pub summary: BatchSummary,
    pub cases: Vec<CaseSummary>,
    pub skipped: Vec<SkippedCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSnapshot>,
}

impl BatchReport {
    /// Fold per-case outcomes into a report. `cases` supplies docket URLs
    /// where they are known; a case missing from it simply has no URL.
    pub fn from_outcomes(subject: &Subject, outcomes: &BatchOutcomes, cases: &[CaseRef]) -> Self {
        let url_of = |case_number: &str| {
            cases
                .iter()
                .find(|c| c.case_number == case_number)
                .and_then(|c| c.url.clone())
        };

        let mut summaries = Vec::new();
        let mut skipped = Vec::new();
        let mut all_paid: Vec<LedgerEntry> = Vec::new();

        for (case_number, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    all_paid.extend(result.fee_table_paid.iter().cloned());
                    summaries.push(CaseSummary {
                        case_number: case_number.clone(),
                        url: url_of(case_number),
                        total_amount_owed: cents(result.total_amount_owed),
                        total_amount_paid: cents(result.total_amount_paid),
                        streak_length: result.streak_length,
                        total_paid_months: result.total_paid_months,
                        streak_start: result.streak_start,
                        streak_end: result.streak_end,
                        first_payment_in_streak: result.first_payment_in_streak,
                        last_payment_in_streak: result.last_payment_in_streak,
                        has_payment_plan: result.has_payment_plan,
                        already_received_waiver: result.already_received_waiver,
                        party_filter: result.party_filter,
                        fee_table_paid: result.fee_table_paid.clone(),
                        fee_table_issued: result.fee_table_issued.clone(),
                    });
                }
                Err(err) => skipped.push(SkippedCase {
                    case_number: case_number.clone(),
                    no_data: err.is_no_data(),
                    reason: err.to_string(),
                }),
            }
        }

        let combined = longest_streak(&all_paid);
        let summary = BatchSummary {
            total_cases_searched: outcomes.len(),
            total_fees_issued: cents(running_total(
                summaries.iter().map(|c| (c.case_number.as_str(), c.total_amount_owed)),
            )),
            total_fees_paid: cents(running_total(
                summaries.iter().map(|c| (c.case_number.as_str(), c.total_amount_paid)),
            )),
            total_paid_months: summaries.iter().map(|c| c.total_paid_months).sum(),
            max_consecutive_months_individual: summaries
                .iter()
                .map(|c| c.streak_length)
                .max()
                .unwrap_or(0),
            max_consecutive_months_all_cases: combined.streak_length,
            combined_streak_start: combined.streak_start,
            combined_streak_end: combined.streak_end,
        };

        info!(
            cases = summary.total_cases_searched,
            skipped = skipped.len(),
            issued = %summary.total_fees_issued,
            paid = %summary.total_fees_paid,
            best_streak = summary.max_consecutive_months_individual,
            combined_streak = summary.max_consecutive_months_all_cases,
            "Batch report assembled"
        );

        Self {
            subject: subject.to_string(),
            summary,
            cases: summaries,
            skipped,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsSnapshot) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Add up per-case amounts. A case whose amount would overflow the total is
/// left out of it and logged; the report still gets written.
fn running_total<'a>(amounts: impl Iterator<Item = (&'a str, Decimal)>) -> Decimal {
    let mut total = Decimal::ZERO;
    for (case_number, amount) in amounts {
        match total.checked_add(amount) {
            Some(next) => total = next,
            None => warn!(case = case_number, amount = %amount, "Case amount overflows the batch total, left out"),
        }
    }
    total
}

fn cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use crate::error::LedgerError;
    use crate::ledger::{CaseDocument, LedgerBatch};
    use crate::metrics::MetricsCollector;
    use crate::test_support::{docket_page, DocketFixtureRow};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn payment(date: &str, amount: &str) -> DocketFixtureRow {
        DocketFixtureRow::new(
            date,
            "PAY",
            &format!("TOTAL AMOUNT PAID: ${amount}"),
            "SMITH, JOHN",
            "",
        )
    }

    fn batch(subject: &Subject) -> (BatchOutcomes, Vec<CaseRef>) {
        let first = CaseRef::parse("https://courts.example/dockets/GetCaseInformation.aspx?db=tulsa&number=CF-2023-10")
            .unwrap();
        let second = CaseRef::new("CF-2023-11");
        let missing = CaseRef::new("CF-2023-12");
        let documents = vec![
            CaseDocument {
                case: first.clone(),
                html: docket_page(&[
                    DocketFixtureRow::new("01-02-2023", "ACCOUNT", "FINE", "SMITH, JOHN", "$ 300.00"),
                    payment("01-15-2023", "25.00"),
                    payment("02-15-2023", "25.00"),
                ]),
            },
            CaseDocument {
                case: second.clone(),
                html: docket_page(&[
                    DocketFixtureRow::new("03-02-2023", "ACCOUNT", "COSTS", "SMITH, JOHN", "$ 99.999"),
                    payment("03-15-2023", "10.00"),
                    payment("05-15-2023", "10.00"),
                ]),
            },
            CaseDocument {
                case: missing.clone(),
                html: "<html><body>Nothing here.</body></html>".to_string(),
            },
        ];
        let metrics = MetricsCollector::new();
        let outcomes = LedgerBatch::new(subject, &metrics).run_documents(&documents);
        (outcomes, vec![first, second, missing])
    }

    #[test]
    fn test_summary_adds_up_across_cases() {
        let subject = Subject::new("John", "Smith");
        let (outcomes, cases) = batch(&subject);
        let report = BatchReport::from_outcomes(&subject, &outcomes, &cases);

        assert_eq!(report.summary.total_cases_searched, 3);
        assert_eq!(report.summary.total_fees_issued, dec("400.00"));
        assert_eq!(report.summary.total_fees_paid, dec("70.00"));
        assert_eq!(report.summary.total_paid_months, 4);
        assert_eq!(report.summary.max_consecutive_months_individual, 2);
        // Jan, Feb, Mar back to back once both cases share a calendar.
        assert_eq!(report.summary.max_consecutive_months_all_cases, 3);
        assert_eq!(report.summary.combined_streak_end, Some(MonthKey::new(2023, 3)));
    }

    #[test]
    fn test_failed_cases_are_listed_not_dropped() {
        let subject = Subject::new("John", "Smith");
        let (outcomes, cases) = batch(&subject);
        let report = BatchReport::from_outcomes(&subject, &outcomes, &cases);

        assert_eq!(report.cases.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].case_number, "CF-2023-12");
        assert!(report.skipped[0].no_data);
    }

    #[test]
    fn test_case_rows_carry_url_and_rounded_money() {
        let subject = Subject::new("John", "Smith");
        let (outcomes, cases) = batch(&subject);
        let report = BatchReport::from_outcomes(&subject, &outcomes, &cases);

        let first = &report.cases[0];
        assert_eq!(first.case_number, "CF-2023-10");
        assert!(first.url.as_deref().unwrap().contains("number=CF-2023-10"));
        assert_eq!(report.cases[1].url, None);
        assert_eq!(report.cases[1].total_amount_owed, dec("100.00"));
    }

    #[test]
    fn test_overflowing_case_totals_are_left_out() {
        let huge = Decimal::from_str("50000000000000000000000000000").unwrap();
        let total = running_total(
            vec![("CF-1", huge), ("CF-2", huge), ("CF-3", dec("1"))].into_iter(),
        );
        assert_eq!(total, Decimal::from_str("50000000000000000000000000001").unwrap());
    }

    #[test]
    fn test_empty_batch_reports_zeroes() {
        let subject = Subject::new("John", "Smith");
        let report = BatchReport::from_outcomes(&subject, &BatchOutcomes::new(), &[]);
        assert_eq!(report.summary.total_cases_searched, 0);
        assert_eq!(report.summary.total_fees_paid, Decimal::ZERO);
        assert_eq!(report.summary.max_consecutive_months_all_cases, 0);
        assert_eq!(report.summary.combined_streak_start, None);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let subject = Subject::new("John", "Smith");
        let mut outcomes = BatchOutcomes::new();
        outcomes.insert(
            "CF-2023-1".to_string(),
            Err(LedgerError::NoDateColumn { case_number: "CF-2023-1".into() }),
        );
        let report = BatchReport::from_outcomes(&subject, &outcomes, &[]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["subject"], "John Smith");
        assert_eq!(json["skipped"][0]["no_data"], true);
        assert!(json.get("metrics").is_none());
    }
}
