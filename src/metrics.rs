// ═══════════════════════════════════════════════════════════════
// METRICS COLLECTOR - Because if you can't count it, it didn't happen
// ═══════════════════════════════════════════════════════════════
//
// Atomic counters shared by every rayon worker in a batch. They only ever
// go up, they never feed back into a ledger, and at the end of the run
// they are frozen into a serializable snapshot for the report.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

use crate::error::LedgerError;
use crate::models::{ExtractionStrategy, LedgerResult};

/// The metrics snapshot - what gets serialized next to the report
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub cases_attempted: u64,
    pub cases_succeeded: u64,
    pub cases_without_data: u64,
    pub cases_unavailable: u64,
    pub party_filter_fallbacks: u64,
    pub issued_entries: u64,
    pub paid_entries: u64,
    pub transfer_recoveries: u64,
    pub elapsed_ms: u64,
    pub cases_per_second: f64,
}

/// Thread-safe atomic metrics collector
pub struct MetricsCollector {
    cases_attempted: AtomicU64,
    cases_succeeded: AtomicU64,
    cases_without_data: AtomicU64,
    cases_unavailable: AtomicU64,
    party_filter_fallbacks: AtomicU64,
    issued_entries: AtomicU64,
    paid_entries: AtomicU64,
    transfer_recoveries: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            cases_attempted: AtomicU64::new(0),
            cases_succeeded: AtomicU64::new(0),
            cases_without_data: AtomicU64::new(0),
            cases_unavailable: AtomicU64::new(0),
            party_filter_fallbacks: AtomicU64::new(0),
            issued_entries: AtomicU64::new(0),
            paid_entries: AtomicU64::new(0),
            transfer_recoveries: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_outcome(&self, outcome: &Result<LedgerResult, LedgerError>) {
        self.cases_attempted.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Ok(result) => self.record_success(result),
            Err(err) if err.is_no_data() => {
                self.cases_without_data.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.cases_unavailable.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn record_success(&self, result: &LedgerResult) {
        self.cases_succeeded.fetch_add(1, Ordering::Relaxed);
        if result.party_filter.is_some() {
            self.party_filter_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        self.issued_entries
            .fetch_add(result.fee_table_issued.len() as u64, Ordering::Relaxed);
        self.paid_entries
            .fetch_add(result.fee_table_paid.len() as u64, Ordering::Relaxed);
        let recoveries = result
            .fee_table_paid
            .iter()
            .filter(|e| e.strategy == ExtractionStrategy::NameTransferRecovery)
            .count();
        self.transfer_recoveries
            .fetch_add(recoveries as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let elapsed = self.start_time.elapsed();
        let attempted = self.cases_attempted.load(Ordering::Relaxed);
        let secs = elapsed.as_secs_f64();
        let cases_per_second = if secs > 0.0 { attempted as f64 / secs } else { 0.0 };

        MetricsSnapshot {
            cases_attempted: attempted,
            cases_succeeded: self.cases_succeeded.load(Ordering::Relaxed),
            cases_without_data: self.cases_without_data.load(Ordering::Relaxed),
            cases_unavailable: self.cases_unavailable.load(Ordering::Relaxed),
            party_filter_fallbacks: self.party_filter_fallbacks.load(Ordering::Relaxed),
            issued_entries: self.issued_entries.load(Ordering::Relaxed),
            paid_entries: self.paid_entries.load(Ordering::Relaxed),
            transfer_recoveries: self.transfer_recoveries.load(Ordering::Relaxed),
            elapsed_ms: elapsed.as_millis() as u64,
            cases_per_second,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_split_by_kind() {
        let metrics = MetricsCollector::new();
        metrics.record_outcome(&Err(LedgerError::NoDocketData { case_number: "A".into() }));
        metrics.record_outcome(&Err(LedgerError::Source {
            case_number: "B".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        }));
        let snap = metrics.snapshot();
        assert_eq!(snap.cases_attempted, 2);
        assert_eq!(snap.cases_without_data, 1);
        assert_eq!(snap.cases_unavailable, 1);
        assert_eq!(snap.cases_succeeded, 0);
    }
}
