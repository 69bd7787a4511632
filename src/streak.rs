// =============================================================================
// streak.rs - HOW MANY MONTHS IN A ROW?
// =============================================================================
//
// Payments are bucketed by calendar month across the whole span of the paid
// ledger, empty months included. Walking the buckets in order gives:
//
//   streak_length      longest run of consecutive months with a payment
//   total_paid_months  months with at least one payment, contiguous or not
//   streak_start/end   first and last month of the longest run
//
// Ties go to the earlier run: the streak only moves when a run is strictly
// longer than the best so far.
// =============================================================================

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{LedgerEntry, MonthKey, StreakStats};

/// One month bucket and how many payments landed in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub month: MonthKey,
    pub payments: usize,
}

/// Resample payment dates to one bucket per calendar month, from the first
/// paid month to the last, gaps included.
pub fn monthly_buckets(dates: &[NaiveDate]) -> Vec<MonthBucket> {
    let mut counts: BTreeMap<MonthKey, usize> = BTreeMap::new();
    for date in dates {
        *counts.entry(MonthKey::of(*date)).or_default() += 1;
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    let mut buckets = Vec::new();
    let mut month = first;
    while month <= last {
        buckets.push(MonthBucket {
            month,
            payments: counts.get(&month).copied().unwrap_or(0),
        });
        month = month.succ();
    }
    buckets
}

/// Streak statistics for a paid ledger. Undated entries are ignored.
pub fn longest_streak(paid: &[LedgerEntry]) -> StreakStats {
    let dates: Vec<NaiveDate> = paid.iter().filter_map(|e| e.date).collect();
    streak_over_dates(&dates)
}

pub fn streak_over_dates(dates: &[NaiveDate]) -> StreakStats {
    let buckets = monthly_buckets(dates);
    if buckets.is_empty() {
        return StreakStats::default();
    }

    let mut best = 0u32;
    let mut current = 0u32;
    let mut run_start = buckets[0].month;
    let mut best_span: Option<(MonthKey, MonthKey)> = None;
    let mut total_paid_months = 0u32;

    for bucket in &buckets {
        if bucket.payments > 0 {
            if current == 0 {
                run_start = bucket.month;
            }
            current += 1;
            total_paid_months += 1;
            if current > best {
                best = current;
                best_span = Some((run_start, bucket.month));
            }
        } else {
            current = 0;
        }
    }

    let (streak_start, streak_end) = match best_span {
        Some((start, end)) => (Some(start), Some(end)),
        None => (None, None),
    };

    let in_streak = |d: &&NaiveDate| match best_span {
        Some((start, end)) => {
            let m = MonthKey::of(**d);
            m >= start && m <= end
        }
        None => false,
    };
    let first_payment_in_streak = dates.iter().filter(in_streak).min().copied();
    let last_payment_in_streak = dates.iter().filter(in_streak).max().copied();

    debug!(
        months = buckets.len(),
        streak = best,
        paid_months = total_paid_months,
        "Payment streak computed"
    );

    StreakStats {
        streak_length: best,
        total_paid_months,
        streak_start,
        streak_end,
        first_payment_in_streak,
        last_payment_in_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_empty_ledger_has_no_streak() {
        let stats = streak_over_dates(&[]);
        assert_eq!(stats.streak_length, 0);
        assert_eq!(stats.total_paid_months, 0);
        assert_eq!(stats.streak_end, None);
        assert_eq!(longest_streak(&[]), StreakStats::default());
    }

    #[test]
    fn test_contiguous_months_form_one_streak() {
        for n in 1..=14u32 {
            let dates: Vec<NaiveDate> = (0..n)
                .map(|i| d(2022 + ((i + 5) / 12) as i32, (i + 5) % 12 + 1, 10))
                .collect();
            let stats = streak_over_dates(&dates);
            assert_eq!(stats.streak_length, n, "n = {n}");
            assert_eq!(stats.total_paid_months, n, "n = {n}");
        }
    }

    #[test]
    fn test_gap_breaks_the_streak() {
        let stats = streak_over_dates(&[d(2024, 1, 5), d(2024, 2, 20), d(2024, 4, 1)]);
        assert_eq!(stats.streak_length, 2);
        assert_eq!(stats.total_paid_months, 3);
        assert_eq!(stats.streak_start, Some(MonthKey::new(2024, 1)));
        assert_eq!(stats.streak_end, Some(MonthKey::new(2024, 2)));
        assert_eq!(stats.first_payment_in_streak, Some(d(2024, 1, 5)));
        assert_eq!(stats.last_payment_in_streak, Some(d(2024, 2, 20)));
    }

    #[test]
    fn test_several_payments_in_one_month_count_once() {
        let stats = streak_over_dates(&[d(2024, 3, 1), d(2024, 3, 15), d(2024, 3, 31)]);
        assert_eq!(stats.streak_length, 1);
        assert_eq!(stats.total_paid_months, 1);
    }

    #[test]
    fn test_later_longer_run_wins_and_ties_keep_the_first() {
        let stats = streak_over_dates(&[
            d(2023, 1, 1),
            d(2023, 2, 1),
            d(2023, 6, 1),
            d(2023, 7, 1),
            d(2023, 8, 1),
            d(2023, 11, 1),
            d(2023, 12, 1),
            d(2024, 1, 1),
        ]);
        assert_eq!(stats.streak_length, 3);
        assert_eq!(stats.total_paid_months, 8);
        assert_eq!(stats.streak_end, Some(MonthKey::new(2023, 8)));
    }

    #[test]
    fn test_buckets_span_the_year_boundary() {
        let buckets = monthly_buckets(&[d(2023, 11, 30), d(2024, 2, 1)]);
        let months: Vec<String> = buckets.iter().map(|b| b.month.to_string()).collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
        assert_eq!(buckets[1].payments, 0);
    }
}
