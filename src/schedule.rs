// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Date arithmetic for recurring schedules and budget windows.
//!
//! Calendar-month steps clamp to the last day of the target month, so
//! 2025-01-31 + monthly is 2025-02-28. Multi-step schedules are always
//! computed from their anchor in one jump, never by chaining single steps,
//! which keeps a Jan-31 schedule on the last day of every month.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::{BudgetError, Result};
use crate::models::{BudgetPeriod, Frequency};

enum Step {
    Days(u64),
    Months(u32),
}

fn step(freq: Frequency) -> Step {
    match freq {
        Frequency::Daily => Step::Days(1),
        Frequency::Weekly => Step::Days(7),
        Frequency::Biweekly => Step::Days(14),
        Frequency::Monthly => Step::Months(1),
        Frequency::Quarterly => Step::Months(3),
        Frequency::Yearly => Step::Months(12),
    }
}

fn out_of_range(date: NaiveDate) -> BudgetError {
    BudgetError::invalid(format!("date arithmetic overflowed from {}", date))
}

/// The next occurrence one step after `date`.
pub fn advance(date: NaiveDate, freq: Frequency) -> Result<NaiveDate> {
    occurrence(date, freq, 1)
}

/// The `n`-th occurrence counted from `anchor` (the anchor itself is `n = 0`).
pub fn occurrence(anchor: NaiveDate, freq: Frequency, n: u32) -> Result<NaiveDate> {
    let next = match step(freq) {
        Step::Days(d) => anchor.checked_add_days(Days::new(d * u64::from(n))),
        Step::Months(m) => m
            .checked_mul(n)
            .and_then(|total| anchor.checked_add_months(Months::new(total))),
    };
    next.ok_or_else(|| out_of_range(anchor))
}

/// Index of the first occurrence strictly after `after`.
fn first_index_after(anchor: NaiveDate, freq: Frequency, after: NaiveDate) -> Result<u32> {
    if anchor > after {
        return Ok(0);
    }
    // Start from an estimate that is never past the answer, then walk forward.
    let mut n: u32 = match step(freq) {
        Step::Days(d) => {
            let elapsed = (after - anchor).num_days() as u64;
            u32::try_from(elapsed / d).map_err(|_| out_of_range(anchor))?
        }
        Step::Months(m) => {
            let months = (after.year() - anchor.year()) * 12 + after.month() as i32
                - anchor.month() as i32;
            (months.max(0) as u32 / m).saturating_sub(1)
        }
    };
    while occurrence(anchor, freq, n)? <= after {
        n += 1;
    }
    Ok(n)
}

/// First occurrence of the schedule anchored at `anchor` that falls strictly after `after`.
pub fn next_after(anchor: NaiveDate, freq: Frequency, after: NaiveDate) -> Result<NaiveDate> {
    let n = first_index_after(anchor, freq, after)?;
    occurrence(anchor, freq, n)
}

/// Whether `date` is one of the schedule's occurrences.
pub fn is_on_schedule(anchor: NaiveDate, freq: Frequency, date: NaiveDate) -> Result<bool> {
    if date < anchor {
        return Ok(false);
    }
    let n = first_index_after(anchor, freq, date)?;
    Ok(n > 0 && occurrence(anchor, freq, n - 1)? == date)
}

/// Half-open `[from, to)` budget window anchored at `start` that contains `as_of`.
/// Dates before `start` fall into the first window.
pub fn period_window(
    start: NaiveDate,
    period: BudgetPeriod,
    as_of: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let freq = Frequency::from(period);
    if as_of < start {
        return Ok((start, occurrence(start, freq, 1)?));
    }
    let n = first_index_after(start, freq, as_of)?;
    Ok((occurrence(start, freq, n - 1)?, occurrence(start, freq, n)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn advance_fixed_steps() {
        assert_eq!(advance(d(2025, 3, 1), Frequency::Daily).unwrap(), d(2025, 3, 2));
        assert_eq!(advance(d(2025, 3, 1), Frequency::Weekly).unwrap(), d(2025, 3, 8));
        assert_eq!(advance(d(2025, 3, 1), Frequency::Biweekly).unwrap(), d(2025, 3, 15));
        assert_eq!(advance(d(2025, 12, 31), Frequency::Daily).unwrap(), d(2026, 1, 1));
    }

    #[test]
    fn advance_calendar_steps() {
        assert_eq!(advance(d(2025, 1, 15), Frequency::Monthly).unwrap(), d(2025, 2, 15));
        assert_eq!(advance(d(2025, 11, 15), Frequency::Quarterly).unwrap(), d(2026, 2, 15));
        assert_eq!(advance(d(2025, 6, 30), Frequency::Yearly).unwrap(), d(2026, 6, 30));
    }

    #[test]
    fn month_end_clamps() {
        assert_eq!(advance(d(2025, 1, 31), Frequency::Monthly).unwrap(), d(2025, 2, 28));
        assert_eq!(advance(d(2024, 1, 31), Frequency::Monthly).unwrap(), d(2024, 2, 29));
        assert_eq!(advance(d(2024, 2, 29), Frequency::Yearly).unwrap(), d(2025, 2, 28));
        assert_eq!(advance(d(2025, 11, 30), Frequency::Quarterly).unwrap(), d(2026, 2, 28));
    }

    #[test]
    fn weekly_advance_inverts() {
        let mut day = d(2024, 12, 20);
        for _ in 0..30 {
            let next = advance(day, Frequency::Weekly).unwrap();
            assert_eq!(next - chrono::Duration::days(7), day);
            day = next;
        }
    }

    #[test]
    fn occurrence_does_not_drift() {
        let jan31 = d(2025, 1, 31);
        assert_eq!(occurrence(jan31, Frequency::Monthly, 1).unwrap(), d(2025, 2, 28));
        assert_eq!(occurrence(jan31, Frequency::Monthly, 2).unwrap(), d(2025, 3, 31));
        assert_eq!(occurrence(jan31, Frequency::Monthly, 3).unwrap(), d(2025, 4, 30));
        assert_eq!(occurrence(jan31, Frequency::Monthly, 0).unwrap(), jan31);
    }

    #[test]
    fn next_after_is_strict() {
        let anchor = d(2025, 1, 31);
        assert_eq!(
            next_after(anchor, Frequency::Monthly, d(2025, 2, 28)).unwrap(),
            d(2025, 3, 31)
        );
        assert_eq!(
            next_after(anchor, Frequency::Monthly, d(2025, 2, 27)).unwrap(),
            d(2025, 2, 28)
        );
        assert_eq!(next_after(anchor, Frequency::Monthly, d(2024, 5, 1)).unwrap(), anchor);
        assert_eq!(
            next_after(d(2025, 1, 1), Frequency::Biweekly, d(2025, 1, 15)).unwrap(),
            d(2025, 1, 29)
        );
    }

    #[test]
    fn schedule_membership() {
        let anchor = d(2025, 1, 31);
        assert!(is_on_schedule(anchor, Frequency::Monthly, d(2025, 4, 30)).unwrap());
        assert!(!is_on_schedule(anchor, Frequency::Monthly, d(2025, 4, 29)).unwrap());
        assert!(is_on_schedule(anchor, Frequency::Monthly, anchor).unwrap());
        assert!(!is_on_schedule(anchor, Frequency::Monthly, d(2024, 12, 31)).unwrap());
    }

    #[test]
    fn window_contains_as_of() {
        let (from, to) =
            period_window(d(2025, 1, 1), BudgetPeriod::Monthly, d(2025, 3, 17)).unwrap();
        assert_eq!((from, to), (d(2025, 3, 1), d(2025, 4, 1)));

        let (from, to) =
            period_window(d(2025, 1, 1), BudgetPeriod::Monthly, d(2025, 3, 1)).unwrap();
        assert_eq!((from, to), (d(2025, 3, 1), d(2025, 4, 1)));

        let (from, to) =
            period_window(d(2025, 1, 6), BudgetPeriod::Weekly, d(2025, 1, 19)).unwrap();
        assert_eq!((from, to), (d(2025, 1, 13), d(2025, 1, 20)));

        let (from, to) =
            period_window(d(2025, 2, 1), BudgetPeriod::Quarterly, d(2025, 1, 10)).unwrap();
        assert_eq!((from, to), (d(2025, 2, 1), d(2025, 5, 1)));
    }
}
