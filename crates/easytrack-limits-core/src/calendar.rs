// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! UTC calendar arithmetic for period alignment.
//!
//! Everything here is a pure function of its inputs.  Dates are converted
//! with the days-from-civil algorithm over the proleptic Gregorian calendar
//! (4/100/400 leap rule), so results are identical on every platform and no
//! date library is involved.
//!
//! The calendar is partitioned into consecutive periods of
//! [`PeriodDuration`] months anchored on January 1: for month `M` the period
//! starts at month `M - ((M - 1) mod d)`.
//!
//! Results are exact for every timestamp in `[0, 2⁵³ − 1)`.  Outside that
//! range arithmetic saturates at [`u64::MAX`] instead of wrapping.

use crate::types::{PeriodDuration, PeriodWindow, Timestamp, SECONDS_PER_DAY};

/// Days between 0000-03-01 and 1970-01-01 in the proleptic calendar.
const UNIX_EPOCH_DAY_OFFSET: i64 = 719_468;
const DAYS_PER_ERA: i64 = 146_097;

/// A UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    /// Gregorian year.
    pub year: i64,
    /// Month of the year, `1..=12`.
    pub month: u32,
    /// Day of the month, `1..=31`.
    pub day: u32,
}

impl CalendarDate {
    /// Construct a date without validation.
    pub const fn new(year: i64, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

/// Gregorian leap-year rule.
pub const fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`.  Returns `0` for months outside
/// `1..=12`.
pub const fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since 1970-01-01 for a civil date.
fn days_from_civil(date: CalendarDate) -> i64 {
    let month = i64::from(date.month);
    let year = if month <= 2 { date.year - 1 } else { date.year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let shifted_month = if month > 2 { month - 3 } else { month + 9 };
    let day_of_year = (153 * shifted_month + 2) / 5 + i64::from(date.day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * DAYS_PER_ERA + day_of_era - UNIX_EPOCH_DAY_OFFSET
}

/// Civil date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> CalendarDate {
    let shifted = days + UNIX_EPOCH_DAY_OFFSET;
    let era = shifted.div_euclid(DAYS_PER_ERA);
    let day_of_era = shifted - era * DAYS_PER_ERA;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * shifted_month + 2) / 5 + 1) as u32;
    let month = (if shifted_month < 10 { shifted_month + 3 } else { shifted_month - 9 }) as u32;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    CalendarDate { year, month, day }
}

/// Convert a civil day count plus seconds-of-day back to a timestamp,
/// saturating at the ends of the `u64` range.
fn to_timestamp(days: i64, seconds_of_day: u64) -> Timestamp {
    let seconds = i128::from(days) * i128::from(SECONDS_PER_DAY) + i128::from(seconds_of_day);
    if seconds < 0 {
        0
    } else {
        u64::try_from(seconds).unwrap_or(u64::MAX)
    }
}

/// UTC date containing `timestamp`.
///
/// # Examples
///
/// ```rust
/// use easytrack_limits_core::calendar::{timestamp_to_date, CalendarDate};
///
/// assert_eq!(timestamp_to_date(0), CalendarDate::new(1970, 1, 1));
/// assert_eq!(timestamp_to_date(1_709_164_800), CalendarDate::new(2024, 2, 29));
/// ```
pub fn timestamp_to_date(timestamp: Timestamp) -> CalendarDate {
    // u64 / 86_400 always fits in i64.
    civil_from_days((timestamp / SECONDS_PER_DAY) as i64)
}

/// Timestamp of `00:00:00 UTC` on the given date.
///
/// Out-of-range days are not normalised; callers pass valid dates.
pub fn timestamp_from_date(year: i64, month: u32, day: u32) -> Timestamp {
    to_timestamp(days_from_civil(CalendarDate::new(year, month, day)), 0)
}

/// Add `months` calendar months to `timestamp`.
///
/// The time of day is kept.  The day of month is kept where the target
/// month has it and otherwise clamped to that month's last day, so
/// January 31 plus one month is February 28 (or 29).
///
/// # Examples
///
/// ```rust
/// use easytrack_limits_core::calendar::{add_months, timestamp_from_date};
///
/// let jan_31 = timestamp_from_date(2024, 1, 31);
/// assert_eq!(add_months(jan_31, 1), timestamp_from_date(2024, 2, 29));
/// assert_eq!(add_months(jan_31, 12), timestamp_from_date(2025, 1, 31));
/// ```
pub fn add_months(timestamp: Timestamp, months: u32) -> Timestamp {
    let seconds_of_day = timestamp % SECONDS_PER_DAY;
    let date = timestamp_to_date(timestamp);

    let month_index = date.year * 12 + i64::from(date.month - 1) + i64::from(months);
    let year = month_index.div_euclid(12);
    let month = (month_index.rem_euclid(12) + 1) as u32;
    let day = date.day.min(days_in_month(year, month));

    to_timestamp(days_from_civil(CalendarDate::new(year, month, day)), seconds_of_day)
}

/// First month (`1..=12`) of the period containing `month`.
///
/// # Examples
///
/// ```rust
/// use easytrack_limits_core::calendar::first_month_in_period;
/// use easytrack_limits_core::types::PeriodDuration;
///
/// assert_eq!(first_month_in_period(8, PeriodDuration::Quarter), 7);
/// assert_eq!(first_month_in_period(11, PeriodDuration::HalfYear), 7);
/// assert_eq!(first_month_in_period(12, PeriodDuration::Year), 1);
/// ```
pub const fn first_month_in_period(month: u32, duration: PeriodDuration) -> u32 {
    month - ((month - 1) % duration.months())
}

/// Start of the calendar-aligned period containing `timestamp`.
///
/// A timestamp exactly on a boundary belongs to the period that starts
/// there.
pub fn start_of_period(timestamp: Timestamp, duration: PeriodDuration) -> Timestamp {
    let date = timestamp_to_date(timestamp);
    timestamp_from_date(date.year, first_month_in_period(date.month, duration), 1)
}

/// Exclusive end of the calendar-aligned period containing `timestamp`.
///
/// Handles year rollover: a half-year period containing November ends on
/// January 1 of the next year.
pub fn end_of_period(timestamp: Timestamp, duration: PeriodDuration) -> Timestamp {
    add_months(start_of_period(timestamp, duration), duration.months())
}

/// The `[start, end)` window containing `timestamp`.
pub fn period_window(timestamp: Timestamp, duration: PeriodDuration) -> PeriodWindow {
    let start = start_of_period(timestamp, duration);
    PeriodWindow {
        start,
        end: add_months(start, duration.months()),
    }
}

/// Whether `window` is exactly the aligned period for `duration` that
/// starts at `window.start`.
pub fn is_aligned_window(window: &PeriodWindow, duration: PeriodDuration) -> bool {
    window.start < window.end && period_window(window.start, duration) == *window
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 3_600;

    #[test]
    fn test_timestamp_to_date_vectors() {
        assert_eq!(timestamp_to_date(0), CalendarDate::new(1970, 1, 1));
        assert_eq!(timestamp_to_date(1_709_164_800), CalendarDate::new(2024, 2, 29));
        assert_eq!(timestamp_to_date(1_672_531_200), CalendarDate::new(2023, 1, 1));
        assert_eq!(timestamp_to_date(1_672_617_570), CalendarDate::new(2023, 1, 1));
        assert_eq!(timestamp_to_date(1_672_531_170), CalendarDate::new(2022, 12, 31));
    }

    #[test]
    fn test_timestamp_from_date_vectors() {
        assert_eq!(timestamp_from_date(1970, 1, 1), 0);
        assert_eq!(timestamp_from_date(2024, 2, 29), 1_709_164_800);
        assert_eq!(timestamp_from_date(2023, 1, 1), 1_672_531_200);
        assert_eq!(timestamp_from_date(2022, 12, 31), 1_672_444_800);
    }

    #[test]
    fn test_daily_walk_is_consistent() {
        // 2020-01-01 .. 2025-01-01, one day at a time.
        let mut timestamp = 1_577_836_800;
        let mut expected = CalendarDate::new(2020, 1, 1);
        while timestamp < 1_735_689_600 {
            assert_eq!(timestamp_to_date(timestamp), expected);
            assert_eq!(
                timestamp_from_date(expected.year, expected.month, expected.day),
                timestamp
            );

            expected = if expected.day < days_in_month(expected.year, expected.month) {
                CalendarDate::new(expected.year, expected.month, expected.day + 1)
            } else if expected.month < 12 {
                CalendarDate::new(expected.year, expected.month + 1, 1)
            } else {
                CalendarDate::new(expected.year + 1, 1, 1)
            };
            timestamp += SECONDS_PER_DAY;
        }
        assert_eq!(expected, CalendarDate::new(2025, 1, 1));
    }

    #[test]
    fn test_leap_year_rule() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2400, 2), 29);
    }

    #[test]
    fn test_add_months_clamps_end_of_month() {
        let jan_31_2020 = 1_580_428_800;
        assert_eq!(timestamp_to_date(jan_31_2020), CalendarDate::new(2020, 1, 31));
        assert_eq!(add_months(jan_31_2020, 1), 1_582_934_400); // 2020-02-29
        assert_eq!(add_months(jan_31_2020, 12), 1_612_051_200); // 2021-01-31
        assert_eq!(add_months(timestamp_from_date(2021, 1, 31), 1), 1_614_470_400); // 2021-02-28
        assert_eq!(
            add_months(timestamp_from_date(2024, 3, 31), 6),
            timestamp_from_date(2024, 9, 30)
        );
    }

    #[test]
    fn test_add_months_keeps_time_of_day() {
        let start = timestamp_from_date(2023, 11, 15) + 13 * HOUR + 7;
        assert_eq!(add_months(start, 2), timestamp_from_date(2024, 1, 15) + 13 * HOUR + 7);
    }

    #[test]
    fn test_add_months_repeated_steps() {
        for start in [1_577_836_800u64, 1_580_428_800] {
            let start_day = timestamp_to_date(start).day;
            for step in [1u32, 2, 3, 6, 8, 12, 24] {
                let mut current = start;
                for _ in 0..120 {
                    let before = timestamp_to_date(current);
                    let after = timestamp_to_date(add_months(current, step));
                    let months_apart = (after.year - before.year) * 12
                        + i64::from(after.month)
                        - i64::from(before.month);
                    assert_eq!(months_apart, i64::from(step));
                    assert_eq!(
                        after.day,
                        before.day.min(days_in_month(after.year, after.month))
                    );
                    current = add_months(current, 1);
                }
                // Stepping one month at a time clamps permanently once it
                // passes a short month.
                assert!(timestamp_to_date(current).day <= start_day);
            }
        }
    }

    #[test]
    fn test_first_month_for_every_duration() {
        for duration in PeriodDuration::ALL {
            let d = duration.months();
            for month in 1..=12u32 {
                let first = first_month_in_period(month, duration);
                assert_eq!((first - 1) % d, 0);
                assert!(first <= month && month < first + d);
            }
        }
        assert_eq!(first_month_in_period(8, PeriodDuration::Quarter), 7);
        assert_eq!(first_month_in_period(4, PeriodDuration::TwoMonths), 3);
        assert_eq!(first_month_in_period(6, PeriodDuration::HalfYear), 1);
    }

    #[test]
    fn test_period_start_and_end_vectors() {
        let cases: [([u64; 5], PeriodDuration, u64, u64); 5] = [
            (
                [1_640_995_200, 1_640_998_800, 1_642_208_400, 1_643_670_000, 1_643_673_599],
                PeriodDuration::Month,
                1_640_995_200,
                1_643_673_600,
            ),
            (
                [1_646_092_800, 1_646_096_400, 1_648_774_800, 1_651_359_600, 1_651_363_199],
                PeriodDuration::TwoMonths,
                1_646_092_800,
                1_651_363_200,
            ),
            (
                [1_648_771_200, 1_648_774_800, 1_652_576_400, 1_656_630_000, 1_656_633_599],
                PeriodDuration::Quarter,
                1_648_771_200,
                1_656_633_600,
            ),
            (
                [1_656_633_600, 1_656_637_200, 1_664_586_000, 1_672_527_600, 1_672_531_199],
                PeriodDuration::HalfYear,
                1_656_633_600,
                1_672_531_200,
            ),
            (
                [1_640_995_200, 1_640_998_800, 1_652_576_400, 1_672_527_600, 1_672_531_199],
                PeriodDuration::Year,
                1_640_995_200,
                1_672_531_200,
            ),
        ];

        for (inputs, duration, start, end) in cases {
            for timestamp in inputs {
                assert_eq!(start_of_period(timestamp, duration), start, "{duration} @ {timestamp}");
                assert_eq!(end_of_period(timestamp, duration), end, "{duration} @ {timestamp}");
            }
            let first = inputs[0];
            let last = inputs[4];
            assert!(start_of_period(first - HOUR, duration) < start);
            assert!(start_of_period(first - 1, duration) < start);
            assert!(start_of_period(last + 1, duration) > start);
            assert!(end_of_period(first - 1, duration) < end);
            assert!(end_of_period(last + 2, duration) > end);
            assert!(end_of_period(last + HOUR, duration) > end);
        }
    }

    #[test]
    fn test_year_rollover() {
        let november = timestamp_from_date(2024, 11, 20);
        let window = period_window(november, PeriodDuration::HalfYear);
        assert_eq!(window.start, timestamp_from_date(2024, 7, 1));
        assert_eq!(window.end, timestamp_from_date(2025, 1, 1));

        let december = timestamp_from_date(2024, 12, 31) + 23 * HOUR;
        assert_eq!(end_of_period(december, PeriodDuration::Month), timestamp_from_date(2025, 1, 1));
    }

    #[test]
    fn test_boundary_maps_to_own_period() {
        let boundary = timestamp_from_date(2024, 4, 1);
        assert_eq!(start_of_period(boundary, PeriodDuration::Quarter), boundary);
        assert_eq!(
            start_of_period(boundary - 1, PeriodDuration::Quarter),
            timestamp_from_date(2024, 1, 1)
        );
    }

    #[test]
    fn test_round_trip_laws() {
        // Sample once every ~10 days across 2019..2029, including leap years.
        let mut timestamp = timestamp_from_date(2019, 1, 1) + 12_345;
        let stop = timestamp_from_date(2029, 1, 1);
        while timestamp < stop {
            for duration in PeriodDuration::ALL {
                let start = start_of_period(timestamp, duration);
                let end = end_of_period(timestamp, duration);
                assert_eq!(start_of_period(start, duration), start);
                assert_eq!(start_of_period(end - 1, duration), start);
                assert_eq!(start_of_period(end, duration), end);

                let start_date = timestamp_to_date(start);
                assert_eq!(start_date.day, 1);
                assert_eq!((start_date.month - 1) % duration.months(), 0);
                assert_eq!(start % SECONDS_PER_DAY, 0);
                assert!(is_aligned_window(&period_window(timestamp, duration), duration));
            }
            timestamp += 10 * SECONDS_PER_DAY + 3_601;
        }
    }

    #[test]
    fn test_misaligned_window_detected() {
        let window = PeriodWindow {
            start: timestamp_from_date(2024, 2, 1),
            end: timestamp_from_date(2024, 5, 1),
        };
        assert!(!is_aligned_window(&window, PeriodDuration::Quarter));
        assert!(!is_aligned_window(&window, PeriodDuration::Month));
    }

    #[test]
    fn test_large_timestamps_do_not_panic() {
        let near_limit = (1u64 << 53) - 2;
        let window = period_window(near_limit, PeriodDuration::Year);
        assert!(window.start <= near_limit && near_limit < window.end);
        let _ = add_months(u64::MAX, 12);
    }
}
