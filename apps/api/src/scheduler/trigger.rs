#![allow(dead_code)]

//! Next-trigger computation.
//!
//! Pure calendar math: no clock reads, no I/O, no mutation. The reference
//! instant is always the `now` argument, so every result is replayable.
//!
//! Postcondition on every branch: the returned instant is strictly greater
//! than `now` — equality counts as "passed", which is what prevents a
//! dispatcher from re-firing the same instant in a loop.

use anyhow::anyhow;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::errors::AppError;
use crate::models::alert::Frequency;
use crate::scheduler::schedule::Schedule;

/// Computes the next future instant at which a schedule should fire.
///
/// - `daily`: today at the scheduled time, or tomorrow when that has passed.
/// - `weekly`: today at the scheduled time, or one week later when passed.
/// - `monthly`: today at the scheduled time, or the same day-of-month next
///   month; a short target month clamps to its last day (Jan 31 → Feb 29).
/// - `custom`: the earliest date from today onward whose weekday is in the
///   set and whose combined instant is strictly after `now`, wrapping into
///   next week when nothing remains in this one.
pub fn next_trigger(schedule: &Schedule, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
    let today = now.date_naive();
    let at = |date: NaiveDate| date.and_time(schedule.time).and_utc();

    match schedule.frequency {
        Frequency::Daily => {
            let candidate = at(today);
            if candidate > now {
                Ok(candidate)
            } else {
                Ok(at(today + Duration::days(1)))
            }
        }
        Frequency::Weekly => {
            let candidate = at(today);
            if candidate > now {
                Ok(candidate)
            } else {
                Ok(at(today + Duration::days(7)))
            }
        }
        Frequency::Monthly => {
            let candidate = at(today);
            if candidate > now {
                Ok(candidate)
            } else {
                // checked_add_months clamps the day-of-month for us.
                let next_month = today
                    .checked_add_months(Months::new(1))
                    .ok_or_else(|| anyhow!("date overflow advancing {today} by one month"))?;
                Ok(at(next_month))
            }
        }
        Frequency::Custom => {
            if schedule.days_of_week.is_empty() {
                return Err(AppError::InvalidSchedule(
                    "custom frequency requires at least one day in daysOfWeek".to_string(),
                ));
            }
            // Offset 7 covers the wrap: today's weekday again, next week.
            for offset in 0..=7 {
                let date = today + Duration::days(offset);
                let matches_day = schedule
                    .days_of_week
                    .iter()
                    .any(|day| day.to_chrono() == date.weekday());
                if matches_day {
                    let candidate = at(date);
                    if candidate > now {
                        return Ok(candidate);
                    }
                }
            }
            // A non-empty set always matches within 8 scanned days.
            Err(AppError::Internal(anyhow!(
                "no qualifying weekday within a week of {today}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert::DayOfWeek;
    use chrono::{NaiveTime, TimeZone};
    use std::collections::BTreeSet;

    fn schedule(time: &str, frequency: Frequency, days: &[DayOfWeek]) -> Schedule {
        Schedule {
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            frequency,
            days_of_week: days.iter().copied().collect(),
            snooze_minutes: 15,
            max_snoozes: 3,
        }
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_daily_later_today() {
        let s = schedule("08:00", Frequency::Daily, &[]);
        let now = utc(2024, 1, 1, 7, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 1, 8, 0, 0));
    }

    #[test]
    fn test_daily_rolls_to_tomorrow_when_passed() {
        let s = schedule("08:00", Frequency::Daily, &[]);
        let now = utc(2024, 1, 1, 9, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 2, 8, 0, 0));
    }

    #[test]
    fn test_daily_exact_instant_counts_as_passed() {
        let s = schedule("08:00", Frequency::Daily, &[]);
        let now = utc(2024, 1, 1, 8, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 2, 8, 0, 0));
    }

    #[test]
    fn test_daily_across_year_boundary() {
        let s = schedule("22:00", Frequency::Daily, &[]);
        let now = utc(2023, 12, 31, 23, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 1, 22, 0, 0));
    }

    #[test]
    fn test_daily_into_leap_day() {
        let s = schedule("06:30", Frequency::Daily, &[]);
        let now = utc(2024, 2, 28, 12, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 2, 29, 6, 30, 0));
    }

    #[test]
    fn test_weekly_later_today() {
        let s = schedule("10:00", Frequency::Weekly, &[]);
        let now = utc(2024, 1, 1, 9, 59, 59);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 1, 10, 0, 0));
    }

    #[test]
    fn test_weekly_advances_seven_days_when_passed() {
        let s = schedule("10:00", Frequency::Weekly, &[]);
        let now = utc(2024, 1, 1, 10, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 8, 10, 0, 0));
    }

    #[test]
    fn test_monthly_later_today() {
        let s = schedule("09:00", Frequency::Monthly, &[]);
        let now = utc(2024, 4, 15, 8, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 4, 15, 9, 0, 0));
    }

    #[test]
    fn test_monthly_same_day_next_month() {
        let s = schedule("09:00", Frequency::Monthly, &[]);
        let now = utc(2024, 4, 15, 10, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 5, 15, 9, 0, 0));
    }

    #[test]
    fn test_monthly_clamps_day_31_to_30_day_month() {
        let s = schedule("08:00", Frequency::Monthly, &[]);
        let now = utc(2024, 3, 31, 9, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 4, 30, 8, 0, 0));
    }

    #[test]
    fn test_monthly_clamps_jan_31_to_leap_february() {
        let s = schedule("08:00", Frequency::Monthly, &[]);
        let now = utc(2024, 1, 31, 9, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 2, 29, 8, 0, 0));
    }

    #[test]
    fn test_monthly_clamps_jan_31_to_non_leap_february() {
        let s = schedule("08:00", Frequency::Monthly, &[]);
        let now = utc(2023, 1, 31, 9, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2023, 2, 28, 8, 0, 0));
    }

    #[test]
    fn test_monthly_across_year_boundary() {
        let s = schedule("08:00", Frequency::Monthly, &[]);
        let now = utc(2023, 12, 15, 9, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 15, 8, 0, 0));
    }

    #[test]
    fn test_custom_same_day_when_time_ahead() {
        // 2024-01-01 is a Monday.
        let s = schedule("18:00", Frequency::Custom, &[DayOfWeek::Monday]);
        let now = utc(2024, 1, 1, 9, 0, 0);
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 1, 18, 0, 0));
    }

    #[test]
    fn test_custom_skips_to_next_listed_day() {
        let s = schedule(
            "08:00",
            Frequency::Custom,
            &[DayOfWeek::Monday, DayOfWeek::Thursday],
        );
        let now = utc(2024, 1, 1, 9, 0, 0); // Monday, 08:00 already passed
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 4, 8, 0, 0));
    }

    #[test]
    fn test_custom_wraps_to_next_week() {
        let s = schedule("08:00", Frequency::Custom, &[DayOfWeek::Monday]);
        let now = utc(2024, 1, 1, 9, 0, 0); // Monday after the slot
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 8, 8, 0, 0));
    }

    #[test]
    fn test_custom_earlier_weekday_in_following_week() {
        // Friday reference; only Tuesday listed → next Tuesday.
        let s = schedule("08:00", Frequency::Custom, &[DayOfWeek::Tuesday]);
        let now = utc(2024, 1, 5, 12, 0, 0); // Friday
        assert_eq!(next_trigger(&s, now).unwrap(), utc(2024, 1, 9, 8, 0, 0));
    }

    #[test]
    fn test_custom_empty_days_rejected() {
        let s = schedule("08:00", Frequency::Custom, &[]);
        let err = next_trigger(&s, utc(2024, 1, 1, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, AppError::InvalidSchedule(_)));
    }

    #[test]
    fn test_result_is_strictly_future_for_all_frequencies() {
        let times = ["00:00", "08:00", "12:34", "23:59"];
        let nows = [
            utc(2024, 1, 1, 0, 0, 0),
            utc(2024, 2, 29, 23, 59, 0),
            utc(2023, 12, 31, 12, 0, 0),
            utc(2024, 6, 30, 8, 0, 0),
        ];
        let frequencies = [
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Monthly,
            Frequency::Custom,
        ];
        for time in times {
            for now in nows {
                for frequency in frequencies {
                    let s = schedule(time, frequency, &[DayOfWeek::Sunday, DayOfWeek::Wednesday]);
                    let trigger = next_trigger(&s, now).unwrap();
                    assert!(
                        trigger > now,
                        "{frequency} at {time} from {now} produced non-future {trigger}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_idempotent_for_identical_inputs() {
        let s = schedule("07:45", Frequency::Custom, &[DayOfWeek::Saturday]);
        let now = utc(2024, 1, 3, 11, 11, 11);
        assert_eq!(next_trigger(&s, now).unwrap(), next_trigger(&s, now).unwrap());
    }
}
