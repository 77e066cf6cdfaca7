// Simulation calendar: a fixed 365-day year on a real-valued hour clock.
//
// The clock is a non-negative `f64` counting hours since the start of the
// run. Days are 24 hours, years are 365 days (8760 hours), and there are no
// leap years, so every (month, day) pair maps to the same hour offset in
// every year.
//
// **Critical constraint: strictly-future scheduling.** `next_clock_time_for`
// never returns the current instant: an agent asking at exactly its target
// date is booked for the same date next year. Self-rescheduling agents rely
// on this to never activate twice in the same instant.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const HOURS_PER_DAY: f64 = 24.0;
pub const DAYS_PER_YEAR: u32 = 365;
pub const HOURS_PER_YEAR: f64 = HOURS_PER_DAY * DAYS_PER_YEAR as f64;

/// Month of the fixed calendar. February always has 28 days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Number of days in this month.
    pub const fn length(self) -> u32 {
        match self {
            Month::January => 31,
            Month::February => 28,
            Month::March => 31,
            Month::April => 30,
            Month::May => 31,
            Month::June => 30,
            Month::July => 31,
            Month::August => 31,
            Month::September => 30,
            Month::October => 31,
            Month::November => 30,
            Month::December => 31,
        }
    }

    /// Days in the year before the first of this month.
    pub const fn days_before(self) -> u32 {
        match self {
            Month::January => 0,
            Month::February => 31,
            Month::March => 59,
            Month::April => 90,
            Month::May => 120,
            Month::June => 151,
            Month::July => 181,
            Month::August => 212,
            Month::September => 243,
            Month::October => 273,
            Month::November => 304,
            Month::December => 334,
        }
    }

    /// Days in the year through the end of this month.
    pub const fn cumulative_days(self) -> u32 {
        self.days_before() + self.length()
    }

    const fn short_name(self) -> &'static str {
        match self {
            Month::January => "Jan",
            Month::February => "Feb",
            Month::March => "Mar",
            Month::April => "Apr",
            Month::May => "May",
            Month::June => "Jun",
            Month::July => "Jul",
            Month::August => "Aug",
            Month::September => "Sep",
            Month::October => "Oct",
            Month::November => "Nov",
            Month::December => "Dec",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A calendar date: a month and a 1-based day within it.
///
/// Construction validates the day against the month length, so invalid
/// combinations like Feb 30 are unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Date {
    pub month: Month,
    pub day: u32,
}

impl Date {
    pub const fn new(month: Month, day: u32) -> Self {
        assert!(day >= 1 && day <= month.length());
        Self { month, day }
    }

    /// Hours from Jan 1 00:00 to 00:00 of this date.
    pub const fn hours_past_new_year(self) -> f64 {
        (self.month.days_before() + self.day - 1) as f64 * HOURS_PER_DAY
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.day)
    }
}

/// The year-boundary sentinel date. The environment driver activates once
/// per year at 00:00 on this date.
pub const NEW_YEAR: Date = Date::new(Month::December, 31);

/// The calendar date at the given clock time.
pub fn date_for_clock(clock: f64) -> Date {
    debug_assert!(clock >= 0.0, "clock must be non-negative");
    let day_of_year = (clock % HOURS_PER_YEAR) / HOURS_PER_DAY;
    for month in Month::ALL {
        if day_of_year < month.cumulative_days() as f64 {
            let day = day_of_year as u32 - month.days_before() + 1;
            return Date::new(month, day);
        }
    }
    unreachable!("day offset {day_of_year} exceeds the year length");
}

/// The clock time of the next occurrence of `date`, strictly after `now`.
///
/// If `now` falls exactly at 00:00 of `date`, the result is the same date
/// one year later.
pub fn next_clock_time_for(date: Date, now: f64) -> f64 {
    debug_assert!(now >= 0.0, "clock must be non-negative");
    let current_year = (now / HOURS_PER_YEAR).floor();
    let hours_past_new_year = now - current_year * HOURS_PER_YEAR;
    let desired = date.hours_past_new_year();
    if desired > hours_past_new_year {
        current_year * HOURS_PER_YEAR + desired
    } else {
        (current_year + 1.0) * HOURS_PER_YEAR + desired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_zero_is_january_first() {
        assert_eq!(date_for_clock(0.0), Date::new(Month::January, 1));
        assert_eq!(date_for_clock(23.99), Date::new(Month::January, 1));
        assert_eq!(date_for_clock(24.0), Date::new(Month::January, 2));
    }

    #[test]
    fn month_boundaries() {
        // Midnight of Feb 1 is 31 days in.
        assert_eq!(date_for_clock(31.0 * 24.0), Date::new(Month::February, 1));
        // Midnight of Mar 1 is 59 days in (no leap years).
        assert_eq!(date_for_clock(59.0 * 24.0), Date::new(Month::March, 1));
        // Last hour of the year is still Dec 31.
        assert_eq!(date_for_clock(8759.5), NEW_YEAR);
        // The year wraps cleanly.
        assert_eq!(date_for_clock(HOURS_PER_YEAR), Date::new(Month::January, 1));
    }

    #[test]
    fn new_year_sentinel_is_dec_31() {
        assert_eq!(NEW_YEAR, Date::new(Month::December, 31));
        assert_eq!(date_for_clock(364.0 * 24.0), NEW_YEAR);
    }

    #[test]
    fn cumulative_day_table() {
        assert_eq!(Month::January.cumulative_days(), 31);
        assert_eq!(Month::February.cumulative_days(), 59);
        assert_eq!(Month::June.cumulative_days(), 181);
        assert_eq!(Month::December.cumulative_days(), DAYS_PER_YEAR);
    }

    #[test]
    #[should_panic]
    fn invalid_date_rejected() {
        let _ = Date::new(Month::February, 30);
    }

    #[test]
    fn next_clock_time_is_strictly_future() {
        let starts = [0.0, 13.5, 8736.0, HOURS_PER_YEAR, 3.0 * HOURS_PER_YEAR + 100.7];
        for &start in &starts {
            for month in Month::ALL {
                for day in 1..=month.length() {
                    let date = Date::new(month, day);
                    let t = next_clock_time_for(date, start);
                    assert!(t > start, "{date} from {start} gave non-future {t}");
                    assert!(
                        t - start <= HOURS_PER_YEAR + HOURS_PER_DAY,
                        "{date} from {start} gave {t}, more than a year away"
                    );
                }
            }
        }
    }

    #[test]
    fn next_clock_time_roundtrips_through_date_for_clock() {
        let starts = [0.0, 17.3, 4000.0, HOURS_PER_YEAR - 1.0, 7.0 * HOURS_PER_YEAR];
        for &start in &starts {
            for month in Month::ALL {
                for day in 1..=month.length() {
                    let date = Date::new(month, day);
                    let t = next_clock_time_for(date, start);
                    assert_eq!(date_for_clock(t), date);
                }
            }
        }
    }

    #[test]
    fn exactly_at_target_routes_to_next_year() {
        let oct1 = Date::new(Month::October, 1);
        let first = next_clock_time_for(oct1, 0.0);
        assert_eq!(next_clock_time_for(oct1, first), first + HOURS_PER_YEAR);
        // Same for the year-boundary sentinel.
        let boundary = next_clock_time_for(NEW_YEAR, 0.0);
        assert_eq!(boundary, 364.0 * 24.0);
        assert_eq!(
            next_clock_time_for(NEW_YEAR, boundary),
            boundary + HOURS_PER_YEAR
        );
    }

    #[test]
    fn january_first_from_zero_is_next_year() {
        // Time zero is already Jan 1 00:00, so the next occurrence is a
        // full year out.
        let jan1 = Date::new(Month::January, 1);
        assert_eq!(next_clock_time_for(jan1, 0.0), HOURS_PER_YEAR);
    }
}
