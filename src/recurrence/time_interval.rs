use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// RFC 5545 `FREQ` token for this unit.
    pub fn freq_token(&self) -> &'static str {
        match self {
            TimeUnit::Day => "DAILY",
            TimeUnit::Week => "WEEKLY",
            TimeUnit::Month => "MONTHLY",
            TimeUnit::Year => "YEARLY",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeUnit::Day => "Day",
            TimeUnit::Week => "Week",
            TimeUnit::Month => "Month",
            TimeUnit::Year => "Year",
        };
        f.write_str(label)
    }
}

/// A fixed stride between two consecutive periods of a schedule.
///
/// Month and year arithmetic clamps to the last valid day of the target month,
/// so Jan 31 + 1 month lands on Feb 28 (or 29) and Feb 29 + 1 year on Feb 28.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub every: u32,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub fn new(every: u32, unit: TimeUnit) -> Self {
        Self { every, unit }
    }

    pub fn next_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        self.offset(from, 1)
    }

    /// Moves `steps` whole intervals away from `anchor`.
    ///
    /// Offsets are always taken from the anchor itself, never chained, so a
    /// clamped intermediate date never shifts later occurrences.
    pub fn offset(&self, anchor: NaiveDate, steps: i64) -> Option<NaiveDate> {
        let amount = steps.checked_mul(self.every as i64)?;
        match self.unit {
            TimeUnit::Day => anchor.checked_add_signed(Duration::try_days(amount)?),
            TimeUnit::Week => anchor.checked_add_signed(Duration::try_weeks(amount)?),
            TimeUnit::Month => shift_month(anchor, i32::try_from(amount).ok()?),
            TimeUnit::Year => shift_year(anchor, i32::try_from(amount).ok()?),
        }
    }

    /// Number of whole intervals that fit between `anchor` and `reference`,
    /// rounded towards negative infinity.
    pub fn steps_between(&self, anchor: NaiveDate, reference: NaiveDate) -> i64 {
        let every = self.every.max(1) as i64;
        let units = match self.unit {
            TimeUnit::Day => (reference - anchor).num_days(),
            TimeUnit::Week => (reference - anchor).num_days().div_euclid(7),
            TimeUnit::Month => month_index(reference) - month_index(anchor),
            TimeUnit::Year => (reference.year() - anchor.year()) as i64,
        };
        units.div_euclid(every)
    }

    pub fn label(&self) -> String {
        match (self.every, self.unit) {
            (1, TimeUnit::Day) => "Daily".into(),
            (1, TimeUnit::Week) => "Weekly".into(),
            (1, TimeUnit::Month) => "Monthly".into(),
            (1, TimeUnit::Year) => "Yearly".into(),
            (n, unit) => format!("Every {} {}{}", n, unit, if n > 1 { "s" } else { "" }),
        }
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Builds a date inside `year`/`month`, clamping `day` to the month length.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Every date in the month falling on `weekday`, in ascending order.
pub fn weekdays_in_month(year: i32, month: u32, weekday: Weekday) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let lead = (7 + weekday.num_days_from_monday() as i64
        - first.weekday().num_days_from_monday() as i64)
        % 7;
    let mut dates = Vec::new();
    let mut cursor = first + Duration::days(lead);
    while cursor.month() == month {
        dates.push(cursor);
        cursor += Duration::days(7);
    }
    dates
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = date.year().checked_mul(12)? as i64 + date.month0() as i64 + months as i64;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    clamped_date(year, month, date.day())
}

fn shift_year(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year().checked_add(years)?;
    clamped_date(year, date.month(), date.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn next_date_steps_each_unit() {
        let start = date(2025, 1, 1);
        assert_eq!(
            TimeInterval::new(3, TimeUnit::Day).next_date(start),
            Some(date(2025, 1, 4))
        );
        assert_eq!(
            TimeInterval::new(2, TimeUnit::Week).next_date(start),
            Some(date(2025, 1, 15))
        );
        assert_eq!(
            TimeInterval::new(1, TimeUnit::Month).next_date(start),
            Some(date(2025, 2, 1))
        );
        assert_eq!(
            TimeInterval::new(1, TimeUnit::Year).next_date(start),
            Some(date(2026, 1, 1))
        );
    }

    #[test]
    fn month_offsets_clamp_without_drifting() {
        let monthly = TimeInterval::new(1, TimeUnit::Month);
        let anchor = date(2024, 1, 31);
        assert_eq!(monthly.offset(anchor, 1), Some(date(2024, 2, 29)));
        assert_eq!(monthly.offset(anchor, 2), Some(date(2024, 3, 31)));
        assert_eq!(monthly.offset(anchor, 3), Some(date(2024, 4, 30)));
        assert_eq!(monthly.offset(anchor, 13), Some(date(2025, 2, 28)));
        assert_eq!(monthly.offset(anchor, -2), Some(date(2023, 11, 30)));
    }

    #[test]
    fn leap_day_clamps_in_common_years() {
        let yearly = TimeInterval::new(1, TimeUnit::Year);
        let leap = date(2024, 2, 29);
        assert_eq!(yearly.offset(leap, 1), Some(date(2025, 2, 28)));
        assert_eq!(yearly.offset(leap, 4), Some(date(2028, 2, 29)));
    }

    #[test]
    fn steps_between_rounds_down() {
        let fortnight = TimeInterval::new(2, TimeUnit::Week);
        let anchor = date(2024, 1, 1);
        assert_eq!(fortnight.steps_between(anchor, date(2024, 1, 14)), 0);
        assert_eq!(fortnight.steps_between(anchor, date(2024, 1, 15)), 1);
        assert_eq!(fortnight.steps_between(anchor, date(2023, 12, 31)), -1);

        let quarterly = TimeInterval::new(3, TimeUnit::Month);
        assert_eq!(quarterly.steps_between(anchor, date(2024, 7, 1)), 2);
    }

    #[test]
    fn weekdays_in_month_lists_all_matches() {
        let fridays = weekdays_in_month(2024, 3, Weekday::Fri);
        assert_eq!(fridays.first(), Some(&date(2024, 3, 1)));
        assert_eq!(fridays.last(), Some(&date(2024, 3, 29)));
        assert_eq!(fridays.len(), 5);
    }

    #[test]
    fn labels_follow_interval() {
        assert_eq!(TimeInterval::new(1, TimeUnit::Month).label(), "Monthly");
        assert_eq!(TimeInterval::new(2, TimeUnit::Week).label(), "Every 2 Weeks");
    }
}
