use std::collections::VecDeque;

use chrono::{Datelike, Duration, NaiveDate};

use super::rule::{RecurrenceRule, WeekdaySpec};
use super::time_interval::{clamped_date, days_in_month, week_start, weekdays_in_month, TimeUnit};
use crate::errors::InvalidRuleError;

/// Upper bound on the number of periods scanned by a single iterator.
const MAX_PERIODS: u32 = 100_000;

/// Parses `rule` and lists its occurrences inside `[range_start, range_end]`.
///
/// When `series_start` is absent the rule's own `DTSTART` is used, and failing
/// that `range_start` becomes day zero of the schedule.
pub fn occurrences_in_range(
    rule: &str,
    range_start: NaiveDate,
    range_end: NaiveDate,
    series_start: Option<NaiveDate>,
) -> Result<Vec<NaiveDate>, InvalidRuleError> {
    let parsed: RecurrenceRule = rule.parse()?;
    Ok(parsed.occurrences_between(range_start, range_end, series_start))
}

pub fn occurrences_count_in_range(
    rule: &str,
    range_start: NaiveDate,
    range_end: NaiveDate,
    series_start: Option<NaiveDate>,
) -> Result<usize, InvalidRuleError> {
    let parsed: RecurrenceRule = rule.parse()?;
    Ok(parsed.count_between(range_start, range_end, series_start))
}

impl RecurrenceRule {
    pub fn anchor_for(&self, range_start: NaiveDate, series_start: Option<NaiveDate>) -> NaiveDate {
        series_start.or(self.dtstart).unwrap_or(range_start)
    }

    /// Occurrences inside the inclusive window, ascending and duplicate free.
    pub fn occurrences_between(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
        series_start: Option<NaiveDate>,
    ) -> Vec<NaiveDate> {
        if range_start > range_end {
            return Vec::new();
        }
        let anchor = self.anchor_for(range_start, series_start);
        Occurrences::new(self, anchor)
            .starting_near(range_start)
            .bounded_by(range_end)
            .skip_while(|date| *date < range_start)
            .collect()
    }

    pub fn count_between(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
        series_start: Option<NaiveDate>,
    ) -> usize {
        self.occurrences_between(range_start, range_end, series_start)
            .len()
    }

    /// First occurrence on or after `reference`, looking at most one year ahead.
    pub fn next_after(
        &self,
        reference: NaiveDate,
        series_start: Option<NaiveDate>,
    ) -> Option<NaiveDate> {
        let horizon = reference + Duration::days(366);
        let anchor = self.anchor_for(reference, series_start);
        Occurrences::new(self, anchor)
            .starting_near(reference)
            .bounded_by(horizon)
            .find(|date| *date >= reference)
    }

    fn period_start(&self, base: NaiveDate) -> NaiveDate {
        match self.interval.unit {
            TimeUnit::Day => base,
            TimeUnit::Week if !self.by_day.is_empty() => week_start(base),
            TimeUnit::Week => base,
            TimeUnit::Month if self.has_constraints() => base.with_day(1).unwrap_or(base),
            TimeUnit::Month => base,
            TimeUnit::Year if self.has_constraints() => {
                NaiveDate::from_ymd_opt(base.year(), 1, 1).unwrap_or(base)
            }
            TimeUnit::Year => base,
        }
    }

    /// Candidate dates of the period whose reference date is `base`.
    fn expand_period(&self, base: NaiveDate, anchor: NaiveDate) -> Vec<NaiveDate> {
        if !self.has_constraints() {
            return vec![base];
        }
        let mut dates = match self.interval.unit {
            TimeUnit::Day => vec![base],
            TimeUnit::Week if self.by_day.is_empty() => vec![base],
            TimeUnit::Week => {
                let monday = week_start(base);
                self.by_day
                    .iter()
                    .map(|spec| monday + Duration::days(spec.weekday.num_days_from_monday() as i64))
                    .collect()
            }
            TimeUnit::Month => self.expand_month(base.year(), base.month(), base.day()),
            TimeUnit::Year => {
                let months = if self.by_month.is_empty() {
                    vec![base.month()]
                } else {
                    self.by_month.clone()
                };
                months
                    .into_iter()
                    .flat_map(|month| self.expand_month(base.year(), month, anchor.day()))
                    .collect()
            }
        };

        dates.retain(|date| self.matches_filters(*date));
        dates.sort();
        dates.dedup();
        dates
    }

    fn expand_month(&self, year: i32, month: u32, default_day: u32) -> Vec<NaiveDate> {
        let by_month_day: Vec<NaiveDate> = self
            .by_month_day
            .iter()
            .filter_map(|day| resolve_month_day(year, month, *day))
            .collect();
        let by_day: Vec<NaiveDate> = self
            .by_day
            .iter()
            .flat_map(|spec| resolve_weekday(year, month, spec))
            .collect();

        match (by_month_day.is_empty(), by_day.is_empty()) {
            (true, true) => clamped_date(year, month, default_day).into_iter().collect(),
            (false, true) => by_month_day,
            (true, false) => by_day,
            (false, false) => by_month_day
                .into_iter()
                .filter(|date| by_day.contains(date))
                .collect(),
        }
    }

    /// `BYxxx` parts acting as filters rather than expansions for the current unit.
    fn matches_filters(&self, date: NaiveDate) -> bool {
        if !self.by_month.is_empty() && !self.by_month.contains(&date.month()) {
            return false;
        }
        match self.interval.unit {
            TimeUnit::Day | TimeUnit::Week => {
                let day_ok = self.by_day.is_empty()
                    || self.by_day.iter().any(|spec| spec.weekday == date.weekday());
                let month_day_ok = self.by_month_day.is_empty()
                    || self
                        .by_month_day
                        .iter()
                        .any(|day| resolve_month_day(date.year(), date.month(), *day) == Some(date));
                day_ok && month_day_ok
            }
            TimeUnit::Month | TimeUnit::Year => true,
        }
    }
}

/// Month day with negative values counted from the end, clamped to the month length.
fn resolve_month_day(year: i32, month: u32, day: i32) -> Option<NaiveDate> {
    if day > 0 {
        clamped_date(year, month, day as u32)
    } else {
        let last = days_in_month(year, month) as i32;
        clamped_date(year, month, (last + day + 1).max(1) as u32)
    }
}

fn resolve_weekday(year: i32, month: u32, spec: &WeekdaySpec) -> Vec<NaiveDate> {
    let all = weekdays_in_month(year, month, spec.weekday);
    match spec.ordinal {
        None => all,
        Some(n) if n > 0 => all.get(n as usize - 1).copied().into_iter().collect(),
        Some(n) => {
            let back = n.unsigned_abs() as usize;
            all.len()
                .checked_sub(back)
                .and_then(|idx| all.get(idx).copied())
                .into_iter()
                .collect()
        }
    }
}

/// Lazily walks the occurrences of a rule from its anchor onwards.
///
/// `COUNT`, `UNTIL` and excluded dates are honoured; occurrences before the
/// anchor never exist. Without a [`bounded_by`](Self::bounded_by) horizon the
/// walk only ends on `COUNT`, `UNTIL`, date overflow or the period guard.
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    anchor: NaiveDate,
    period: i64,
    horizon: Option<NaiveDate>,
    pending: VecDeque<NaiveDate>,
    produced: u32,
    scanned: u32,
    exhausted: bool,
}

impl<'a> Occurrences<'a> {
    pub fn new(rule: &'a RecurrenceRule, anchor: NaiveDate) -> Self {
        Self {
            rule,
            anchor,
            period: 0,
            horizon: None,
            pending: VecDeque::new(),
            produced: 0,
            scanned: 0,
            exhausted: false,
        }
    }

    /// Skips whole periods that end before `reference`.
    ///
    /// Ignored for counted rules, since every earlier occurrence consumes part
    /// of the count.
    pub fn starting_near(mut self, reference: NaiveDate) -> Self {
        if self.rule.count.is_none() && reference > self.anchor {
            let steps = self.rule.interval.steps_between(self.anchor, reference);
            self.period = (steps - 1).max(0);
        }
        self
    }

    pub fn bounded_by(mut self, horizon: NaiveDate) -> Self {
        self.horizon = Some(horizon);
        self
    }

    fn fill_next_period(&mut self) {
        if self.scanned >= MAX_PERIODS {
            tracing::warn!(
                rule = %self.rule,
                anchor = %self.anchor,
                limit = MAX_PERIODS,
                "recurrence evaluation hit the period guard"
            );
            self.exhausted = true;
            return;
        }
        self.scanned += 1;

        let Some(base) = self.rule.interval.offset(self.anchor, self.period) else {
            self.exhausted = true;
            return;
        };
        self.period += 1;

        let start = self.rule.period_start(base);
        let past_horizon = self.horizon.is_some_and(|end| start > end);
        let past_until = self.rule.until.is_some_and(|until| start > until);
        if past_horizon || past_until {
            self.exhausted = true;
            return;
        }

        self.pending.extend(
            self.rule
                .expand_period(base, self.anchor)
                .into_iter()
                .filter(|date| *date >= self.anchor),
        );
    }
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            if let Some(date) = self.pending.pop_front() {
                if self.rule.count.is_some_and(|limit| self.produced >= limit) {
                    self.exhausted = true;
                    self.pending.clear();
                    return None;
                }
                if self.rule.until.is_some_and(|until| date > until)
                    || self.horizon.is_some_and(|end| date > end)
                {
                    self.exhausted = true;
                    self.pending.clear();
                    return None;
                }
                self.produced += 1;
                if self.rule.is_excluded(date) {
                    continue;
                }
                return Some(date);
            }
            if self.exhausted {
                return None;
            }
            self.fill_next_period();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_byday_expands_within_each_week() {
        let dates = occurrences_in_range(
            "FREQ=WEEKLY;BYDAY=MO,TH",
            date(2024, 1, 1),
            date(2024, 1, 14),
            None,
        )
        .unwrap();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 4), date(2024, 1, 8), date(2024, 1, 11)]
        );
    }

    #[test]
    fn monthly_last_friday() {
        let dates = occurrences_in_range(
            "FREQ=MONTHLY;BYDAY=-1FR",
            date(2024, 1, 1),
            date(2024, 3, 31),
            None,
        )
        .unwrap();
        assert_eq!(
            dates,
            vec![date(2024, 1, 26), date(2024, 2, 23), date(2024, 3, 29)]
        );
    }

    #[test]
    fn monthly_negative_month_day_is_last_day() {
        let dates = occurrences_in_range(
            "FREQ=MONTHLY;BYMONTHDAY=-1",
            date(2024, 1, 1),
            date(2024, 4, 30),
            None,
        )
        .unwrap();
        assert_eq!(
            dates,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]
        );
    }

    #[test]
    fn yearly_bymonth_uses_anchor_day() {
        let dates = occurrences_in_range(
            "FREQ=YEARLY;BYMONTH=1,7",
            date(2024, 1, 1),
            date(2025, 12, 31),
            Some(date(2023, 3, 10)),
        )
        .unwrap();
        assert_eq!(
            dates,
            vec![date(2024, 1, 10), date(2024, 7, 10), date(2025, 1, 10), date(2025, 7, 10)]
        );
    }

    #[test]
    fn daily_byday_filters_weekends() {
        let count = occurrences_count_in_range(
            "FREQ=DAILY;BYDAY=MO,TU,WE,TH,FR",
            date(2024, 1, 1),
            date(2024, 1, 31),
            None,
        )
        .unwrap();
        assert_eq!(count, 23);
    }

    #[test]
    fn count_is_consumed_before_the_window() {
        let dates = occurrences_in_range(
            "FREQ=MONTHLY;COUNT=3",
            date(2024, 2, 1),
            date(2024, 12, 31),
            Some(date(2024, 1, 5)),
        )
        .unwrap();
        assert_eq!(dates, vec![date(2024, 2, 5), date(2024, 3, 5)]);
    }

    #[test]
    fn until_is_inclusive() {
        let dates = occurrences_in_range(
            "FREQ=WEEKLY;UNTIL=20240115",
            date(2024, 1, 1),
            date(2024, 3, 1),
            None,
        )
        .unwrap();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]);
    }

    #[test]
    fn excluded_dates_are_skipped_but_counted() {
        let dates = occurrences_in_range(
            "RRULE:FREQ=DAILY;COUNT=3\nEXDATE:20240102",
            date(2024, 1, 1),
            date(2024, 1, 31),
            None,
        )
        .unwrap();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 3)]);
    }

    #[test]
    fn embedded_dtstart_anchors_when_no_series_start() {
        let dates = occurrences_in_range(
            "DTSTART:20230610\nRRULE:FREQ=YEARLY",
            date(2024, 1, 1),
            date(2024, 12, 31),
            None,
        )
        .unwrap();
        assert_eq!(dates, vec![date(2024, 6, 10)]);

        let overridden = occurrences_in_range(
            "DTSTART:20230610\nRRULE:FREQ=YEARLY",
            date(2024, 1, 1),
            date(2024, 12, 31),
            Some(date(2020, 2, 2)),
        )
        .unwrap();
        assert_eq!(overridden, vec![date(2024, 2, 2)]);
    }

    #[test]
    fn anchor_far_in_the_past_is_phase_skipped() {
        let rule = RecurrenceRule::every(3, TimeUnit::Day);
        let anchor = date(1990, 1, 1);
        let dates = rule.occurrences_between(date(2024, 1, 1), date(2024, 1, 10), Some(anchor));
        assert_eq!(dates, vec![date(2024, 1, 3), date(2024, 1, 6), date(2024, 1, 9)]);
        assert!(dates.iter().all(|d| (*d - anchor).num_days() % 3 == 0));
    }

    #[test]
    fn next_after_finds_upcoming_renewal() {
        let rule: RecurrenceRule = "monthly".parse().unwrap();
        assert_eq!(
            rule.next_after(date(2024, 3, 20), Some(date(2024, 1, 15))),
            Some(date(2024, 4, 15))
        );
        assert_eq!(
            rule.next_after(date(2024, 3, 15), Some(date(2024, 1, 15))),
            Some(date(2024, 3, 15))
        );
    }

    #[test]
    fn weekday_spec_resolution_handles_missing_fifth_week() {
        assert!(resolve_weekday(2024, 2, &WeekdaySpec::nth(5, Weekday::Mon)).is_empty());
        assert_eq!(
            resolve_weekday(2024, 2, &WeekdaySpec::nth(-5, Weekday::Thu)),
            vec![date(2024, 2, 1)]
        );
    }
}
