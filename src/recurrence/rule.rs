//! Parsing and canonical rendering of recurrence rules.
//!
//! Two spellings are accepted: RFC 5545 `RRULE` text (optionally preceded by a
//! `DTSTART` line and followed by `EXDATE` lines) and a compact human form such
//! as `monthly` or `every 2 weeks`.

use std::{fmt, str::FromStr};

use chrono::{NaiveDate, Weekday};

use super::time_interval::{TimeInterval, TimeUnit};
use crate::errors::InvalidRuleError;

/// A `BYDAY` entry: a weekday, optionally restricted to its n-th appearance
/// inside the month (negative counts from the end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdaySpec {
    pub ordinal: Option<i32>,
    pub weekday: Weekday,
}

impl WeekdaySpec {
    pub fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    pub fn nth(ordinal: i32, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for WeekdaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ordinal) = self.ordinal {
            write!(f, "{ordinal}")?;
        }
        f.write_str(weekday_token(self.weekday))
    }
}

/// Parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub interval: TimeInterval,
    pub by_day: Vec<WeekdaySpec>,
    pub by_month_day: Vec<i32>,
    pub by_month: Vec<u32>,
    pub count: Option<u32>,
    pub until: Option<NaiveDate>,
    pub dtstart: Option<NaiveDate>,
    pub exdates: Vec<NaiveDate>,
}

impl RecurrenceRule {
    pub fn new(interval: TimeInterval) -> Self {
        Self {
            interval,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            count: None,
            until: None,
            dtstart: None,
            exdates: Vec::new(),
        }
    }

    pub fn every(every: u32, unit: TimeUnit) -> Self {
        Self::new(TimeInterval::new(every, unit))
    }

    pub fn has_constraints(&self) -> bool {
        !(self.by_day.is_empty() && self.by_month_day.is_empty() && self.by_month.is_empty())
    }

    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.exdates.contains(&date)
    }

    /// Short label suitable for list views ("Monthly", "Every 2 Weeks").
    pub fn label(&self) -> String {
        self.interval.label()
    }

    fn validate(&self) -> Result<(), InvalidRuleError> {
        if self.interval.every == 0 {
            return Err(InvalidRuleError::InvalidInterval("0".into()));
        }
        if self.count == Some(0) {
            return Err(InvalidRuleError::InvalidValue {
                part: "COUNT",
                value: "0".into(),
            });
        }
        let has_ordinal = self.by_day.iter().any(|spec| spec.ordinal.is_some());
        match self.interval.unit {
            TimeUnit::Day | TimeUnit::Week if has_ordinal => Err(InvalidRuleError::Conflict(
                "BYDAY ordinals require MONTHLY or YEARLY frequency",
            )),
            TimeUnit::Year if !self.by_day.is_empty() && self.by_month.is_empty() => Err(
                InvalidRuleError::Conflict("BYDAY with YEARLY frequency requires BYMONTH"),
            ),
            _ => Ok(()),
        }
    }
}

impl FromStr for RecurrenceRule {
    type Err = InvalidRuleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidRuleError::Empty);
        }

        let rule = if trimmed.contains('=') {
            parse_rfc(trimmed)?
        } else {
            parse_human(trimmed)?
        };
        rule.validate()?;
        Ok(rule)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.dtstart {
            writeln!(f, "DTSTART:{}", start.format("%Y%m%d"))?;
        }
        write!(
            f,
            "RRULE:FREQ={};INTERVAL={}",
            self.interval.unit.freq_token(),
            self.interval.every
        )?;
        if !self.by_day.is_empty() {
            write!(f, ";BYDAY={}", join(&self.by_day))?;
        }
        if !self.by_month_day.is_empty() {
            write!(f, ";BYMONTHDAY={}", join(&self.by_month_day))?;
        }
        if !self.by_month.is_empty() {
            write!(f, ";BYMONTH={}", join(&self.by_month))?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        }
        if let Some(until) = self.until {
            write!(f, ";UNTIL={}", until.format("%Y%m%d"))?;
        }
        if !self.exdates.is_empty() {
            let dates: Vec<String> = self
                .exdates
                .iter()
                .map(|date| date.format("%Y%m%d").to_string())
                .collect();
            write!(f, "\nEXDATE:{}", dates.join(","))?;
        }
        Ok(())
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_rfc(text: &str) -> Result<RecurrenceRule, InvalidRuleError> {
    let mut dtstart = None;
    let mut exdates = Vec::new();
    let mut rule: Option<RecurrenceRule> = None;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let upper = line.to_ascii_uppercase();
        if upper.starts_with("DTSTART") {
            dtstart = Some(parse_date(property_value(line)?)?);
        } else if upper.starts_with("EXDATE") {
            for value in property_value(line)?.split(',') {
                exdates.push(parse_date(value)?);
            }
        } else {
            let body = if upper.starts_with("RRULE:") {
                &line["RRULE:".len()..]
            } else {
                line
            };
            if rule.is_some() {
                return Err(InvalidRuleError::UnsupportedPart(
                    "multiple RRULE lines".into(),
                ));
            }
            rule = Some(parse_rrule_body(body)?);
        }
    }

    let mut rule = rule.ok_or(InvalidRuleError::MissingFrequency)?;
    rule.dtstart = dtstart;
    exdates.sort();
    exdates.dedup();
    rule.exdates = exdates;
    Ok(rule)
}

fn property_value(line: &str) -> Result<&str, InvalidRuleError> {
    line.rsplit_once(':')
        .map(|(_, value)| value.trim())
        .ok_or_else(|| InvalidRuleError::MalformedPart(line.to_string()))
}

fn parse_rrule_body(body: &str) -> Result<RecurrenceRule, InvalidRuleError> {
    let mut unit = None;
    let mut every = 1u32;
    let mut rule = RecurrenceRule::every(1, TimeUnit::Day);

    for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| InvalidRuleError::MalformedPart(part.to_string()))?;
        let value = value.trim();
        match key.trim().to_ascii_uppercase().as_str() {
            "FREQ" => unit = Some(parse_freq(value)?),
            "INTERVAL" => every = parse_interval(value)?,
            "COUNT" => {
                rule.count = Some(value.parse().map_err(|_| InvalidRuleError::InvalidValue {
                    part: "COUNT",
                    value: value.to_string(),
                })?)
            }
            "UNTIL" => rule.until = Some(parse_date(value)?),
            "BYDAY" => rule.by_day = parse_list(value, parse_weekday_spec)?,
            "BYMONTHDAY" => rule.by_month_day = parse_list(value, parse_month_day)?,
            "BYMONTH" => rule.by_month = parse_list(value, parse_month)?,
            "WKST" => {
                parse_weekday(value)?;
            }
            other => return Err(InvalidRuleError::UnsupportedPart(other.to_string())),
        }
    }

    rule.interval = TimeInterval::new(every, unit.ok_or(InvalidRuleError::MissingFrequency)?);
    Ok(rule)
}

fn parse_freq(value: &str) -> Result<TimeUnit, InvalidRuleError> {
    match value.to_ascii_uppercase().as_str() {
        "DAILY" => Ok(TimeUnit::Day),
        "WEEKLY" => Ok(TimeUnit::Week),
        "MONTHLY" => Ok(TimeUnit::Month),
        "YEARLY" => Ok(TimeUnit::Year),
        _ => Err(InvalidRuleError::UnsupportedFrequency(value.to_string())),
    }
}

fn parse_interval(value: &str) -> Result<u32, InvalidRuleError> {
    match value.parse::<u32>() {
        Ok(every) if every > 0 => Ok(every),
        _ => Err(InvalidRuleError::InvalidInterval(value.to_string())),
    }
}

fn parse_list<T>(
    value: &str,
    parse: fn(&str) -> Result<T, InvalidRuleError>,
) -> Result<Vec<T>, InvalidRuleError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse)
        .collect()
}

fn parse_weekday_spec(value: &str) -> Result<WeekdaySpec, InvalidRuleError> {
    let invalid = || InvalidRuleError::InvalidValue {
        part: "BYDAY",
        value: value.to_string(),
    };
    if value.len() < 2 || !value.is_char_boundary(value.len() - 2) {
        return Err(invalid());
    }
    let (prefix, day) = value.split_at(value.len() - 2);
    let weekday = parse_weekday(day).map_err(|_| invalid())?;
    if prefix.is_empty() {
        return Ok(WeekdaySpec::every(weekday));
    }
    match prefix.trim_start_matches('+').parse::<i32>() {
        Ok(ordinal) if ordinal != 0 && ordinal.abs() <= 53 => {
            Ok(WeekdaySpec::nth(ordinal, weekday))
        }
        _ => Err(invalid()),
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, InvalidRuleError> {
    match value.to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        _ => Err(InvalidRuleError::InvalidValue {
            part: "weekday",
            value: value.to_string(),
        }),
    }
}

fn weekday_token(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn parse_month_day(value: &str) -> Result<i32, InvalidRuleError> {
    match value.trim_start_matches('+').parse::<i32>() {
        Ok(day) if day != 0 && day.abs() <= 31 => Ok(day),
        _ => Err(InvalidRuleError::InvalidValue {
            part: "BYMONTHDAY",
            value: value.to_string(),
        }),
    }
}

fn parse_month(value: &str) -> Result<u32, InvalidRuleError> {
    match value.parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err(InvalidRuleError::InvalidValue {
            part: "BYMONTH",
            value: value.to_string(),
        }),
    }
}

/// Accepts `YYYYMMDD`, `YYYYMMDDTHHMMSS[Z]` and ISO `YYYY-MM-DD`.
fn parse_date(value: &str) -> Result<NaiveDate, InvalidRuleError> {
    let value = value.trim();
    let invalid = || InvalidRuleError::InvalidDate(value.to_string());
    if value.len() >= 10 && value.as_bytes().get(4) == Some(&b'-') {
        return NaiveDate::parse_from_str(value.get(..10).ok_or_else(invalid)?, "%Y-%m-%d")
            .map_err(|_| invalid());
    }
    let digits = value.get(..8).ok_or_else(invalid)?;
    NaiveDate::parse_from_str(digits, "%Y%m%d").map_err(|_| invalid())
}

fn parse_human(text: &str) -> Result<RecurrenceRule, InvalidRuleError> {
    let lowered = text.to_ascii_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let (every, unit) = match words.as_slice() {
        ["daily"] => (1, TimeUnit::Day),
        ["weekly"] => (1, TimeUnit::Week),
        ["biweekly"] | ["fortnightly"] => (2, TimeUnit::Week),
        ["monthly"] => (1, TimeUnit::Month),
        ["quarterly"] => (3, TimeUnit::Month),
        ["yearly"] | ["annually"] | ["annual"] => (1, TimeUnit::Year),
        ["every", unit] => (1, parse_unit_word(unit)?),
        ["every", "other", unit] => (2, parse_unit_word(unit)?),
        ["every", count, unit] => (parse_interval(count)?, parse_unit_word(unit)?),
        _ => return Err(InvalidRuleError::UnsupportedFrequency(text.to_string())),
    };

    Ok(RecurrenceRule::every(every, unit))
}

fn parse_unit_word(word: &str) -> Result<TimeUnit, InvalidRuleError> {
    match word.trim_end_matches('s') {
        "day" => Ok(TimeUnit::Day),
        "week" => Ok(TimeUnit::Week),
        "month" => Ok(TimeUnit::Month),
        "year" => Ok(TimeUnit::Year),
        _ => Err(InvalidRuleError::UnsupportedFrequency(word.to_string())),
    }
}
