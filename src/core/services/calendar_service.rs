use chrono::{Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Displayable, SubscriptionRecord};
use crate::recurrence::time_interval::days_in_month;

use super::{ServiceError, ServiceResult};

/// One renewal of one subscription on a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenewalEvent {
    pub subscription_id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub amount: f64,
    pub category: Option<String>,
}

pub struct CalendarService;

impl CalendarService {
    /// Renewals of every subscription falling inside the given calendar month.
    pub fn month_renewals(
        subscriptions: &[SubscriptionRecord],
        year: i32,
        month: u32,
    ) -> ServiceResult<Vec<RenewalEvent>> {
        let month_start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ServiceError::Invalid(format!("invalid month {year}-{month:02}")))?;
        let month_end = month_start + Duration::days(days_in_month(year, month) as i64 - 1);
        Ok(Self::renewals_between(subscriptions, month_start, month_end))
    }

    pub fn renewals_between(
        subscriptions: &[SubscriptionRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<RenewalEvent> {
        let mut events = Vec::new();
        for record in subscriptions {
            let rule = match record.parsed_rule() {
                Some(Ok(rule)) => rule,
                Some(Err(err)) => {
                    tracing::warn!(
                        subscription = %record.id,
                        error = %err,
                        "omitting subscription with invalid recurrence rule from calendar"
                    );
                    continue;
                }
                None => continue,
            };
            let title = record.display_label();
            for date in rule.occurrences_between(start, end, record.start_date) {
                events.push(RenewalEvent {
                    subscription_id: record.id,
                    date,
                    title: title.clone(),
                    amount: record.amount_or_zero(),
                    category: record.category.clone(),
                });
            }
        }
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));
        events
    }

    pub fn renewals_on(events: &[RenewalEvent], date: NaiveDate) -> Vec<&RenewalEvent> {
        events.iter().filter(|event| event.date == date).collect()
    }

    /// Upcoming renewal of a single subscription, at most one year ahead.
    pub fn next_renewal(record: &SubscriptionRecord, today: NaiveDate) -> Option<NaiveDate> {
        match record.parsed_rule()? {
            Ok(rule) => rule.next_after(today, record.start_date),
            Err(err) => {
                tracing::warn!(subscription = %record.id, error = %err, "cannot compute next renewal");
                None
            }
        }
    }
}
