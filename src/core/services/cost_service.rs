//! Yearly cost projections built from recurrence occurrences.

use chrono::NaiveDate;

use crate::core::time::calendar_year_bounds;
use crate::domain::{CostSummary, SubscriptionRecord};

pub struct CostAggregator;

impl CostAggregator {
    /// Summarizes exactly the given subscriptions over the calendar year of `today`.
    ///
    /// Each record contributes `amount × occurrences` between Jan 1 and Dec 31,
    /// phased on its start date, else the rule's DTSTART, else Jan 1. Records without a
    /// rule or with an unreadable rule contribute nothing.
    pub fn summarize(subscriptions: &[SubscriptionRecord], today: NaiveDate) -> CostSummary {
        let (year_start, year_end) = calendar_year_bounds(today);
        Self::summarize_window(subscriptions, year_start, year_end)
    }

    pub fn summarize_subscription(record: &SubscriptionRecord, today: NaiveDate) -> CostSummary {
        Self::summarize(std::slice::from_ref(record), today)
    }

    /// Cost still due between `today` and Dec 31, expressed with the same ratios.
    pub fn remaining_in_year(subscriptions: &[SubscriptionRecord], today: NaiveDate) -> CostSummary {
        let (_, year_end) = calendar_year_bounds(today);
        Self::summarize_window(subscriptions, today, year_end)
    }

    pub fn summarize_window(
        subscriptions: &[SubscriptionRecord],
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> CostSummary {
        let yearly_total = subscriptions
            .iter()
            .map(|record| Self::window_cost(record, window_start, window_end))
            .sum();
        CostSummary::from_yearly(yearly_total)
    }

    /// Cost of one record inside the window; zero when its rule is absent or invalid.
    pub fn window_cost(
        record: &SubscriptionRecord,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> f64 {
        let rule = match record.parsed_rule() {
            None => return 0.0,
            Some(Ok(rule)) => rule,
            Some(Err(err)) => {
                tracing::warn!(
                    subscription = %record.id,
                    rule = record.recurrence_rule.as_deref().unwrap_or_default(),
                    error = %err,
                    "skipping subscription with invalid recurrence rule"
                );
                return 0.0;
            }
        };

        let occurrences = rule.count_between(window_start, window_end, record.start_date);
        tracing::debug!(
            subscription = %record.id,
            occurrences,
            "counted renewals in window"
        );
        record.amount_or_zero() * occurrences as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubscriptionState;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn summarize_empty_is_zero() {
        assert_eq!(
            CostAggregator::summarize(&[], date(2024, 6, 1)),
            CostSummary::zero()
        );
    }

    #[test]
    fn window_cost_uses_window_start_without_start_date() {
        let record = SubscriptionRecord::new(SubscriptionState::Active)
            .with_amount(5.0)
            .with_rule("every 2 weeks");
        let cost = CostAggregator::window_cost(&record, date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(cost, 15.0);
    }

    #[test]
    fn remaining_in_year_only_counts_future_renewals() {
        let record = SubscriptionRecord::new(SubscriptionState::Active)
            .with_amount(10.0)
            .with_rule("FREQ=MONTHLY")
            .with_start_date(date(2024, 1, 15));
        let remaining = CostAggregator::remaining_in_year(&[record], date(2024, 10, 16));
        assert_eq!(remaining.yearly(), 20.0);
    }
}
