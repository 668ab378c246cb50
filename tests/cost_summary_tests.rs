mod common;

use common::{date, streaming_pair};
use subtrack_core::{
    core::filter::SubscriptionFilter, CalendarService, CostAggregator, CostSummary,
    SubscriptionRecord, SubscriptionState,
};

const TOLERANCE: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn monthly_and_yearly_subscriptions_sum_to_240() {
    let summary = CostAggregator::summarize(&streaming_pair(), date(2024, 6, 1));

    assert_close(summary.yearly(), 240.0);
    assert_close(summary.monthly(), 20.0);
}

#[test]
fn summaries_keep_the_fixed_ratios() {
    let summary = CostAggregator::summarize(&streaming_pair(), date(2024, 6, 1));

    assert_close(summary.daily(), summary.yearly() / 365.25);
    assert_close(summary.weekly(), summary.yearly() / 52.18);
    assert_close(summary.monthly(), summary.yearly() / 12.0);
}

#[test]
fn no_subscriptions_cost_nothing() {
    let summary = CostAggregator::summarize(&[], date(2024, 6, 1));
    assert_eq!(summary, CostSummary::zero());
    assert_eq!(summary.daily(), 0.0);
    assert_eq!(summary.weekly(), 0.0);
}

#[test]
fn subscriptions_without_rule_or_amount_contribute_zero() {
    let mut records = streaming_pair();
    records.push(
        SubscriptionRecord::new(SubscriptionState::Active)
            .with_amount(99.0)
            .with_start_date(date(2024, 1, 1)),
    );
    records.push(SubscriptionRecord::new(SubscriptionState::Active).with_rule("weekly"));

    let summary = CostAggregator::summarize(&records, date(2024, 6, 1));
    assert_close(summary.yearly(), 240.0);
}

#[test]
fn invalid_rule_is_skipped_without_affecting_others() {
    let mut records = streaming_pair();
    records.insert(
        0,
        SubscriptionRecord::new(SubscriptionState::Active)
            .with_amount(50.0)
            .with_rule("FREQ=FORTNIGHTLY;INTERVAL=x"),
    );

    let summary = CostAggregator::summarize(&records, date(2024, 6, 1));
    assert_close(summary.yearly(), 240.0);
    assert_eq!(
        CostAggregator::window_cost(&records[0], date(2024, 1, 1), date(2024, 12, 31)),
        0.0
    );
}

#[test]
fn filtering_happens_before_aggregation() {
    let mut records = streaming_pair();
    records.push(
        SubscriptionRecord::new(SubscriptionState::Canceled)
            .with_amount(15.0)
            .with_rule("monthly")
            .with_start_date(date(2023, 5, 5)),
    );
    records.push(
        SubscriptionRecord::new(SubscriptionState::Trial)
            .with_category("Games")
            .with_amount(1.0)
            .with_rule("weekly")
            .with_start_date(date(2024, 12, 2)),
    );

    let today = date(2024, 6, 1);
    let unfiltered = CostAggregator::summarize(&records, today);
    assert_close(unfiltered.yearly(), 240.0 + 15.0 * 12.0 + 5.0);

    let billable = CostAggregator::summarize(&SubscriptionFilter::billable().apply(&records), today);
    assert_close(billable.yearly(), 245.0);

    let no_games = SubscriptionFilter::billable().exclude_category("Games");
    let summary = CostAggregator::summarize(&no_games.apply(&records), today);
    assert_close(summary.yearly(), 240.0);
}

#[test]
fn summaries_add_up_per_subscription() {
    let records = streaming_pair();
    let today = date(2024, 6, 1);
    let total: CostSummary = records
        .iter()
        .map(|record| CostAggregator::summarize_subscription(record, today))
        .sum();
    assert_close(total.yearly(), CostAggregator::summarize(&records, today).yearly());
}

#[test]
fn remaining_cost_counts_from_today_to_year_end() {
    let remaining = CostAggregator::remaining_in_year(&streaming_pair(), date(2024, 10, 16));
    assert_close(remaining.yearly(), 20.0);
}

#[test]
fn rule_dtstart_phases_cost_when_record_has_no_start_date() {
    let next_year = SubscriptionRecord::new(SubscriptionState::Active)
        .with_amount(100.0)
        .with_rule("DTSTART:20250610\nRRULE:FREQ=YEARLY");
    let today = date(2024, 6, 1);

    assert_close(CostAggregator::summarize_subscription(&next_year, today).yearly(), 0.0);
    assert!(CalendarService::renewals_between(
        std::slice::from_ref(&next_year),
        date(2024, 1, 1),
        date(2024, 12, 31)
    )
    .is_empty());
    assert_eq!(CalendarService::next_renewal(&next_year, today), None);
    assert_close(
        CostAggregator::summarize_subscription(&next_year, date(2025, 1, 1)).yearly(),
        100.0,
    );

    let from_march = SubscriptionRecord::new(SubscriptionState::Active)
        .with_amount(5.0)
        .with_rule("DTSTART:20240315\nRRULE:FREQ=MONTHLY");
    let summary = CostAggregator::summarize_subscription(&from_march, today);
    assert_close(summary.yearly(), 50.0);
    let remaining = CostAggregator::remaining_in_year(&[from_march], date(2024, 10, 16));
    assert_close(remaining.yearly(), 10.0);
}

#[test]
fn record_start_date_outranks_rule_dtstart() {
    let record = SubscriptionRecord::new(SubscriptionState::Active)
        .with_amount(5.0)
        .with_rule("DTSTART:20240315\nRRULE:FREQ=MONTHLY")
        .with_start_date(date(2024, 7, 1));

    let summary = CostAggregator::summarize_subscription(&record, date(2024, 6, 1));
    assert_close(summary.yearly(), 30.0);
}
