use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::filter::SubscriptionFilter;
use crate::domain::{CostSummary, SubscriptionRecord, SubscriptionState};

use super::cost_service::CostAggregator;

const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_subscriptions: usize,
    pub counted_subscriptions: usize,
    pub remaining_year: CostSummary,
    pub auto_renewal_count: usize,
    pub categories: BTreeMap<String, usize>,
    pub funding_sources: BTreeMap<String, usize>,
    pub state_distribution: BTreeMap<SubscriptionState, usize>,
}

pub struct DashboardService;

impl DashboardService {
    /// Overview figures for the dashboard.
    ///
    /// Costs, categories, funding sources and auto-renewals only consider the
    /// records passing `filter`; the state distribution covers all records.
    pub fn stats(
        subscriptions: &[SubscriptionRecord],
        filter: &SubscriptionFilter,
        today: NaiveDate,
    ) -> DashboardStats {
        let counted = filter.apply(subscriptions);

        let mut categories = BTreeMap::new();
        let mut funding_sources = BTreeMap::new();
        for record in &counted {
            *categories.entry(label_or_unknown(&record.category)).or_insert(0) += 1;
            *funding_sources
                .entry(label_or_unknown(&record.funding_source))
                .or_insert(0) += 1;
        }

        let mut state_distribution = BTreeMap::new();
        for record in subscriptions {
            *state_distribution.entry(record.state).or_insert(0) += 1;
        }

        DashboardStats {
            total_subscriptions: subscriptions.len(),
            counted_subscriptions: counted.len(),
            remaining_year: CostAggregator::remaining_in_year(&counted, today),
            auto_renewal_count: counted.iter().filter(|record| record.auto_renewal).count(),
            categories,
            funding_sources,
            state_distribution,
        }
    }
}

fn label_or_unknown(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .unwrap_or(UNKNOWN_LABEL)
        .to_string()
}
