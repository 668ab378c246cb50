use std::collections::BTreeSet;

use crate::domain::{SubscriptionRecord, SubscriptionState};

/// Selects which subscriptions enter a computation.
///
/// Aggregation never filters on its own; callers pick a policy here and pass
/// the resulting slice along.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    excluded_states: BTreeSet<SubscriptionState>,
    excluded_categories: BTreeSet<String>,
}

impl SubscriptionFilter {
    /// Lets every record through.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn active_only() -> Self {
        Self::counting(&[SubscriptionState::Active])
    }

    /// Active and trial subscriptions, the ones that still renew.
    pub fn billable() -> Self {
        Self::counting(&[SubscriptionState::Active, SubscriptionState::Trial])
    }

    /// Excludes every state not listed in `counted`.
    pub fn counting(counted: &[SubscriptionState]) -> Self {
        let excluded_states = SubscriptionState::ALL
            .into_iter()
            .filter(|state| !counted.contains(state))
            .collect();
        Self {
            excluded_states,
            excluded_categories: BTreeSet::new(),
        }
    }

    pub fn exclude_state(mut self, state: SubscriptionState) -> Self {
        self.excluded_states.insert(state);
        self
    }

    pub fn exclude_category(mut self, category: impl Into<String>) -> Self {
        self.excluded_categories.insert(category.into());
        self
    }

    pub fn excluded_states(&self) -> impl Iterator<Item = &SubscriptionState> {
        self.excluded_states.iter()
    }

    pub fn excluded_categories(&self) -> impl Iterator<Item = &String> {
        self.excluded_categories.iter()
    }

    pub fn matches(&self, record: &SubscriptionRecord) -> bool {
        if self.excluded_states.contains(&record.state) {
            return false;
        }
        match &record.category {
            Some(category) => !self.excluded_categories.contains(category),
            None => true,
        }
    }

    pub fn apply(&self, records: &[SubscriptionRecord]) -> Vec<SubscriptionRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}
