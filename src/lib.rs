#![doc(test(attr(deny(warnings))))]

//! Subtrack Core expands subscription recurrence rules into renewal dates and
//! aggregates them into daily, weekly, monthly and yearly cost projections.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod recurrence;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::core::services::{CalendarService, CostAggregator, DashboardService};
pub use crate::domain::{CostSummary, SubscriptionRecord, SubscriptionState};
pub use crate::recurrence::{occurrences_count_in_range, occurrences_in_range, RecurrenceRule};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Subtrack core tracing initialized.");
    });
}
