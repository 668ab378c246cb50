//! Pure computations over subscription snapshots: filtering, cost aggregation,
//! calendars and dashboard statistics.

pub mod filter;
pub mod services;
pub mod time;

pub use filter::SubscriptionFilter;
pub use time::{Clock, FixedClock, SystemClock};
