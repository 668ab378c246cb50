//! Read-only snapshots of subscription data and the cost figures derived from them.

pub mod common;
pub mod subscription;
pub mod summary;

pub use common::{Displayable, Identifiable};
pub use subscription::{SubscriptionRecord, SubscriptionState};
pub use summary::{CostSummary, DAYS_PER_YEAR, MONTHS_PER_YEAR, WEEKS_PER_YEAR};
