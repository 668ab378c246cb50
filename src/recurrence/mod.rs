//! Recurrence rules and the evaluation of their renewal dates.

pub mod engine;
pub mod rule;
pub mod time_interval;

pub use engine::{occurrences_count_in_range, occurrences_in_range, Occurrences};
pub use rule::{RecurrenceRule, WeekdaySpec};
pub use time_interval::{TimeInterval, TimeUnit};
