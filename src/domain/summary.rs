use std::{iter::Sum, ops::Add};

use serde::Serialize;

pub const DAYS_PER_YEAR: f64 = 365.25;
pub const WEEKS_PER_YEAR: f64 = 52.18;
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Cost projection derived from a single yearly total.
///
/// Only [`CostSummary::from_yearly`] builds one, so the daily, weekly and
/// monthly figures are always exact ratios of the yearly figure.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CostSummary {
    daily: f64,
    weekly: f64,
    monthly: f64,
    yearly: f64,
}

impl CostSummary {
    pub fn from_yearly(yearly: f64) -> Self {
        Self {
            daily: yearly / DAYS_PER_YEAR,
            weekly: yearly / WEEKS_PER_YEAR,
            monthly: yearly / MONTHS_PER_YEAR,
            yearly,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn daily(&self) -> f64 {
        self.daily
    }

    pub fn weekly(&self) -> f64 {
        self.weekly
    }

    pub fn monthly(&self) -> f64 {
        self.monthly
    }

    pub fn yearly(&self) -> f64 {
        self.yearly
    }
}

impl Add for CostSummary {
    type Output = CostSummary;

    fn add(self, other: CostSummary) -> CostSummary {
        CostSummary::from_yearly(self.yearly + other.yearly)
    }
}

impl Sum for CostSummary {
    fn sum<I: Iterator<Item = CostSummary>>(iter: I) -> CostSummary {
        CostSummary::from_yearly(iter.map(|summary| summary.yearly).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_derive_from_yearly() {
        let summary = CostSummary::from_yearly(240.0);
        assert_eq!(summary.monthly(), 20.0);
        assert!((summary.weekly() - 240.0 / 52.18).abs() < 1e-9);
        assert!((summary.daily() - 240.0 / 365.25).abs() < 1e-9);
    }

    #[test]
    fn zero_is_all_zero() {
        let zero = CostSummary::zero();
        assert_eq!(zero.daily(), 0.0);
        assert_eq!(zero.weekly(), 0.0);
        assert_eq!(zero.monthly(), 0.0);
        assert_eq!(zero.yearly(), 0.0);
    }

    #[test]
    fn sum_adds_yearly_totals() {
        let total: CostSummary = [120.0, 120.0]
            .into_iter()
            .map(CostSummary::from_yearly)
            .sum();
        assert_eq!(total, CostSummary::from_yearly(240.0));
        assert_eq!(
            CostSummary::from_yearly(1.0) + CostSummary::zero(),
            CostSummary::from_yearly(1.0)
        );
    }
}
