use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable};
use crate::errors::InvalidRuleError;
use crate::recurrence::RecurrenceRule;

/// Lifecycle state reported by the subscription history table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    Trial,
    Active,
    #[serde(alias = "cancelled")]
    Canceled,
    Expired,
    Paused,
}

impl SubscriptionState {
    pub const ALL: [SubscriptionState; 5] = [
        SubscriptionState::Trial,
        SubscriptionState::Active,
        SubscriptionState::Canceled,
        SubscriptionState::Expired,
        SubscriptionState::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Trial => "trial",
            SubscriptionState::Active => "active",
            SubscriptionState::Canceled => "canceled",
            SubscriptionState::Expired => "expired",
            SubscriptionState::Paused => "paused",
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trial" => Ok(SubscriptionState::Trial),
            "active" => Ok(SubscriptionState::Active),
            "canceled" | "cancelled" => Ok(SubscriptionState::Canceled),
            "expired" => Ok(SubscriptionState::Expired),
            "paused" => Ok(SubscriptionState::Paused),
            other => Err(format!("unknown subscription state `{other}`")),
        }
    }
}

/// Snapshot of one subscription row as fetched from the remote store.
///
/// Field names follow the store's column names so exported rows deserialize
/// directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionRecord {
    pub id: Uuid,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub recurrence_rule: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub state: SubscriptionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, alias = "autorenew")]
    pub auto_renewal: bool,
}

impl SubscriptionRecord {
    pub fn new(state: SubscriptionState) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: None,
            recurrence_rule: None,
            start_date: None,
            state,
            provider_name: None,
            category: None,
            funding_source: None,
            nickname: None,
            auto_renewal: false,
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.recurrence_rule = Some(rule.into());
        self
    }

    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_provider(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_funding_source(mut self, name: impl Into<String>) -> Self {
        self.funding_source = Some(name.into());
        self
    }

    pub fn with_auto_renewal(mut self, enabled: bool) -> Self {
        self.auto_renewal = enabled;
        self
    }

    /// Cost per occurrence; a missing amount counts as zero.
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }

    /// Parses the stored rule. `None` when the record has no rule at all.
    pub fn parsed_rule(&self) -> Option<Result<RecurrenceRule, InvalidRuleError>> {
        self.recurrence_rule
            .as_deref()
            .map(|rule| rule.parse::<RecurrenceRule>())
    }
}

impl Identifiable for SubscriptionRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for SubscriptionRecord {
    fn display_label(&self) -> String {
        match (&self.nickname, &self.provider_name) {
            (Some(nickname), Some(provider)) => format!("{nickname} ({provider})"),
            (Some(nickname), None) => nickname.clone(),
            (None, Some(provider)) => provider.clone(),
            (None, None) => self.id.to_string(),
        }
    }
}
