//! Customer records.
//!
//! A customer is created the first time a signed-in user touches a metered
//! endpoint and carries the integer credit balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::UserId;

/// A paying (or potentially paying) user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// The user ID issued by the auth provider.
    pub user_id: UserId,

    /// Email, when known.
    pub email: Option<String>,

    /// Current credit balance. Never negative.
    pub credits: i64,

    /// Subscription state reported by the payment provider.
    pub subscription_status: Option<SubscriptionStatus>,

    /// Payment-provider subscription id.
    pub subscription_id: Option<String>,

    /// Payment-provider product id of the subscription.
    pub product_id: Option<String>,

    /// When the customer was created.
    pub created_at: DateTime<Utc>,

    /// When the customer was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new customer with zero credits.
    #[must_use]
    pub fn new(user_id: UserId, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email,
            credits: 0,
            subscription_status: None,
            subscription_id: None,
            product_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the customer can afford a debit.
    #[must_use]
    pub fn has_sufficient_credits(&self, amount: i64) -> bool {
        self.credits >= amount
    }

    /// Check if the customer has an active subscription.
    #[must_use]
    pub fn has_active_subscription(&self) -> bool {
        self.subscription_status == Some(SubscriptionStatus::Active)
    }
}

/// Subscription status as reported by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and current.
    Active,
    /// Cancelled by the customer; runs until period end.
    Canceled,
    /// Period ended without renewal.
    Expired,
    /// Payment failed.
    PastDue,
}

impl SubscriptionStatus {
    /// Storage form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
            Self::PastDue => "past_due",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            "expired" => Ok(Self::Expired),
            "past_due" => Ok(Self::PastDue),
            other => Err(crate::CoreError::InvalidStatus(other.to_string())),
        }
    }
}
