//! Credit ledger entries.
//!
//! Every change to a customer's balance appends one immutable
//! `CreditTransaction`. Entries are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{TransactionId, UserId};

/// A ledger entry recording a balance change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The customer whose balance changed.
    pub user_id: UserId,

    /// Signed amount. Positive = credit, negative = debit.
    pub amount: i64,

    /// Direction of the change.
    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// What caused the change.
    pub operation: CreditOperation,

    /// Human-readable description.
    pub description: String,

    /// External order reference (payment provider order or checkout id).
    pub order_id: Option<String>,

    /// Balance snapshot (`balance_before`, `balance_after`) and context.
    pub metadata: serde_json::Value,

    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    /// Create a debit entry. `amount` is stored negative regardless of sign.
    #[must_use]
    pub fn debit(
        user_id: UserId,
        amount: i64,
        balance_before: i64,
        operation: CreditOperation,
        description: String,
        context: serde_json::Value,
    ) -> Self {
        let amount = amount.abs();
        Self {
            id: TransactionId::generate(),
            user_id,
            amount: -amount,
            kind: TransactionKind::Subtract,
            operation,
            description,
            order_id: None,
            metadata: snapshot(balance_before, balance_before - amount, context),
            created_at: Utc::now(),
        }
    }

    /// Create a credit entry.
    #[must_use]
    pub fn credit(
        user_id: UserId,
        amount: i64,
        balance_before: i64,
        operation: CreditOperation,
        description: String,
        order_id: Option<String>,
    ) -> Self {
        let amount = amount.abs();
        Self {
            id: TransactionId::generate(),
            user_id,
            amount,
            kind: TransactionKind::Add,
            operation,
            description,
            order_id,
            metadata: snapshot(balance_before, balance_before + amount, serde_json::Value::Null),
            created_at: Utc::now(),
        }
    }

    /// Balance after this entry, from the metadata snapshot.
    #[must_use]
    pub fn balance_after(&self) -> Option<i64> {
        self.metadata.get("balance_after").and_then(serde_json::Value::as_i64)
    }
}

fn snapshot(before: i64, after: i64, context: serde_json::Value) -> serde_json::Value {
    let mut metadata = serde_json::json!({
        "balance_before": before,
        "balance_after": after,
    });
    if let (Some(target), serde_json::Value::Object(extra)) = (metadata.as_object_mut(), context) {
        for (key, value) in extra {
            target.entry(key).or_insert(value);
        }
    }
    metadata
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Balance increased.
    Add,
    /// Balance decreased.
    Subtract,
}

impl TransactionKind {
    /// Storage form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "subtract" => Ok(Self::Subtract),
            other => Err(crate::CoreError::InvalidStatus(other.to_string())),
        }
    }
}

/// Operation tag of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditOperation {
    /// A name generation call.
    NameGeneration,
    /// A PDF certificate download.
    PdfCertificate,
    /// A one-time credit pack purchase.
    Purchase,
    /// Credits granted by a paid subscription period.
    SubscriptionGrant,
    /// Manual grant by an operator.
    AdminGrant,
}

impl CreditOperation {
    /// Storage form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameGeneration => "name_generation",
            Self::PdfCertificate => "pdf_certificate",
            Self::Purchase => "purchase",
            Self::SubscriptionGrant => "subscription_grant",
            Self::AdminGrant => "admin_grant",
        }
    }
}

impl fmt::Display for CreditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditOperation {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name_generation" => Ok(Self::NameGeneration),
            "pdf_certificate" => Ok(Self::PdfCertificate),
            "purchase" => Ok(Self::Purchase),
            "subscription_grant" => Ok(Self::SubscriptionGrant),
            "admin_grant" => Ok(Self::AdminGrant),
            other => Err(crate::CoreError::InvalidStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_is_always_negative_with_snapshot() {
        let tx = CreditTransaction::debit(
            UserId::generate(),
            4,
            5,
            CreditOperation::NameGeneration,
            "Premium generation".into(),
            serde_json::json!({ "plan_type": "4" }),
        );
        assert_eq!(tx.amount, -4);
        assert_eq!(tx.kind, TransactionKind::Subtract);
        assert_eq!(tx.metadata["balance_before"], 5);
        assert_eq!(tx.balance_after(), Some(1));
        assert_eq!(tx.metadata["plan_type"], "4");
    }

    #[test]
    fn context_cannot_overwrite_snapshot() {
        let tx = CreditTransaction::debit(
            UserId::generate(),
            1,
            10,
            CreditOperation::PdfCertificate,
            "Certificate".into(),
            serde_json::json!({ "balance_after": 999 }),
        );
        assert_eq!(tx.balance_after(), Some(9));
    }

    #[test]
    fn credit_keeps_order_reference() {
        let tx = CreditTransaction::credit(
            UserId::generate(),
            50,
            0,
            CreditOperation::Purchase,
            "Credit pack".into(),
            Some("ord_123".into()),
        );
        assert_eq!(tx.amount, 50);
        assert_eq!(tx.kind, TransactionKind::Add);
        assert_eq!(tx.order_id.as_deref(), Some("ord_123"));
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "add");
        assert_eq!(json["operation"], "purchase");
    }
}
