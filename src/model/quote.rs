use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status of a quote.
///
/// Quotes are created directly in `Sent`; `Pending` is representable for
/// rows produced by earlier tooling but no code path produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum QuoteStatus {
    Pending,
    Sent,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(QuoteStatus::Pending),
            "sent" => Some(QuoteStatus::Sent),
            "accepted" => Some(QuoteStatus::Accepted),
            "rejected" => Some(QuoteStatus::Rejected),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Accepted | QuoteStatus::Rejected)
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A manufacturer's priced offer tied to a file and its upload notification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quote {
    pub id: i64,
    pub notification_id: i64,
    pub file_id: i64,
    pub part_name: String,
    pub part_number: Option<String>,
    pub material: Option<String>,
    pub quantity_unit: Option<String>,
    pub material_cost: f64,
    pub labor_cost: f64,
    pub machine_time_cost: f64,
    pub subtotal: f64,
    pub profit_margin_percent: f64,
    pub profit_amount: f64,
    pub total_price: f64,
    pub status: QuoteStatus,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Fields supplied when a manufacturer composes a quote. The derived price
/// columns are computed by the pricing calculator before insertion.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub notification_id: i64,
    pub file_id: i64,
    pub part_name: String,
    pub part_number: Option<String>,
    pub material: Option<String>,
    pub quantity_unit: Option<String>,
    pub material_cost: f64,
    pub labor_cost: f64,
    pub machine_time_cost: f64,
    pub subtotal: f64,
    pub profit_margin_percent: f64,
    pub profit_amount: f64,
    pub total_price: f64,
    pub notes: Option<String>,
    pub created_by: String,
}

/// Per-status quote counts scoped to one creator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteStatusCounts {
    pub total_quotes: i64,
    pub pending_quotes: i64,
    pub sent_quotes: i64,
    pub accepted_quotes: i64,
    pub rejected_quotes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "sent", "accepted", "rejected"] {
            assert_eq!(QuoteStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(QuoteStatus::parse("shipped").is_none());
        assert!(QuoteStatus::parse("Sent").is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(QuoteStatus::Accepted.is_terminal());
        assert!(QuoteStatus::Rejected.is_terminal());
        assert!(!QuoteStatus::Sent.is_terminal());
        assert!(!QuoteStatus::Pending.is_terminal());
    }
}
