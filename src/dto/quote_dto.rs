use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::quote::Quote;
use crate::model::quote_notification::QuoteNotification;

/// Request body for composing a quote. Derived price fields are computed
/// server-side and never accepted from the client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    pub notification_id: i64,

    pub file_id: i64,

    #[validate(length(min = 1, max = 255))]
    pub part_name: String,

    #[validate(length(max = 100))]
    pub part_number: Option<String>,

    #[validate(length(max = 100))]
    pub material: Option<String>,

    #[validate(length(max = 50))]
    pub quantity_unit: Option<String>,

    #[validate(range(min = 0.0))]
    pub material_cost: f64,

    #[validate(range(min = 0.0))]
    pub labor_cost: f64,

    #[validate(range(min = 0.0))]
    pub machine_time_cost: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default = "default_profit_margin")]
    pub profit_margin_percent: f64,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

fn default_profit_margin() -> f64 {
    20.0
}

/// Request body for accepting or rejecting a quote.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuoteStatusRequest {
    #[validate(length(min = 1, max = 50))]
    pub status: String,

    #[validate(length(max = 1000))]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteListResponse {
    pub quotes: Vec<Quote>,
    pub total_count: i64,
    pub pending_count: i64,
    pub sent_count: i64,
    pub accepted_count: i64,
    pub rejected_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteNotificationListResponse {
    pub notifications: Vec<QuoteNotification>,
    pub total: i64,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}
