use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Manufacturer-to-buyer alert that a quote was sent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuoteNotification {
    pub id: i64,
    pub quote_id: i64,
    pub file_id: i64,
    pub sent_by: String,
    pub sent_to: String,
    pub part_name: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
