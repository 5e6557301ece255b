use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Buyer-to-manufacturer alert that a file was uploaded.
///
/// Carries a point-in-time snapshot of the file metadata; later edits to the
/// file do not propagate back into the notification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub file_id: i64,
    pub object_key: String,
    pub part_name: String,
    pub material: Option<String>,
    pub part_number: Option<String>,
    pub quantity_unit: Option<String>,
    pub uploaded_by: Option<String>,
    pub description: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
