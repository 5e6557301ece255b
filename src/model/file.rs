use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An uploaded CAD part record plus its storage pointer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    pub id: i64,
    pub object_key: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: Option<i64>,
    pub uploaded_by: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
    pub part_number: Option<String>,
    pub quantity_unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when registering a new upload.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub object_key: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: Option<i64>,
    pub uploaded_by: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
    pub part_number: Option<String>,
    pub quantity_unit: Option<String>,
}
