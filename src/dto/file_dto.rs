use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::file::File;
use crate::model::notification::Notification;

/// Request body for registering an upload and obtaining a transfer URL.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// File size in bytes, capped at 500 MB
    #[validate(range(min = 0, max = 524_288_000))]
    pub file_size: Option<i64>,

    pub uploaded_by: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    pub material: Option<String>,

    pub part_number: Option<String>,

    #[serde(default = "default_quantity_unit")]
    pub quantity_unit: Option<String>,
}

fn default_content_type() -> String {
    "application/stp".to_string()
}

fn default_quantity_unit() -> Option<String> {
    Some("pieces".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub upload_url: String,
    pub object_key: String,
    pub file_id: i64,
    pub notification: Notification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub download_url: String,
    pub file: File,
}

/// Response for listing multiple files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub total: i64,
    pub files: Vec<File>,
}

/// Request model for searching files
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FileSearchRequest {
    /// Search in filename
    pub query: Option<String>,
    /// Filter by uploader
    pub uploaded_by: Option<String>,
    /// Filter files created after this date
    pub start_date: Option<DateTime<Utc>>,
    /// Filter files created before this date
    pub end_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 500))]
    #[serde(default = "default_search_limit")]
    pub limit: i64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub offset: i64,
}

fn default_search_limit() -> i64 {
    100
}
