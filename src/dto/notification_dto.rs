use serde::{Deserialize, Serialize};

use crate::model::file::File;
use crate::model::notification::Notification;

/// Response for listing upload notifications. `unread_count` always covers
/// the whole table, independent of the page and of `unread_only`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub total: i64,
    pub unread_count: i64,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDetailsResponse {
    pub notification: Notification,
    pub file: Option<File>,
}
