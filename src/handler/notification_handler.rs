use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::service::notification_service::{NotificationService, NotificationServiceImpl};
use crate::util::error::HandlerError;

pub async fn list_notifications_handler(
    State(service): State<Arc<NotificationServiceImpl>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let limit = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(50)
        .clamp(1, 500);
    let offset = params
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
        .max(0);
    let unread_only = params
        .get("unread_only")
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let response = service
        .list(limit, offset, unread_only)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(response))
}

pub async fn mark_notification_read_handler(
    State(service): State<Arc<NotificationServiceImpl>>,
    Path(notification_id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    let updated = service
        .mark_read(notification_id)
        .await
        .map_err(HandlerError::from)?;
    if !updated {
        return Err(HandlerError::not_found("Notification not found"));
    }
    Ok(Json(
        serde_json::json!({ "message": "Notification marked as read" }),
    ))
}

pub async fn mark_all_notifications_read_handler(
    State(service): State<Arc<NotificationServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let count = service.mark_all_read().await.map_err(HandlerError::from)?;
    Ok(Json(serde_json::json!({
        "message": format!("Marked {} notifications as read", count)
    })))
}

pub async fn notification_details_handler(
    State(service): State<Arc<NotificationServiceImpl>>,
    Path(notification_id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    let response = service
        .details(notification_id)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(response))
}

pub async fn delete_notification_handler(
    State(service): State<Arc<NotificationServiceImpl>>,
    Path(notification_id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    let deleted = service
        .delete(notification_id)
        .await
        .map_err(HandlerError::from)?;
    if !deleted {
        return Err(HandlerError::not_found("Notification not found"));
    }
    Ok(Json(
        serde_json::json!({ "message": "Notification deleted successfully" }),
    ))
}

pub async fn clear_all_notifications_handler(
    State(service): State<Arc<NotificationServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let count = service.delete_all().await.map_err(HandlerError::from)?;
    Ok(Json(serde_json::json!({
        "message": format!("Deleted {} notifications", count)
    })))
}
