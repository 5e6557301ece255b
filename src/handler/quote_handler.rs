use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::dto::quote_dto::{
    CreateQuoteRequest, QuoteListResponse, QuoteNotificationListResponse, UnreadCountResponse,
    UpdateQuoteStatusRequest,
};
use crate::model::quote::QuoteStatus;
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

fn page_params(params: &HashMap<String, String>) -> (i64, i64) {
    let limit = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(50)
        .clamp(1, 100);
    let offset = params
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
        .max(0);
    (limit, offset)
}

pub async fn create_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let quote = service
        .create_quote(payload, &claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok((axum::http::StatusCode::CREATED, Json(quote)))
}

pub async fn list_quotes_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let (limit, offset) = page_params(&params);

    let status = match params.get("status") {
        Some(raw) => match QuoteStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return Err(HandlerError::bad_request(format!(
                    "Invalid status '{}'. Must be one of: pending, sent, accepted, rejected",
                    raw
                )));
            }
        },
        None => None,
    };

    let (quotes, total_count) = service
        .list_quotes(status, Some(&claims.sub), limit, offset)
        .await
        .map_err(HandlerError::from)?;
    let stats = service
        .quote_stats(&claims.sub)
        .await
        .map_err(HandlerError::from)?;

    Ok(Json(QuoteListResponse {
        quotes,
        total_count,
        pending_count: stats.pending_quotes,
        sent_count: stats.sent_quotes,
        accepted_count: stats.accepted_quotes,
        rejected_count: stats.rejected_quotes,
    }))
}

pub async fn quote_stats_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let stats = service
        .quote_stats(&claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(stats))
}

pub async fn quotes_by_status_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(status_filter): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let status = QuoteStatus::parse(&status_filter).ok_or_else(|| {
        HandlerError::bad_request(format!(
            "Invalid status '{}'. Must be one of: pending, sent, accepted, rejected",
            status_filter
        ))
    })?;
    let (quotes, _) = service
        .list_quotes(Some(status), None, 50, 0)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(quotes))
}

pub async fn quotes_by_notification_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(notification_id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    let quotes = service
        .quotes_by_notification(notification_id)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(quotes))
}

pub async fn get_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(quote_id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    let quote = service
        .get_quote(quote_id)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(quote))
}

pub async fn update_quote_status_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(quote_id): Path<i64>,
    Json(payload): Json<UpdateQuoteStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let quote = service
        .update_status(quote_id, payload)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(quote))
}

pub async fn delete_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(quote_id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    let quote = service
        .get_quote(quote_id)
        .await
        .map_err(HandlerError::from)?;

    if quote.created_by != claims.sub {
        return Err(HandlerError::forbidden(
            "You can only delete your own quotes",
        ));
    }

    let deleted = service
        .delete_quote(quote_id)
        .await
        .map_err(HandlerError::from)?;
    if !deleted {
        return Err(HandlerError::not_found("Quote not found"));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn buyer_notifications_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let (limit, offset) = page_params(&params);

    let (notifications, total) = service
        .buyer_notifications(&claims.sub, limit, offset)
        .await
        .map_err(HandlerError::from)?;
    let unread_count = service
        .unread_notification_count(&claims.sub)
        .await
        .map_err(HandlerError::from)?;

    Ok(Json(QuoteNotificationListResponse {
        notifications,
        total,
        unread_count,
    }))
}

pub async fn mark_quote_notification_read_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(notification_id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    let updated = service
        .mark_notification_read(notification_id)
        .await
        .map_err(HandlerError::from)?;
    if !updated {
        return Err(HandlerError::not_found("Notification not found"));
    }
    Ok(Json(
        serde_json::json!({ "success": true, "message": "Notification marked as read" }),
    ))
}

pub async fn unread_quote_notifications_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let unread_count = service
        .unread_notification_count(&claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

pub async fn delete_quote_notification_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(notification_id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    let deleted = service
        .delete_notification(notification_id, &claims.sub)
        .await
        .map_err(HandlerError::from)?;
    if !deleted {
        return Err(HandlerError::not_found("Notification not found"));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn clear_quote_notifications_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    service
        .clear_notifications(&claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
