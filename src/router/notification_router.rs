use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::notification_handler::{
    clear_all_notifications_handler, delete_notification_handler, list_notifications_handler,
    mark_all_notifications_read_handler, mark_notification_read_handler,
    notification_details_handler,
};
use crate::middlewares::auth_middleware::{bearer_auth, AuthLayerState};
use crate::service::notification_service::NotificationServiceImpl;

pub fn notification_router(
    service: Arc<NotificationServiceImpl>,
    auth_state: Arc<AuthLayerState>,
) -> Router {
    Router::new()
        .route(
            "/notifications",
            get(list_notifications_handler).delete(clear_all_notifications_handler),
        )
        .route(
            "/notifications/{notification_id}/read",
            post(mark_notification_read_handler),
        )
        .route(
            "/notifications/read-all",
            post(mark_all_notifications_read_handler),
        )
        .route(
            "/notifications/{notification_id}/details",
            get(notification_details_handler),
        )
        .route(
            "/notifications/{notification_id}",
            delete(delete_notification_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, bearer_auth))
        .with_state(service)
}
