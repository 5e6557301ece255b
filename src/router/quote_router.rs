use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::quote_handler::{
    buyer_notifications_handler, clear_quote_notifications_handler, create_quote_handler,
    delete_quote_handler, delete_quote_notification_handler, get_quote_handler,
    list_quotes_handler, mark_quote_notification_read_handler, quote_stats_handler,
    quotes_by_notification_handler, quotes_by_status_handler, unread_quote_notifications_handler,
    update_quote_status_handler,
};
use crate::middlewares::auth_middleware::{bearer_auth, manufacturer_auth, AuthLayerState};
use crate::service::quote_service::QuoteServiceImpl;

pub fn quote_router(service: Arc<QuoteServiceImpl>, auth_state: Arc<AuthLayerState>) -> Router {
    // Only manufacturers compose quotes
    let manufacturer = Router::new()
        .route("/quotes", post(create_quote_handler))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            manufacturer_auth,
        ));

    let authed = Router::new()
        .route("/quotes", get(list_quotes_handler))
        .route("/quotes/manufacturer/stats", get(quote_stats_handler))
        .route("/quotes/status/{status_filter}", get(quotes_by_status_handler))
        .route(
            "/quotes/notification/{notification_id}",
            get(quotes_by_notification_handler),
        )
        .route("/quotes/buyer/notifications", get(buyer_notifications_handler))
        .route(
            "/quotes/buyer/notifications/unread/count",
            get(unread_quote_notifications_handler),
        )
        .route(
            "/quotes/buyer/notifications/{notification_id}/read",
            put(mark_quote_notification_read_handler),
        )
        .route(
            "/quotes/buyer/notifications/all",
            delete(clear_quote_notifications_handler),
        )
        .route(
            "/quotes/buyer/notifications/{notification_id}",
            delete(delete_quote_notification_handler),
        )
        .route(
            "/quotes/{quote_id}",
            get(get_quote_handler)
                .put(update_quote_status_handler)
                .delete(delete_quote_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, bearer_auth));

    manufacturer.merge(authed).with_state(service)
}
