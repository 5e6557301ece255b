use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handler::auth_handler::{login_handler, AuthState};

pub fn auth_router(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/auth/login", post(login_handler))
        .with_state(state)
}
