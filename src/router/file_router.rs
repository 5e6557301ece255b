use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::file_handler::{
    delete_file_handler, get_metadata_handler, list_files_handler, request_download_handler,
    request_upload_handler, search_files_handler,
};
use crate::middlewares::auth_middleware::{bearer_auth, AuthLayerState};
use crate::service::file_service::FileServiceImpl;

pub fn file_router(service: Arc<FileServiceImpl>, auth_state: Arc<AuthLayerState>) -> Router {
    Router::new()
        .route("/files/upload", post(request_upload_handler))
        .route("/files/list", get(list_files_handler))
        .route("/files/search", post(search_files_handler))
        .route("/files/metadata/{file_id}", get(get_metadata_handler))
        .route("/files/download/{*object_key}", get(request_download_handler))
        .route("/files/{*object_key}", delete(delete_file_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, bearer_auth))
        .with_state(service)
}
