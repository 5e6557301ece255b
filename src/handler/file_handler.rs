use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::dto::file_dto::{FileListResponse, FileSearchRequest, UploadRequest};
use crate::service::file_service::{FileService, FileServiceImpl};
use crate::util::error::HandlerError;

pub async fn request_upload_handler(
    State(service): State<Arc<FileServiceImpl>>,
    Json(payload): Json<UploadRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let response = service
        .request_upload(payload)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(response))
}

pub async fn list_files_handler(
    State(service): State<Arc<FileServiceImpl>>,
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
    let uploaded_by = params.get("uploaded_by").map(|s| s.as_str());

    let (files, total) = service
        .list(limit, offset, uploaded_by)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(FileListResponse { total, files }))
}

pub async fn search_files_handler(
    State(service): State<Arc<FileServiceImpl>>,
    Json(payload): Json<FileSearchRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let (files, total) = service.search(payload).await.map_err(HandlerError::from)?;
    Ok(Json(FileListResponse { total, files }))
}

pub async fn get_metadata_handler(
    State(service): State<Arc<FileServiceImpl>>,
    Path(file_id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    let file = service
        .get_metadata(file_id)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(file))
}

pub async fn request_download_handler(
    State(service): State<Arc<FileServiceImpl>>,
    Path(object_key): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let response = service
        .request_download(&object_key)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(response))
}

pub async fn delete_file_handler(
    State(service): State<Arc<FileServiceImpl>>,
    Path(object_key): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let deleted = service
        .delete(&object_key)
        .await
        .map_err(HandlerError::from)?;
    if !deleted {
        return Err(HandlerError::not_found("File not found"));
    }
    Ok(Json(serde_json::json!({ "success": true })))
}
