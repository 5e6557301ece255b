use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::dto::pricing_dto::{
    MaterialPriceCreate, MaterialPriceUpdate, PricingCalculationRequest,
};
use crate::service::pricing_service::{PricingService, PricingServiceImpl};
use crate::service::rate_cache::MaterialRateCache;
use crate::util::error::HandlerError;

pub async fn create_material_handler(
    State(service): State<Arc<PricingServiceImpl>>,
    Json(payload): Json<MaterialPriceCreate>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let material = service
        .create_material(payload)
        .await
        .map_err(HandlerError::from)?;
    Ok((axum::http::StatusCode::CREATED, Json(material)))
}

pub async fn list_materials_handler(
    State(service): State<Arc<PricingServiceImpl>>,
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
    let materials = service
        .list_materials(limit, offset)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(materials))
}

pub async fn get_material_handler(
    State(service): State<Arc<PricingServiceImpl>>,
    Path(material_name): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let material = service
        .get_material(&material_name)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(material))
}

pub async fn update_material_handler(
    State(service): State<Arc<PricingServiceImpl>>,
    Path(material_name): Path<String>,
    Json(payload): Json<MaterialPriceUpdate>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let material = service
        .update_material(&material_name, payload)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(material))
}

pub async fn delete_material_handler(
    State(service): State<Arc<PricingServiceImpl>>,
    Path(material_name): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let deleted = service
        .delete_material(&material_name)
        .await
        .map_err(HandlerError::from)?;
    if !deleted {
        return Err(HandlerError::not_found("Material not found"));
    }
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Material '{}' deleted", material_name)
    })))
}

pub async fn calculate_price_handler(
    State(service): State<Arc<PricingServiceImpl>>,
    Json(payload): Json<PricingCalculationRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let pricing = service
        .calculate_estimate(payload)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(pricing))
}

pub async fn live_costs_handler(
    State(cache): State<Arc<MaterialRateCache>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let materials: Option<Vec<String>> = params.get("materials").map(|raw| {
        raw.split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect()
    });

    let payload = cache.get(Utc::now(), materials.as_deref());
    Ok(Json(payload))
}
