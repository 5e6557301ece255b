use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::pricing_handler::{
    calculate_price_handler, create_material_handler, delete_material_handler,
    get_material_handler, list_materials_handler, live_costs_handler, update_material_handler,
};
use crate::middlewares::auth_middleware::{bearer_auth, manufacturer_auth, AuthLayerState};
use crate::service::pricing_service::PricingServiceImpl;
use crate::service::rate_cache::MaterialRateCache;

pub fn pricing_router(
    service: Arc<PricingServiceImpl>,
    auth_state: Arc<AuthLayerState>,
) -> Router {
    // Only manufacturers manage the pricing table
    let manufacturer = Router::new()
        .route("/pricing/materials", post(create_material_handler))
        .route(
            "/pricing/materials/{material_name}",
            put(update_material_handler).delete(delete_material_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            manufacturer_auth,
        ));

    let authed = Router::new()
        .route("/pricing/materials", get(list_materials_handler))
        .route("/pricing/materials/{material_name}", get(get_material_handler))
        .route("/pricing/calculate", post(calculate_price_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, bearer_auth));

    manufacturer.merge(authed).with_state(service)
}

pub fn live_rates_router(cache: Arc<MaterialRateCache>) -> Router {
    Router::new()
        .route("/manufacturing/costs/live", get(live_costs_handler))
        .with_state(cache)
}
