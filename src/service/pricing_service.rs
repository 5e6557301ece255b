use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::pricing_dto::{
    MaterialPriceCreate, MaterialPriceUpdate, PricingCalculationRequest,
    PricingCalculationResponse,
};
use crate::model::material_price::MaterialPrice;
use crate::repository::material_price_repo::{
    MaterialPriceRepository, NewMaterialPrice, SqliteMaterialPriceRepository,
};
use crate::util::error::{ServiceError, ServiceResult};

/// Derived price components of a quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotePricing {
    pub subtotal: f64,
    pub profit_amount: f64,
    pub total_price: f64,
}

/// Itemized quote pricing from the manufacturer-supplied cost components.
///
/// Subtotal first, then the margin applied to it; both intermediates are
/// persisted alongside the total. No rounding here, rounding belongs to the
/// response boundary.
pub fn compute_quote_pricing(
    material_cost: f64,
    labor_cost: f64,
    machine_time_cost: f64,
    profit_margin_percent: f64,
) -> QuotePricing {
    let subtotal = material_cost + labor_cost + machine_time_cost;
    let profit_amount = subtotal * (profit_margin_percent / 100.0);
    let total_price = subtotal + profit_amount;
    QuotePricing {
        subtotal,
        profit_amount,
        total_price,
    }
}

/// Round to 2 decimal places for monetary response fields.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

const DEFAULT_DELIVERY_DAYS: i64 = 5;

#[async_trait]
pub trait PricingService: Send + Sync {
    async fn create_material(&self, data: MaterialPriceCreate) -> ServiceResult<MaterialPrice>;
    async fn get_material(&self, material_name: &str) -> ServiceResult<MaterialPrice>;
    async fn list_materials(&self, limit: i64, offset: i64) -> ServiceResult<Vec<MaterialPrice>>;
    async fn update_material(
        &self,
        material_name: &str,
        update: MaterialPriceUpdate,
    ) -> ServiceResult<MaterialPrice>;
    async fn delete_material(&self, material_name: &str) -> ServiceResult<bool>;
    /// Rough cost of a quote from reference material rates rather than
    /// manufacturer-supplied costs.
    async fn calculate_estimate(
        &self,
        request: PricingCalculationRequest,
    ) -> ServiceResult<PricingCalculationResponse>;
}

pub struct PricingServiceImpl {
    pub material_repo: Arc<SqliteMaterialPriceRepository>,
}

impl PricingServiceImpl {
    pub fn new(material_repo: Arc<SqliteMaterialPriceRepository>) -> Self {
        PricingServiceImpl { material_repo }
    }
}

#[async_trait]
impl PricingService for PricingServiceImpl {
    #[instrument(skip(self, data), fields(material_name = %data.material_name))]
    async fn create_material(&self, data: MaterialPriceCreate) -> ServiceResult<MaterialPrice> {
        info!("Registering material price");
        let price = NewMaterialPrice {
            material_name: data.material_name,
            base_price_per_unit: data.base_price_per_unit,
            currency: data.currency,
            unit: data.unit,
            machining_complexity_factor: data.machining_complexity_factor,
            minimum_order_quantity: data.minimum_order_quantity,
            bulk_discount_threshold: data.bulk_discount_threshold,
            bulk_discount_percentage: data.bulk_discount_percentage,
            labor_cost_per_hour: data.labor_cost_per_hour,
            estimated_hours_per_unit: data.estimated_hours_per_unit,
            markup_percentage: data.markup_percentage,
        };
        let res = self.material_repo.create(price).await;
        match &res {
            Ok(_) => info!("Material price registered"),
            Err(e) => error!("Failed to register material price: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(material_name = %material_name))]
    async fn get_material(&self, material_name: &str) -> ServiceResult<MaterialPrice> {
        self.material_repo
            .get_by_name(material_name)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(limit = limit, offset = offset))]
    async fn list_materials(&self, limit: i64, offset: i64) -> ServiceResult<Vec<MaterialPrice>> {
        self.material_repo
            .list(limit, offset)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self, update), fields(material_name = %material_name))]
    async fn update_material(
        &self,
        material_name: &str,
        update: MaterialPriceUpdate,
    ) -> ServiceResult<MaterialPrice> {
        info!("Updating material price");
        let res = self.material_repo.update(material_name, &update).await;
        match &res {
            Ok(_) => info!("Material price updated"),
            Err(e) => error!("Failed to update material price: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(material_name = %material_name))]
    async fn delete_material(&self, material_name: &str) -> ServiceResult<bool> {
        let res = self.material_repo.delete(material_name).await;
        match &res {
            Ok(true) => info!("Material price deleted"),
            Ok(false) => info!("Material price not found, nothing deleted"),
            Err(e) => error!("Failed to delete material price: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self, request), fields(material = %request.material, quantity = request.quantity))]
    async fn calculate_estimate(
        &self,
        request: PricingCalculationRequest,
    ) -> ServiceResult<PricingCalculationResponse> {
        info!("Calculating quote estimate");

        let material_price = self
            .material_repo
            .get_by_name(&request.material)
            .await
            .map_err(ServiceError::from)?;

        if request.quantity < material_price.minimum_order_quantity {
            error!(
                "Quantity {} below minimum order {}",
                request.quantity, material_price.minimum_order_quantity
            );
            return Err(ServiceError::InvalidInput(format!(
                "Minimum order quantity is {} units",
                material_price.minimum_order_quantity
            )));
        }

        let complexity = request
            .complexity_factor
            .unwrap_or(material_price.machining_complexity_factor);

        let base_material_cost =
            material_price.base_price_per_unit * request.quantity as f64 * complexity;

        let labor_cost = material_price.labor_cost_per_hour
            * material_price.estimated_hours_per_unit
            * request.quantity as f64;

        let subtotal = base_material_cost + labor_cost;

        // All-or-nothing threshold, not a marginal discount.
        let bulk_discount = if request.quantity >= material_price.bulk_discount_threshold {
            subtotal * (material_price.bulk_discount_percentage / 100.0)
        } else {
            0.0
        };

        let subtotal_after_discount = subtotal - bulk_discount;

        let markup = subtotal_after_discount * (material_price.markup_percentage / 100.0);

        let total_price = subtotal_after_discount + markup;

        let price_per_unit = total_price / request.quantity as f64;

        let estimated_delivery_days = request.delivery_days.unwrap_or(DEFAULT_DELIVERY_DAYS);

        info!(total_price = total_price, "Estimate calculated");

        Ok(PricingCalculationResponse {
            material: request.material,
            quantity: request.quantity,
            base_material_cost: round2(base_material_cost),
            labor_cost: round2(labor_cost),
            subtotal: round2(subtotal),
            bulk_discount: round2(bulk_discount),
            subtotal_after_discount: round2(subtotal_after_discount),
            markup: round2(markup),
            total_price: round2(total_price),
            price_per_unit: round2(price_per_unit),
            currency: material_price.currency,
            complexity_factor: complexity,
            estimated_delivery_days,
        })
    }
}
